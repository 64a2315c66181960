use sweeplab::error::ExpandError;
use sweeplab::expander::ExpansionContext;
use sweeplab::expander::expand;

fn ctx(pairs: &[(&str, &str)]) -> ExpansionContext {
  let mut context = ExpansionContext::new();
  for (name, value) in pairs {
    context.set(*name, *value);
  }
  context
}

#[test]
fn no_placeholders_returns_input_unchanged() {
  let context = ctx(&[("unused", "value")]);
  let input = "mpirun -n 4 xhpcg --no-braces-here";

  assert_eq!(expand(input, &context).unwrap(), input);
}

#[test]
fn chained_references_resolve_transitively() {
  let context = ctx(&[
    ("out_file", "{experiment_run_dir}/hpcg_result.out"),
    ("experiment_run_dir", "{root}/standard"),
    ("root", "/tmp/campaigns"),
  ]);

  assert_eq!(
    expand("mv result.txt {out_file}", &context).unwrap(),
    "mv result.txt /tmp/campaigns/standard/hpcg_result.out"
  );
}

#[test]
fn expansion_is_idempotent() {
  let context = ctx(&[("a", "{b}-{b}"), ("b", "x")]);

  let once = expand("{a}", &context).unwrap();
  let twice = expand(&once, &context).unwrap();
  assert_eq!(once, "x-x");
  assert_eq!(once, twice);
}

#[test]
fn same_variable_in_sibling_branches_is_not_a_cycle() {
  // `shared` appears under both `left` and `right`; only ancestor-path
  // repetition is a cycle.
  let context = ctx(&[
    ("left", "{shared}"),
    ("right", "{shared}"),
    ("shared", "s"),
  ]);

  assert_eq!(expand("{left} {right} {shared}", &context).unwrap(), "s s s");
}

#[test]
fn unresolved_variable_fails() {
  let context = ctx(&[("known", "v")]);

  let err = expand("{known} {missing}", &context).unwrap_err();
  assert!(matches!(
    err,
    ExpandError::UnresolvedVariable { ref name, .. } if name == "missing"
  ));
}

#[test]
fn direct_cycle_fails() {
  let context = ctx(&[("a", "{b}"), ("b", "{a}")]);

  let err = expand("{a}", &context).unwrap_err();
  assert!(matches!(err, ExpandError::CyclicExpansion { .. }));
}

#[test]
fn self_cycle_fails() {
  let context = ctx(&[("a", "prefix-{a}")]);

  let err = expand("{a}", &context).unwrap_err();
  assert!(matches!(
    err,
    ExpandError::CyclicExpansion { ref name, .. } if name == "a"
  ));
}

#[test]
fn braces_without_identifier_are_literal() {
  let context = ctx(&[("a", "v")]);

  assert_eq!(expand("{}", &context).unwrap(), "{}");
  assert_eq!(expand("{not-an-ident}", &context).unwrap(), "{not-an-ident}");
  assert_eq!(expand("{1bad}", &context).unwrap(), "{1bad}");
  assert_eq!(expand("{a} and {a", &context).unwrap(), "v and {a");
}
