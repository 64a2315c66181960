use std::fs;
use std::path::Path;
use sweeplab::application::Application;
use sweeplab::config::WorkspaceConfig;
use sweeplab::error::ExtractError;
use sweeplab::error::ModelError;
use sweeplab::fom::FomStatus;
use sweeplab::fom::extract;
use sweeplab::materialize::TemplateLauncher;
use sweeplab::materialize::materialize;
use sweeplab::matrix::Experiment;
use sweeplab::matrix::build_matrix;
use tempfile::tempdir;

fn config(root: &Path) -> WorkspaceConfig {
  WorkspaceConfig {
    root: root.to_path_buf(),
    overwrite: false,
    mpi_command: "mpirun -n {n_ranks}".to_string(),
    n_ranks: "1".to_string(),
  }
}

/// Materializes the single experiment of `app`'s `standard` workload and
/// writes `log` as its execution log.
fn materialized_with_log(app: &Application, root: &Path, log: &str) -> Experiment {
  let config = config(root);
  let mut experiments = build_matrix(app, "standard").unwrap();
  let launcher = TemplateLauncher::new("mpirun -n {n_ranks}");
  materialize(app, &mut experiments[0], &config, &launcher).unwrap();

  let experiment = experiments.remove(0);
  let run_dir = experiment.run_dir.clone().unwrap();
  fs::write(run_dir.join(format!("{}.out", experiment.name)), log).unwrap();
  experiment
}

fn rated_app() -> Application {
  Application::builder("rated")
    .executable("run", "bench", false)
    .unwrap()
    .workload("standard", vec!["run".to_string()])
    .unwrap()
    .figure_of_merit(
      "Gflops",
      "{log_file}",
      r"rating of=(?P<gflops>[0-9]+\.[0-9]+)",
      "gflops",
      "GFLOP/s",
    )
    .unwrap()
    .finish()
}

#[test]
fn extracts_named_group_value_with_units() {
  let temp = tempdir().unwrap();
  let app = rated_app();
  let experiment = materialized_with_log(
    &app,
    temp.path(),
    "benchmark finished\nresult is VALID with a GFLOP/s rating of=3.14\n",
  );

  let results = extract(&app, &experiment).unwrap();
  assert_eq!(results.len(), 1);
  assert_eq!(results[0].status, FomStatus::Found);
  assert_eq!(results[0].value.as_deref(), Some("3.14"));
  assert_eq!(results[0].units, "GFLOP/s");
}

#[test]
fn no_match_is_recorded_not_found() {
  let temp = tempdir().unwrap();
  let app = rated_app();
  let experiment = materialized_with_log(&app, temp.path(), "nothing useful in here\n");

  let results = extract(&app, &experiment).unwrap();
  assert_eq!(results[0].status, FomStatus::NotFound);
  assert_eq!(results[0].value, None);
}

#[test]
fn missing_log_does_not_abort_other_foms() {
  let temp = tempdir().unwrap();

  let app = Application::builder("two-logs")
    .executable("run", "bench", false)
    .unwrap()
    .workload("standard", vec!["run".to_string()])
    .unwrap()
    .figure_of_merit(
      "FromAbsentLog",
      "{experiment_run_dir}/absent.log",
      r"value=(?P<v>[0-9]+)",
      "v",
      "",
    )
    .unwrap()
    .figure_of_merit(
      "Gflops",
      "{log_file}",
      r"rating of=(?P<gflops>[0-9]+\.[0-9]+)",
      "gflops",
      "GFLOP/s",
    )
    .unwrap()
    .finish();

  let experiment = materialized_with_log(&app, temp.path(), "rating of=2.71\n");

  let results = extract(&app, &experiment).unwrap();
  assert_eq!(results[0].status, FomStatus::MissingLog);
  assert_eq!(results[1].status, FomStatus::Found);
  assert_eq!(results[1].value.as_deref(), Some("2.71"));
}

#[test]
fn patterns_may_span_lines() {
  let temp = tempdir().unwrap();

  let app = Application::builder("spanning")
    .executable("run", "bench", false)
    .unwrap()
    .workload("standard", vec!["run".to_string()])
    .unwrap()
    .figure_of_merit(
      "Total",
      "{log_file}",
      r"phase one complete(?s:.*)total=(?P<total>[0-9]+)",
      "total",
      "s",
    )
    .unwrap()
    .finish();

  let experiment = materialized_with_log(
    &app,
    temp.path(),
    "phase one complete\nphase two complete\ntotal=42\n",
  );

  let results = extract(&app, &experiment).unwrap();
  assert_eq!(results[0].status, FomStatus::Found);
  assert_eq!(results[0].value.as_deref(), Some("42"));
}

#[test]
fn nonparticipating_group_is_a_malformed_pattern() {
  let temp = tempdir().unwrap();

  // The designated group sits in an alternation branch the text never
  // takes: the pattern matches, the group does not participate.
  let app = Application::builder("inconsistent")
    .executable("run", "bench", false)
    .unwrap()
    .workload("standard", vec!["run".to_string()])
    .unwrap()
    .figure_of_merit(
      "Gflops",
      "{log_file}",
      r"rating of=[0-9.]+|impossible=(?P<gflops>[0-9.]+)",
      "gflops",
      "GFLOP/s",
    )
    .unwrap()
    .finish();

  let experiment = materialized_with_log(&app, temp.path(), "rating of=3.14\n");

  let err = extract(&app, &experiment).unwrap_err();
  assert!(matches!(
    err,
    ExtractError::MalformedPattern { ref group, .. } if group == "gflops"
  ));
}

#[test]
fn group_absent_from_pattern_is_rejected_at_registration() {
  let err = Application::builder("early-check")
    .figure_of_merit(
      "Gflops",
      "{log_file}",
      r"rating of=(?P<gflops>[0-9.]+)",
      "wrong_group",
      "",
    )
    .unwrap_err();

  assert!(matches!(
    err,
    ModelError::MalformedPattern { ref group, .. } if group == "wrong_group"
  ));
}

#[test]
fn invalid_regex_is_rejected_at_registration() {
  let err = Application::builder("early-check")
    .figure_of_merit("Broken", "{log_file}", r"rating of=(?P<g>[0-9", "g", "")
    .unwrap_err();

  assert!(matches!(err, ModelError::BadPattern { .. }));
}
