// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::error::ExpandError;
use std::collections::BTreeMap;

/// Layered variable namespace an experiment's templates are expanded against.
///
/// Entries are raw templates themselves: a value may reference other
/// variables (`out_file = "{experiment_run_dir}/result.out"`), and the
/// reference is only resolved when the entry is expanded. Later `set` calls
/// overwrite earlier ones, which is how workload-scoped variables shadow
/// globals and reserved entries land on top.
#[derive(Debug, Clone, Default)]
pub struct ExpansionContext {
  vars: BTreeMap<String, String>,
}

impl ExpansionContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.vars.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(String::as_str)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.vars.contains_key(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

/// Expands every `{name}` placeholder in `template` against `context`.
///
/// Resolution is recursive: the context entry for a placeholder is itself a
/// template and is expanded before being substituted. Placeholders are
/// substituted left to right; a fully resolved string comes back unchanged.
///
/// Fails with [`ExpandError::UnresolvedVariable`] when a referenced name is
/// not in the context, and with [`ExpandError::CyclicExpansion`] when a
/// variable is already being expanded further up the current call stack.
/// Cycle detection is keyed on the per-call ancestor stack, so the same
/// variable may appear any number of times in sibling branches.
pub fn expand(template: &str, context: &ExpansionContext) -> Result<String, ExpandError> {
  let mut stack = Vec::new();
  expand_with_stack(template, context, &mut stack)
}

fn expand_with_stack(
  template: &str,
  context: &ExpansionContext,
  stack: &mut Vec<String>,
) -> Result<String, ExpandError> {
  let mut out = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];

    let Some((name, consumed)) = placeholder_name(after) else {
      // Not a `{identifier}` placeholder. Braces without a valid
      // identifier are literal text.
      out.push('{');
      rest = after;
      continue;
    };

    if stack.iter().any(|seen| seen == name) {
      let mut chain: Vec<&str> = stack.iter().map(String::as_str).collect();
      chain.push(name);
      return Err(ExpandError::CyclicExpansion {
        name: name.to_string(),
        chain: chain.join(" -> "),
      });
    }

    let value = context
      .get(name)
      .ok_or_else(|| ExpandError::UnresolvedVariable {
        name: name.to_string(),
        template: template.to_string(),
      })?;

    stack.push(name.to_string());
    let expanded = expand_with_stack(value, context, stack)?;
    stack.pop();

    out.push_str(&expanded);
    rest = &after[consumed..];
  }

  out.push_str(rest);
  Ok(out)
}

/// Parses an `identifier}` prefix of `s`, returning the identifier and the
/// number of bytes consumed (identifier plus closing brace).
fn placeholder_name(s: &str) -> Option<(&str, usize)> {
  let end = s
    .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
    .unwrap_or(s.len());

  if end == 0 {
    return None;
  }
  if !s[..end].starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
    return None;
  }
  if !s[end..].starts_with('}') {
    return None;
  }

  Some((&s[..end], end + 1))
}
