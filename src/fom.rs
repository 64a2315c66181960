use crate::application::Application;
use crate::error::ExtractError;
use crate::expander::expand;
use crate::matrix::Experiment;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Outcome of scanning for one figure of merit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FomStatus {
  /// Pattern matched and the designated group captured a value.
  Found,
  /// Log file exists but the pattern never matched.
  NotFound,
  /// The expanded log path does not exist.
  MissingLog,
}

/// One extracted metric record. `value` is the captured group text verbatim;
/// numeric parsing is the consumer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FomResult {
  pub name: String,
  pub status: FomStatus,
  pub value: Option<String>,
  pub units: String,
}

/// Scans each declared figure of merit's log file and produces one
/// [`FomResult`] per definition, in declaration order.
///
/// Missing log files and non-matching patterns are recoverable: the FOM is
/// recorded with the corresponding status and extraction continues with the
/// remaining definitions. A pattern that matches while its designated group
/// does not participate is a configuration bug and fails the whole call with
/// [`ExtractError::MalformedPattern`].
pub fn extract(
  application: &Application,
  experiment: &Experiment,
) -> Result<Vec<FomResult>, ExtractError> {
  let mut results = Vec::with_capacity(application.figures_of_merit.len());

  for fom in &application.figures_of_merit {
    let path = PathBuf::from(expand(&fom.log_file, &experiment.context)?);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        tracing::warn!(fom = %fom.name, path = %path.display(), "Log file missing. Recording as absent metric.");
        results.push(FomResult {
          name: fom.name.clone(),
          status: FomStatus::MissingLog,
          value: None,
          units: fom.units.clone(),
        });
        continue;
      }
      Err(source) => return Err(ExtractError::ReadLog { path, source }),
    };

    // Whole-content scan: patterns may span lines the way the definition
    // wrote them. First match wins.
    match fom.pattern.captures(&content) {
      None => {
        tracing::debug!(fom = %fom.name, path = %path.display(), "Pattern did not match");
        results.push(FomResult {
          name: fom.name.clone(),
          status: FomStatus::NotFound,
          value: None,
          units: fom.units.clone(),
        });
      }
      Some(caps) => match caps.name(&fom.group) {
        Some(m) => {
          results.push(FomResult {
            name: fom.name.clone(),
            status: FomStatus::Found,
            value: Some(m.as_str().to_string()),
            units: fom.units.clone(),
          });
        }
        None => {
          return Err(ExtractError::MalformedPattern {
            fom: fom.name.clone(),
            group: fom.group.clone(),
          });
        }
      },
    }
  }

  Ok(results)
}
