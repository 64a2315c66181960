use crate::application::Application;
use crate::config::WorkspaceConfig;
use crate::error::SweeplabError;
use crate::execute::CommandOutcome;
use crate::execute::Executor;
use crate::expander::expand;
use crate::fom::FomResult;
use crate::fom::FomStatus;
use crate::fom::extract;
use crate::materialize::TemplateLauncher;
use crate::materialize::materialize;
use crate::matrix::Experiment;
use crate::matrix::build_matrix;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::Instrument;

/// Pipeline stage an experiment failed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Materialize,
  Execute,
  Extract,
}

/// Per-experiment campaign outcome. A campaign never collapses into an
/// all-or-nothing result: each experiment carries its own status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
  Succeeded,
  FailedAt(Stage),
  PartialMetrics,
}

/// Report entry for one experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
  pub name: String,
  pub status: ExperimentStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub run_dir: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub commands: Vec<CommandOutcome>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub metrics: Vec<FomResult>,
}

/// Aggregate campaign report, serialized as pretty JSON under the workspace
/// root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
  pub application: String,
  pub workload: String,
  pub experiments: Vec<ExperimentReport>,
}

impl CampaignReport {
  /// Writes the report as `<root>/<application>.<workload>.report.json` and
  /// returns the path.
  pub fn write(&self, root: &Path) -> Result<PathBuf, SweeplabError> {
    let path = root.join(format!("{}.{}.report.json", self.application, self.workload));
    let json = serde_json::to_string_pretty(self)?;
    fs::create_dir_all(root)?;
    fs::write(&path, json)?;
    Ok(path)
  }
}

/// Generates the full matrix for a workload and runs every experiment:
/// materialize, execute, extract. Failures are scoped to the experiment they
/// occur in; sibling experiments always proceed.
pub async fn run_campaign<E: Executor>(
  application: &Application,
  workload: &str,
  config: &WorkspaceConfig,
  executor: &E,
) -> Result<CampaignReport, SweeplabError> {
  let launcher = TemplateLauncher::new(&config.mpi_command);
  let mut experiments = build_matrix(application, workload)?;

  let span = tracing::info_span!(
    "campaign",
    app = %application.name,
    workload = %workload,
    experiments = experiments.len()
  );

  async {
    tracing::info!("--- Starting campaign ---");
    let mut reports = Vec::with_capacity(experiments.len());

    for experiment in &mut experiments {
      let exp_span = tracing::info_span!("experiment", name = %experiment.name);
      let report = async {
        let commands = match materialize(application, experiment, config, &launcher) {
          Ok(commands) => commands,
          Err(e) => {
            tracing::error!(error = %e, "Materialization failed");
            return failed_report(experiment, Stage::Materialize, &e.to_string());
          }
        };

        let log_file = match expand("{log_file}", &experiment.context) {
          Ok(path) => PathBuf::from(path),
          Err(e) => {
            tracing::error!(error = %e, "Log path expansion failed");
            return failed_report(experiment, Stage::Execute, &e.to_string());
          }
        };

        let outcomes = match executor.execute(&commands, &log_file).await {
          Ok(outcomes) => outcomes,
          Err(e) => {
            tracing::error!(error = %e, "Execution failed");
            return failed_report(experiment, Stage::Execute, &e.to_string());
          }
        };

        if outcomes.iter().any(|o| !o.success) {
          let mut report = failed_report(experiment, Stage::Execute, "command exited non-zero");
          report.commands = outcomes;
          return report;
        }

        let results = match extract(application, experiment) {
          Ok(results) => results,
          Err(e) => {
            tracing::error!(error = %e, "Extraction failed");
            let mut report = failed_report(experiment, Stage::Extract, &e.to_string());
            report.commands = outcomes;
            return report;
          }
        };

        let status = if results.iter().all(|r| r.status == FomStatus::Found) {
          ExperimentStatus::Succeeded
        } else {
          ExperimentStatus::PartialMetrics
        };
        experiment.results = results.clone();

        tracing::info!(status = ?status, "Experiment finished");
        ExperimentReport {
          name: experiment.name.clone(),
          status,
          run_dir: relative_run_dir(experiment, config),
          error: None,
          commands: outcomes,
          metrics: results,
        }
      }
      .instrument(exp_span)
      .await;

      reports.push(report);
    }
    tracing::info!("--- Campaign complete ---");

    Ok(CampaignReport {
      application: application.name.clone(),
      workload: workload.to_string(),
      experiments: reports,
    })
  }
  .instrument(span)
  .await
}

/// Materializes every experiment in the matrix without executing anything.
pub fn generate_campaign(
  application: &Application,
  workload: &str,
  config: &WorkspaceConfig,
) -> Result<CampaignReport, SweeplabError> {
  let launcher = TemplateLauncher::new(&config.mpi_command);
  let mut experiments = build_matrix(application, workload)?;

  let mut reports = Vec::with_capacity(experiments.len());
  for experiment in &mut experiments {
    let report = match materialize(application, experiment, config, &launcher) {
      Ok(_) => ExperimentReport {
        name: experiment.name.clone(),
        status: ExperimentStatus::Succeeded,
        run_dir: relative_run_dir(experiment, config),
        error: None,
        commands: Vec::new(),
        metrics: Vec::new(),
      },
      Err(e) => {
        tracing::error!(experiment = %experiment.name, error = %e, "Materialization failed");
        failed_report(experiment, Stage::Materialize, &e.to_string())
      }
    };
    reports.push(report);
  }

  Ok(CampaignReport {
    application: application.name.clone(),
    workload: workload.to_string(),
    experiments: reports,
  })
}

/// Re-extracts figures of merit from run directories produced by an earlier
/// campaign, without touching the filesystem layout or executing anything.
pub fn analyze_campaign(
  application: &Application,
  workload: &str,
  config: &WorkspaceConfig,
) -> Result<CampaignReport, SweeplabError> {
  let mut experiments = build_matrix(application, workload)?;

  let mut reports = Vec::with_capacity(experiments.len());
  for experiment in &mut experiments {
    if !experiment.context.contains("n_ranks") {
      experiment.context.set("n_ranks", &config.n_ranks);
    }
    experiment.bind_run_dir(&config.root);

    let report = match extract(application, experiment) {
      Ok(results) => {
        let status = if results.iter().all(|r| r.status == FomStatus::Found) {
          ExperimentStatus::Succeeded
        } else {
          ExperimentStatus::PartialMetrics
        };
        experiment.results = results.clone();
        ExperimentReport {
          name: experiment.name.clone(),
          status,
          run_dir: relative_run_dir(experiment, config),
          error: None,
          commands: Vec::new(),
          metrics: results,
        }
      }
      Err(e) => {
        tracing::error!(experiment = %experiment.name, error = %e, "Extraction failed");
        failed_report(experiment, Stage::Extract, &e.to_string())
      }
    };
    reports.push(report);
  }

  Ok(CampaignReport {
    application: application.name.clone(),
    workload: workload.to_string(),
    experiments: reports,
  })
}

fn failed_report(experiment: &Experiment, stage: Stage, error: &str) -> ExperimentReport {
  ExperimentReport {
    name: experiment.name.clone(),
    status: ExperimentStatus::FailedAt(stage),
    run_dir: None,
    error: Some(error.to_string()),
    commands: Vec::new(),
    metrics: Vec::new(),
  }
}

/// Run directory relative to the workspace root where possible; portable
/// reports survive the workspace moving.
fn relative_run_dir(experiment: &Experiment, config: &WorkspaceConfig) -> Option<PathBuf> {
  let run_dir = experiment.run_dir.as_ref()?;
  Some(pathdiff::diff_paths(run_dir, &config.root).unwrap_or_else(|| run_dir.clone()))
}
