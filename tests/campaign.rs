use std::path::Path;
use sweeplab::application::Application;
use sweeplab::application::VariableDefault;
use sweeplab::campaign::ExperimentStatus;
use sweeplab::campaign::Stage;
use sweeplab::campaign::run_campaign;
use sweeplab::config::WorkspaceConfig;
use sweeplab::execute::LocalExecutor;
use tempfile::tempdir;

fn config(root: &Path) -> WorkspaceConfig {
  WorkspaceConfig {
    root: root.to_path_buf(),
    overwrite: false,
    mpi_command: "mpirun -n {n_ranks}".to_string(),
    n_ranks: "1".to_string(),
  }
}

#[tokio::test]
async fn failed_experiment_does_not_abort_siblings() {
  let temp = tempdir().unwrap();

  // `test good != bad` exits 0; `test bad != bad` exits 1.
  let app = Application::builder("mixed")
    .executable("check", "test {variant} != bad", false)
    .unwrap()
    .workload("standard", vec!["check".to_string()])
    .unwrap()
    .variable(
      "variant",
      VariableDefault::List(vec!["good".to_string(), "bad".to_string()]),
      "",
      vec!["standard".to_string()],
    )
    .unwrap()
    .finish();

  let report = run_campaign(&app, "standard", &config(temp.path()), &LocalExecutor)
    .await
    .unwrap();

  assert_eq!(report.experiments.len(), 2);
  assert_eq!(report.experiments[0].status, ExperimentStatus::Succeeded);
  assert_eq!(
    report.experiments[1].status,
    ExperimentStatus::FailedAt(Stage::Execute)
  );
  assert!(!report.experiments[1].commands.is_empty());
}

#[tokio::test]
async fn unmatched_fom_yields_partial_metrics() {
  let temp = tempdir().unwrap();

  let app = Application::builder("partial")
    .executable("report", "echo rating of=7.77", false)
    .unwrap()
    .workload("standard", vec!["report".to_string()])
    .unwrap()
    .figure_of_merit(
      "Gflops",
      "{log_file}",
      r"rating of=(?P<gflops>[0-9]+\.[0-9]+)",
      "gflops",
      "GFLOP/s",
    )
    .unwrap()
    .figure_of_merit(
      "NeverThere",
      "{log_file}",
      r"elapsed=(?P<t>[0-9]+)",
      "t",
      "s",
    )
    .unwrap()
    .finish();

  let report = run_campaign(&app, "standard", &config(temp.path()), &LocalExecutor)
    .await
    .unwrap();

  assert_eq!(report.experiments.len(), 1);
  assert_eq!(
    report.experiments[0].status,
    ExperimentStatus::PartialMetrics
  );
  assert_eq!(
    report.experiments[0].metrics[0].value.as_deref(),
    Some("7.77")
  );
}

#[tokio::test]
async fn later_commands_see_files_from_earlier_ones() {
  let temp = tempdir().unwrap();

  // The second command consumes a file the first one produced, relying on
  // the declared sequential order.
  let app = Application::builder("staged")
    .executable("produce", "echo staged-output > step1.txt", false)
    .unwrap()
    .executable("consume", "cat step1.txt", false)
    .unwrap()
    .workload("standard", vec!["produce".to_string(), "consume".to_string()])
    .unwrap()
    .figure_of_merit(
      "Echoed",
      "{log_file}",
      r"(?P<word>staged-output)",
      "word",
      "",
    )
    .unwrap()
    .finish();

  let report = run_campaign(&app, "standard", &config(temp.path()), &LocalExecutor)
    .await
    .unwrap();

  assert_eq!(report.experiments[0].status, ExperimentStatus::Succeeded);
  assert_eq!(
    report.experiments[0].metrics[0].value.as_deref(),
    Some("staged-output")
  );
}
