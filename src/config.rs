use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Serialized;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Workspace-level settings shared by every experiment in a campaign.
///
/// Resolution order: built-in defaults, then `sweeplab.json` in the working
/// directory (if present), then `SWEEPLAB_*` environment variables. CLI
/// flags override individual fields on top of the loaded value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
  /// Root directory run directories are materialized under.
  pub root: PathBuf,

  /// Whether materialization may replace an existing non-empty run
  /// directory.
  pub overwrite: bool,

  /// Launch-wrapper template prefixed to `use_mpi` commands. Expanded
  /// against the experiment context, so it may reference variables.
  pub mpi_command: String,

  /// Default rank count, published to experiments that do not declare an
  /// `n_ranks` variable themselves.
  pub n_ranks: String,
}

impl Default for WorkspaceConfig {
  fn default() -> Self {
    Self {
      root: PathBuf::from("campaigns"),
      overwrite: false,
      mpi_command: "mpirun -n {n_ranks}".to_string(),
      n_ranks: "1".to_string(),
    }
  }
}

impl WorkspaceConfig {
  pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
    let file = file.unwrap_or_else(|| Path::new("sweeplab.json"));

    Figment::from(Serialized::defaults(WorkspaceConfig::default()))
      .merge(Json::file(file))
      .merge(Env::prefixed("SWEEPLAB_"))
      .extract()
  }
}
