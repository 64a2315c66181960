use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Generator and runner of parameterized benchmark campaigns")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// List registered applications, their workloads, and variables.
  List {
    /// Directory scanned for `<name>/sweepfile.toml` definitions.
    #[arg(long, default_value = "applications")]
    applications_dir: PathBuf,
  },

  /// Materialize run directories and resolved commands without executing.
  Generate(CampaignArgs),

  /// Generate, execute, and extract metrics for a full campaign.
  Run(CampaignArgs),

  /// Re-extract figures of merit from existing run directories.
  Analyze(CampaignArgs),
}

#[derive(Debug, Args)]
pub struct CampaignArgs {
  /// Directory scanned for `<name>/sweepfile.toml` definitions.
  #[arg(long, default_value = "applications")]
  pub applications_dir: PathBuf,

  /// Application to build the campaign for.
  #[arg(long)]
  pub application: String,

  /// Workload within the application.
  #[arg(long)]
  pub workload: String,

  /// Workspace root for run directories (overrides the loaded config).
  #[arg(long)]
  pub root: Option<PathBuf>,

  /// Allow materialization to replace existing non-empty run directories.
  #[arg(long)]
  pub overwrite: bool,
}
