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
use Commands::Analyze;
use Commands::Generate;
use Commands::List;
use Commands::Run;
use anyhow::Result;
use clap::Parser;
use sweeplab::campaign::CampaignReport;
use sweeplab::campaign::analyze_campaign;
use sweeplab::campaign::generate_campaign;
use sweeplab::campaign::run_campaign;
use sweeplab::cli::CampaignArgs;
use sweeplab::cli::Cli;
use sweeplab::cli::Commands;
use sweeplab::config::WorkspaceConfig;
use sweeplab::definition::load_directory;
use sweeplab::execute::LocalExecutor;
use sweeplab::logging::setup_tracing;

#[tokio::main]
async fn main() -> Result<()> {
  setup_tracing()?;

  let Cli { command } = Cli::parse();
  let main_span = tracing::info_span!("campaigner");
  let _enter = main_span.enter();

  match command {
    List { applications_dir } => {
      let registry = load_directory(&applications_dir)?;

      for app in registry.iter() {
        println!("{} [{}]", app.name, app.tags.join(", "));
        for workload in &app.workloads {
          println!("  workload {} ({})", workload.name, workload.executables.join(" -> "));
        }
        for var in &app.variables {
          println!("  variable {} - {}", var.name, var.description);
        }
      }
    }
    Generate(args) => {
      tracing::info!("Materializing campaign...");

      let (config, registry) = campaign_setup(&args)?;
      let application = registry.get(&args.application)?;

      let report = generate_campaign(application, &args.workload, &config)?;
      emit_report(&report, &config)?;
    }
    Run(args) => {
      tracing::info!("Initializing campaign run...");

      let (config, registry) = campaign_setup(&args)?;
      let application = registry.get(&args.application)?;

      let report = run_campaign(application, &args.workload, &config, &LocalExecutor).await?;
      emit_report(&report, &config)?;
    }
    Analyze(args) => {
      tracing::info!("Analyzing existing run directories...");

      let (config, registry) = campaign_setup(&args)?;
      let application = registry.get(&args.application)?;

      let report = analyze_campaign(application, &args.workload, &config)?;
      emit_report(&report, &config)?;
    }
  }

  Ok(())
}

/// Loads the workspace config (with CLI overrides applied) and the
/// application registry.
fn campaign_setup(
  args: &CampaignArgs,
) -> Result<(WorkspaceConfig, sweeplab::application::ApplicationRegistry)> {
  let mut config = WorkspaceConfig::load(None)?;
  if let Some(root) = &args.root {
    config.root = root.clone();
  }
  if args.overwrite {
    config.overwrite = true;
  }

  let registry = load_directory(&args.applications_dir)?;
  Ok((config, registry))
}

/// Prints one JSON line per experiment and persists the full report.
fn emit_report(report: &CampaignReport, config: &WorkspaceConfig) -> Result<()> {
  for experiment in &report.experiments {
    println!("{}", serde_json::to_string(experiment)?);
  }

  let path = report.write(&config.root)?;
  tracing::info!("Campaign report written to {}", path.display());
  Ok(())
}
