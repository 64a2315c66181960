use crate::application::Application;
use crate::application::ApplicationRegistry;
use crate::application::VariableDefault;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// File name looked up in each application directory.
pub const SWEEPFILE_NAME: &str = "sweepfile.toml";

#[derive(Debug, Deserialize)]
struct SweepfileDef {
  name: String,
  #[serde(default)]
  tags: Vec<String>,
  #[serde(default)]
  executables: Vec<ExecutableDef>,
  #[serde(default)]
  workloads: Vec<WorkloadDef>,
  #[serde(default)]
  variables: Vec<VariableDef>,
  #[serde(default)]
  figures_of_merit: Vec<FomDef>,
  #[serde(default)]
  input_files: Vec<InputFileDef>,
}

#[derive(Debug, Deserialize)]
struct ExecutableDef {
  name: String,
  template: String,
  #[serde(default)]
  use_mpi: bool,
}

#[derive(Debug, Deserialize)]
struct WorkloadDef {
  name: String,
  executables: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VariableDef {
  name: String,
  default: DefaultDef,
  #[serde(default)]
  description: String,
  #[serde(default)]
  workloads: Vec<String>,
}

/// A scalar string is a plain variable; a list makes the variable a sweep
/// axis.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DefaultDef {
  Scalar(String),
  List(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct FomDef {
  name: String,
  log_file: String,
  pattern: String,
  group: String,
  #[serde(default)]
  units: String,
}

#[derive(Debug, Deserialize)]
struct InputFileDef {
  path: String,
  content: String,
  #[serde(default)]
  workloads: Vec<String>,
}

/// Parses one `sweepfile.toml` and replays its declarations through the
/// [`Application`] builder, so every registration-time check applies to
/// file-defined applications exactly as to programmatic ones.
pub fn load_application(path: &Path) -> Result<Application> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("Failed to read {}", path.display()))?;
  let def: SweepfileDef =
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

  let mut builder = Application::builder(def.name);
  for tag in def.tags {
    builder = builder.tag(tag);
  }
  for exe in def.executables {
    builder = builder.executable(exe.name, exe.template, exe.use_mpi)?;
  }
  for workload in def.workloads {
    builder = builder.workload(workload.name, workload.executables)?;
  }
  for var in def.variables {
    let default = match var.default {
      DefaultDef::Scalar(value) => VariableDefault::Scalar(value),
      DefaultDef::List(values) => VariableDefault::List(values),
    };
    builder = builder.variable(var.name, default, var.description, var.workloads)?;
  }
  for fom in def.figures_of_merit {
    builder = builder.figure_of_merit(fom.name, fom.log_file, &fom.pattern, fom.group, fom.units)?;
  }
  for input in def.input_files {
    builder = builder.input_file(input.path, input.content, input.workloads)?;
  }

  Ok(builder.finish())
}

/// Scans `applications_dir` for `<name>/sweepfile.toml` definitions and
/// registers each one.
pub fn load_directory(applications_dir: &Path) -> Result<ApplicationRegistry> {
  tracing::info!(
    "Scanning for applications in {}",
    applications_dir.display()
  );

  if !applications_dir.exists() {
    anyhow::bail!(
      "Applications directory not found: {}",
      applications_dir.display()
    );
  }

  let mut registry = ApplicationRegistry::new();

  for entry in fs::read_dir(applications_dir)? {
    let entry = entry?;
    let path = entry.path();

    if path.is_dir() {
      let sweepfile = path.join(SWEEPFILE_NAME);
      if sweepfile.exists() {
        let application = load_application(&sweepfile)?;
        tracing::info!(
          "Registered application: {} ({} workloads)",
          application.name,
          application.workloads.len()
        );
        registry.add(application)?;
      }
    }
  }

  Ok(registry)
}
