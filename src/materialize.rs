use crate::application::Application;
use crate::command::ResolvedCommand;
use crate::config::WorkspaceConfig;
use crate::error::MaterializeError;
use crate::expander::expand;
use crate::matrix::Experiment;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// External launch-wrapper collaborator for `use_mpi` executables.
///
/// `wrap` receives the raw command template and returns the template to
/// expand instead; the materializer expands the result against the
/// experiment context, so the wrapper may reference variables such as
/// `{n_ranks}` itself.
pub trait MpiLauncher {
  fn wrap(&self, command_template: &str) -> String;
}

/// Default launcher: prefixes the command with a configured template,
/// e.g. `mpirun -n {n_ranks}`.
#[derive(Debug, Clone)]
pub struct TemplateLauncher {
  prefix: String,
}

impl TemplateLauncher {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
    }
  }
}

impl MpiLauncher for TemplateLauncher {
  fn wrap(&self, command_template: &str) -> String {
    format!("{} {}", self.prefix, command_template)
  }
}

/// Removes a directory this materialization created if a later step fails.
/// Disarmed once the experiment is fully materialized.
struct DirGuard {
  path: PathBuf,
  armed: bool,
}

impl DirGuard {
  fn disarm(mut self) {
    self.armed = false;
  }
}

impl Drop for DirGuard {
  fn drop(&mut self) {
    if self.armed {
      if let Err(e) = fs::remove_dir_all(&self.path) {
        tracing::warn!(path = %self.path.display(), error = %e, "Failed to clean up partial run directory");
      }
    }
  }
}

/// Materializes one experiment: creates its isolated run directory, writes
/// the declared input files, and resolves the workload's command sequence.
///
/// Fails with [`MaterializeError::DirectoryConflict`] when the run directory
/// already exists non-empty and the workspace does not allow overwriting.
/// Expansion failures propagate; a directory created here is removed again on
/// any failure, leaving no partial experiment behind. The resolved commands
/// are recorded on the experiment and returned; nothing is executed.
pub fn materialize(
  application: &Application,
  experiment: &mut Experiment,
  config: &WorkspaceConfig,
  launcher: &dyn MpiLauncher,
) -> Result<Vec<ResolvedCommand>, MaterializeError> {
  if !experiment.context.contains("n_ranks") {
    experiment.context.set("n_ranks", &config.n_ranks);
  }

  let workload = application
    .workload(&experiment.workload)
    .ok_or_else(|| MaterializeError::UnknownWorkload(experiment.workload.clone()))?;

  let run_dir = experiment.bind_run_dir(&config.root);
  let guard = prepare_run_dir(&run_dir, config.overwrite)?;

  tracing::debug!(experiment = %experiment.name, dir = %run_dir.display(), "Materializing experiment");

  for input in application.input_files_for(&experiment.workload) {
    let path = expand(&input.path, &experiment.context)?;
    let content = expand(&input.content, &experiment.context)?;

    // Relative input paths land inside the run directory.
    let path = if Path::new(&path).is_absolute() {
      PathBuf::from(path)
    } else {
      run_dir.join(path)
    };
    fs::write(&path, content).map_err(|source| MaterializeError::WriteInput { path, source })?;
  }

  let mut commands = Vec::with_capacity(workload.executables.len());
  for exe_name in &workload.executables {
    let Some(exe) = application.executable(exe_name) else {
      // Registration rejects dangling references, so this indicates a model
      // mutated after validation.
      tracing::error!(executable = %exe_name, "Internal error: no executable found for reference. Skipping.");
      continue;
    };

    let template = if exe.use_mpi {
      launcher.wrap(&exe.template)
    } else {
      exe.template.clone()
    };
    let line = expand(&template, &experiment.context)?;

    commands.push(ResolvedCommand {
      line,
      working_dir: run_dir.clone(),
      use_mpi: exe.use_mpi,
    });
  }

  guard.disarm();
  experiment.commands = commands.clone();
  Ok(commands)
}

/// Creates the run directory, enforcing the overwrite policy. Returns a
/// guard armed only when this call created the directory.
fn prepare_run_dir(run_dir: &Path, overwrite: bool) -> Result<DirGuard, MaterializeError> {
  if run_dir.exists() {
    let mut entries = fs::read_dir(run_dir).map_err(|source| MaterializeError::InspectDir {
      path: run_dir.to_path_buf(),
      source,
    })?;
    if entries.next().is_some() {
      if !overwrite {
        return Err(MaterializeError::DirectoryConflict(run_dir.to_path_buf()));
      }
      // Explicit overwrite starts from a clean slate.
      fs::remove_dir_all(run_dir).map_err(|source| MaterializeError::CreateDir {
        path: run_dir.to_path_buf(),
        source,
      })?;
    } else {
      return Ok(DirGuard {
        path: run_dir.to_path_buf(),
        armed: false,
      });
    }
  }

  fs::create_dir_all(run_dir).map_err(|source| MaterializeError::CreateDir {
    path: run_dir.to_path_buf(),
    source,
  })?;
  Ok(DirGuard {
    path: run_dir.to_path_buf(),
    armed: true,
  })
}
