use crate::application::Application;
use crate::application::Variable;
use crate::application::VariableDefault;
use crate::command::ResolvedCommand;
use crate::error::MatrixError;
use crate::expander::ExpansionContext;
use crate::fom::FomResult;
use std::path::Path;
use std::path::PathBuf;

/// One concrete instance drawn from the cross-product of a workload's vector
/// variables.
///
/// Identity is `(application, workload, chosen)` where `chosen` is the
/// ordered tuple of axis values; the derived `name` is reproducible and
/// collision-free for distinct tuples. The matrix builder creates the
/// experiment, the materializer fills `run_dir` and `commands`, and the
/// extractor's results are attached after execution.
#[derive(Debug, Clone)]
pub struct Experiment {
  pub application: String,
  pub workload: String,
  pub name: String,
  pub chosen: Vec<(String, String)>,
  pub context: ExpansionContext,
  pub run_dir: Option<PathBuf>,
  pub commands: Vec<ResolvedCommand>,
  pub results: Vec<FomResult>,
}

impl Experiment {
  /// Pins the experiment to a workspace root: computes the deterministic run
  /// directory `<root>/<application>/<workload>/<name>` and publishes it to
  /// the expansion context as `experiment_run_dir`.
  pub fn bind_run_dir(&mut self, root: &Path) -> PathBuf {
    let dir = root
      .join(&self.application)
      .join(&self.workload)
      .join(&self.name);
    self
      .context
      .set("experiment_run_dir", dir.to_string_lossy());
    self.run_dir = Some(dir.clone());
    dir
  }
}

/// Builds the experiment matrix for one workload.
///
/// Axes are the visible variables whose default is a list, in registration
/// order; values keep their list order. The Cartesian product of the axes
/// yields one experiment per tuple, named
/// `<workload>.<axis1>_<value1>.<axis2>_<value2>...`. Scalar variables are
/// copied unchanged (still as templates) into every experiment's context.
/// Zero axes produce exactly one experiment named after the workload.
pub fn build_matrix(
  application: &Application,
  workload_name: &str,
) -> Result<Vec<Experiment>, MatrixError> {
  let workload = application
    .workload(workload_name)
    .ok_or_else(|| MatrixError::UnknownWorkload {
      application: application.name.clone(),
      name: workload_name.to_string(),
      available: application.workload_names(),
    })?;

  let visible = application.variables_for(&workload.name);
  let axes: Vec<&Variable> = visible
    .iter()
    .copied()
    .filter(|v| v.default.is_axis())
    .collect();

  let mut tuples = Vec::new();
  cross_axes(&axes, 0, Vec::new(), &mut tuples);

  let mut experiments = Vec::with_capacity(tuples.len());
  for chosen in tuples {
    let name = experiment_name(&workload.name, &chosen);

    let mut context = ExpansionContext::new();
    for var in &visible {
      if let VariableDefault::Scalar(template) = &var.default {
        context.set(&var.name, template);
      }
    }
    for (axis, value) in &chosen {
      context.set(axis.clone(), value.clone());
    }
    context.set("application_name", &application.name);
    context.set("workload_name", &workload.name);
    context.set("experiment_name", &name);
    // Resolves once the materializer publishes `experiment_run_dir`.
    context.set("log_file", "{experiment_run_dir}/{experiment_name}.out");

    experiments.push(Experiment {
      application: application.name.clone(),
      workload: workload.name.clone(),
      name,
      chosen,
      context,
      run_dir: None,
      commands: Vec::new(),
      results: Vec::new(),
    });
  }

  Ok(experiments)
}

fn experiment_name(workload: &str, chosen: &[(String, String)]) -> String {
  let mut name = workload.to_string();
  for (axis, value) in chosen {
    name.push('.');
    name.push_str(axis);
    name.push('_');
    name.push_str(value);
  }
  name
}

fn cross_axes(
  axes: &[&Variable],
  idx: usize,
  current: Vec<(String, String)>,
  out: &mut Vec<Vec<(String, String)>>,
) {
  if idx == axes.len() {
    out.push(current);
    return;
  }
  let VariableDefault::List(values) = &axes[idx].default else {
    return;
  };
  for value in values {
    let mut next = current.clone();
    next.push((axes[idx].name.clone(), value.clone()));
    cross_axes(axes, idx + 1, next, out);
  }
}
