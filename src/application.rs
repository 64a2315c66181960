use crate::error::ModelError;
use regex::Regex;

/// A command template owned by an application.
///
/// The template is the full command line with `{name}` placeholders still in
/// place; it is only resolved against a concrete experiment context during
/// materialization. `use_mpi` commands are routed through the configured
/// launch wrapper at that point.
#[derive(Debug, Clone)]
pub struct Executable {
  pub name: String,
  pub template: String,
  pub use_mpi: bool,
}

/// A named execution scenario: an ordered sequence of executable references.
#[derive(Debug, Clone)]
pub struct Workload {
  pub name: String,
  pub executables: Vec<String>,
}

/// A variable's declared default: either a scalar template or a list of
/// candidate values. A list is a sweep axis for matrix expansion, even when
/// it holds a single element.
#[derive(Debug, Clone)]
pub enum VariableDefault {
  Scalar(String),
  List(Vec<String>),
}

impl VariableDefault {
  pub fn is_axis(&self) -> bool {
    matches!(self, VariableDefault::List(_))
  }
}

/// A declared variable. An empty `workloads` set makes it global; otherwise
/// it is visible only to the named workloads, shadowing any global of the
/// same name there.
#[derive(Debug, Clone)]
pub struct Variable {
  pub name: String,
  pub default: VariableDefault,
  pub description: String,
  pub workloads: Vec<String>,
}

impl Variable {
  fn is_global(&self) -> bool {
    self.workloads.is_empty()
  }

  fn scoped_to(&self, workload: &str) -> bool {
    self.is_global() || self.workloads.iter().any(|w| w == workload)
  }
}

/// A metric definition: scan `log_file` (a template) with `pattern` and take
/// the text captured by the group named `group`.
#[derive(Debug, Clone)]
pub struct FigureOfMerit {
  pub name: String,
  pub log_file: String,
  pub pattern: Regex,
  pub group: String,
  pub units: String,
}

/// An input file written into the run directory before execution. Both the
/// path and the (possibly multi-line) content are templates.
#[derive(Debug, Clone)]
pub struct InputFile {
  pub path: String,
  pub content: String,
  pub workloads: Vec<String>,
}

/// In-memory application model: pure data, validated at registration time.
///
/// Built through [`Application::builder`]; declaration order is preserved and
/// is significant (axis order in the experiment matrix follows variable
/// registration order).
#[derive(Debug, Clone)]
pub struct Application {
  pub name: String,
  pub tags: Vec<String>,
  pub workloads: Vec<Workload>,
  pub executables: Vec<Executable>,
  pub variables: Vec<Variable>,
  pub figures_of_merit: Vec<FigureOfMerit>,
  pub input_files: Vec<InputFile>,
}

impl Application {
  pub fn builder(name: impl Into<String>) -> ApplicationBuilder {
    ApplicationBuilder::new(name)
  }

  pub fn workload(&self, name: &str) -> Option<&Workload> {
    self.workloads.iter().find(|w| w.name == name)
  }

  pub fn workload_names(&self) -> Vec<String> {
    self.workloads.iter().map(|w| w.name.clone()).collect()
  }

  pub fn executable(&self, name: &str) -> Option<&Executable> {
    self.executables.iter().find(|e| e.name == name)
  }

  /// Variables visible to `workload`, in registration order. A
  /// workload-scoped variable shadows a global of the same name and keeps
  /// the global's position.
  pub fn variables_for(&self, workload: &str) -> Vec<&Variable> {
    let mut visible: Vec<&Variable> = Vec::new();
    for var in self.variables.iter().filter(|v| v.scoped_to(workload)) {
      match visible.iter().position(|seen| seen.name == var.name) {
        // A scoped variable wins over the global it shadows; registration
        // already rejects duplicates within one scope, so a second sighting
        // here is always global-then-scoped.
        Some(idx) if !var.is_global() => visible[idx] = var,
        Some(_) => {}
        None => visible.push(var),
      }
    }
    visible
  }

  pub fn input_files_for(&self, workload: &str) -> Vec<&InputFile> {
    self
      .input_files
      .iter()
      .filter(|f| f.workloads.is_empty() || f.workloads.iter().any(|w| w == workload))
      .collect()
  }
}

/// Registration surface for application models.
///
/// Each declaration appends to a validated in-memory structure. Cheap checks
/// (duplicate names, dangling executable references, pattern/group
/// consistency) happen here; anything that needs expansion is deferred to
/// materialization. Declaration order: executables, then workloads, then
/// variables / figures of merit / input files.
#[derive(Debug)]
pub struct ApplicationBuilder {
  app: Application,
}

impl ApplicationBuilder {
  fn new(name: impl Into<String>) -> Self {
    Self {
      app: Application {
        name: name.into(),
        tags: Vec::new(),
        workloads: Vec::new(),
        executables: Vec::new(),
        variables: Vec::new(),
        figures_of_merit: Vec::new(),
        input_files: Vec::new(),
      },
    }
  }

  pub fn tag(mut self, tag: impl Into<String>) -> Self {
    self.app.tags.push(tag.into());
    self
  }

  pub fn executable(
    mut self,
    name: impl Into<String>,
    template: impl Into<String>,
    use_mpi: bool,
  ) -> Result<Self, ModelError> {
    let name = name.into();
    if self.app.executable(&name).is_some() {
      return Err(ModelError::DuplicateExecutable(name));
    }
    self.app.executables.push(Executable {
      name,
      template: template.into(),
      use_mpi,
    });
    Ok(self)
  }

  pub fn workload(
    mut self,
    name: impl Into<String>,
    executables: Vec<String>,
  ) -> Result<Self, ModelError> {
    let name = name.into();
    if self.app.workload(&name).is_some() {
      return Err(ModelError::DuplicateWorkload(name));
    }
    for exe in &executables {
      if self.app.executable(exe).is_none() {
        return Err(ModelError::UnknownExecutable {
          workload: name,
          executable: exe.clone(),
        });
      }
    }
    self.app.workloads.push(Workload { name, executables });
    Ok(self)
  }

  pub fn variable(
    mut self,
    name: impl Into<String>,
    default: VariableDefault,
    description: impl Into<String>,
    workloads: Vec<String>,
  ) -> Result<Self, ModelError> {
    let name = name.into();
    self.check_workload_refs(&format!("variable '{name}'"), &workloads)?;

    for existing in self.app.variables.iter().filter(|v| v.name == name) {
      let same_scope = if workloads.is_empty() {
        existing.is_global()
      } else {
        workloads.iter().any(|w| existing.workloads.contains(w))
      };
      if same_scope {
        let scope = if workloads.is_empty() {
          "global".to_string()
        } else {
          format!("workloads {workloads:?}")
        };
        return Err(ModelError::DuplicateVariable {
          name: name.clone(),
          scope,
        });
      }
    }

    self.app.variables.push(Variable {
      name,
      default,
      description: description.into(),
      workloads,
    });
    Ok(self)
  }

  pub fn figure_of_merit(
    mut self,
    name: impl Into<String>,
    log_file: impl Into<String>,
    pattern: &str,
    group: impl Into<String>,
    units: impl Into<String>,
  ) -> Result<Self, ModelError> {
    let name = name.into();
    let group = group.into();
    if self.app.figures_of_merit.iter().any(|f| f.name == name) {
      return Err(ModelError::DuplicateFigureOfMerit(name));
    }

    let pattern = Regex::new(pattern).map_err(|source| ModelError::BadPattern {
      fom: name.clone(),
      source: Box::new(source),
    })?;

    // Static check that the designated group exists, so a definition that
    // can never yield a value is rejected up front instead of mid-campaign.
    let group_exists = pattern
      .capture_names()
      .flatten()
      .any(|candidate| candidate == group);
    if !group_exists {
      return Err(ModelError::MalformedPattern { fom: name, group });
    }

    self.app.figures_of_merit.push(FigureOfMerit {
      name,
      log_file: log_file.into(),
      pattern,
      group,
      units: units.into(),
    });
    Ok(self)
  }

  pub fn input_file(
    mut self,
    path: impl Into<String>,
    content: impl Into<String>,
    workloads: Vec<String>,
  ) -> Result<Self, ModelError> {
    let path = path.into();
    self.check_workload_refs(&format!("input file '{path}'"), &workloads)?;
    self.app.input_files.push(InputFile {
      path,
      content: content.into(),
      workloads,
    });
    Ok(self)
  }

  pub fn finish(self) -> Application {
    self.app
  }

  fn check_workload_refs(&self, owner: &str, workloads: &[String]) -> Result<(), ModelError> {
    for workload in workloads {
      if self.app.workload(workload).is_none() {
        return Err(ModelError::UnknownWorkloadRef {
          owner: owner.to_string(),
          workload: workload.clone(),
        });
      }
    }
    Ok(())
  }
}

/// Explicit application registry, one per campaign run.
///
/// Replaces any process-wide notion of "known applications": callers
/// construct a registry, fill it from their definition surface, and pass it
/// down. Dropping it tears everything down.
#[derive(Debug, Default)]
pub struct ApplicationRegistry {
  apps: Vec<Application>,
}

impl ApplicationRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, app: Application) -> Result<(), ModelError> {
    if self.apps.iter().any(|a| a.name == app.name) {
      return Err(ModelError::DuplicateApplication(app.name));
    }
    self.apps.push(app);
    Ok(())
  }

  pub fn get(&self, name: &str) -> Result<&Application, ModelError> {
    self
      .apps
      .iter()
      .find(|a| a.name == name)
      .ok_or_else(|| ModelError::UnknownApplication {
        name: name.to_string(),
        available: self.names(),
      })
  }

  pub fn names(&self) -> Vec<String> {
    self.apps.iter().map(|a| a.name.clone()).collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Application> {
    self.apps.iter()
  }
}
