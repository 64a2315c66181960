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
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error enum for the sweeplab library.
#[derive(Error, Debug)]
pub enum SweeplabError {
  #[error("Variable expansion failed")]
  Expand(#[from] ExpandError),

  #[error("Invalid application definition")]
  Model(#[from] ModelError),

  #[error("Experiment matrix generation failed")]
  Matrix(#[from] MatrixError),

  #[error("Experiment materialization failed")]
  Materialize(#[from] MaterializeError),

  #[error("Figure-of-merit extraction failed")]
  Extract(#[from] ExtractError),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON serialization/deserialization error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Errors raised while expanding `{name}` placeholders (src/expander.rs).
#[derive(Error, Debug)]
pub enum ExpandError {
  #[error("Unresolved variable '{name}' while expanding '{template}'")]
  UnresolvedVariable { name: String, template: String },

  #[error("Cyclic expansion: variable '{name}' depends on itself (chain: {chain})")]
  CyclicExpansion { name: String, chain: String },
}

/// Errors raised while registering an application model (src/application.rs).
#[derive(Error, Debug)]
pub enum ModelError {
  #[error("Duplicate workload '{0}'")]
  DuplicateWorkload(String),

  #[error("Duplicate executable '{0}'")]
  DuplicateExecutable(String),

  #[error("Duplicate variable '{name}' in scope '{scope}'")]
  DuplicateVariable { name: String, scope: String },

  #[error("Duplicate figure of merit '{0}'")]
  DuplicateFigureOfMerit(String),

  #[error("Workload '{workload}' references unknown executable '{executable}'")]
  UnknownExecutable { workload: String, executable: String },

  #[error("'{owner}' is scoped to unknown workload '{workload}'")]
  UnknownWorkloadRef { owner: String, workload: String },

  #[error("Figure of merit '{fom}' has an invalid pattern")]
  BadPattern {
    fom: String,
    #[source]
    source: Box<regex::Error>,
  },

  #[error("Figure of merit '{fom}': pattern has no capture group named '{group}'")]
  MalformedPattern { fom: String, group: String },

  #[error("Application '{0}' is already registered")]
  DuplicateApplication(String),

  #[error("Unknown application '{name}'. Available: {available:?}")]
  UnknownApplication { name: String, available: Vec<String> },
}

/// Errors raised while building the experiment matrix (src/matrix.rs).
#[derive(Error, Debug)]
pub enum MatrixError {
  #[error("Unknown workload '{name}' for application '{application}'. Available: {available:?}")]
  UnknownWorkload {
    application: String,
    name: String,
    available: Vec<String>,
  },
}

/// Errors raised while materializing a run directory (src/materialize.rs).
#[derive(Error, Debug)]
pub enum MaterializeError {
  #[error("Run directory already exists and is not empty: {0}")]
  DirectoryConflict(PathBuf),

  #[error("Experiment references unknown workload '{0}'")]
  UnknownWorkload(String),

  #[error(transparent)]
  Expand(#[from] ExpandError),

  #[error("Failed to create run directory {path}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to inspect run directory {path}")]
  InspectDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write input file {path}")]
  WriteInput {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Errors raised while extracting figures of merit (src/fom.rs).
#[derive(Error, Debug)]
pub enum ExtractError {
  #[error(transparent)]
  Expand(#[from] ExpandError),

  #[error(
    "Figure of merit '{fom}': pattern matched but group '{group}' did not participate in the match"
  )]
  MalformedPattern { fom: String, group: String },

  #[error("Failed to read log file {path}")]
  ReadLog {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
