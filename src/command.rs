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
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// A fully resolved command ready for an execution collaborator.
///
/// This struct is the "contract" between the materializer and whatever runs
/// the campaign: every placeholder in `line` has been expanded, MPI wrapping
/// has already been applied, and the command is expected to run with
/// `working_dir` as its working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCommand {
  /// The expanded command line (e.g. "mpirun -n 4 xhpcg").
  pub line: String,

  /// The experiment run directory the command executes in.
  pub working_dir: PathBuf,

  /// Whether the line was routed through the MPI launch wrapper.
  pub use_mpi: bool,
}
