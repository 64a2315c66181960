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

//! # Sweeplab
//!
//! `sweeplab` is a framework for generating and running parameterized
//! benchmark campaigns. From a declarative application definition
//! (workloads, variables, executables, figures of merit) it produces the
//! cross-product matrix of experiment instances, materializes each one into
//! an isolated run directory with fully resolved commands and input files,
//! executes them, and extracts structured metrics from their logs.
//!
//! This crate contains the main library logic for the `sweep` CLI, but the
//! engine modules (`expander`, `matrix`, `materialize`, `fom`) can be used
//! independently.
//!
//! ## Core Modules
//!
//! * [`expander`]: Resolves `{name}` placeholders against a layered variable
//!   namespace, recursively, with cycle detection.
//! * [`application`]: The in-memory application model and its registration
//!   builder; validation happens at declaration time.
//! * [`matrix`]: Turns the cross-product of a workload's vector variables
//!   into concrete, uniquely named experiments.
//! * [`materialize`]: Creates isolated run directories, writes input files,
//!   and resolves each executable's command line.
//! * [`fom`]: Scans log files with named-capture-group patterns and produces
//!   typed metric records.
//! * [`campaign`]: Drives matrix -> materialize -> execute -> extract and
//!   reports per-experiment status.
//! * [`definition`]: Loads `sweepfile.toml` application definitions into an
//!   [`application::ApplicationRegistry`].
//! * [`execute`]: The execution collaborator interface and a local
//!   process-based implementation.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`command`]: Defines the shared `ResolvedCommand` struct.
//! * [`config`]: Loads the `WorkspaceConfig` (file, env, defaults).
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod application;
pub mod campaign;
pub mod cli;
pub mod command;
pub mod config;
pub mod definition;
pub mod error;
pub mod execute;
pub mod expander;
pub mod fom;
pub mod logging;
pub mod materialize;
pub mod matrix;
