//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of PipelineScript.
//! The PipelineScript project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # PipelineScript Core Library
//!
//! PipelineScript is a small line-oriented language for tabular machine
//! learning workflows: load a dataset, prepare it, split it, train a model
//! and evaluate it.
//!
//! ## Module Overview
//!
//! - **dsl**: lexer, parser, program IR and compiler
//! - **command**: the command trait, option specs and the command registry
//! - **commands**: the bundled commands (`load`, `clean`, `encode`, ...)
//! - **executor**: runs a step sequence and captures failures in a result
//! - **debugger**: steps through a sequence with breakpoints
//! - **pipeline**: fluent builder producing the same program as the parser
//! - **context**: typed execution state shared by the steps of one run
//! - **dataset** / **io**: in-memory tables and CSV/JSON(L) loading
//! - **model** / **metrics**: native classifiers and evaluation
//! - **backend**: loader, trainer and evaluator seams
//! - **visualizer**: read-only renderings of a program
//! - **config**: seeds, CSV dialect and validation strictness
//!
//! ## Feature Flags
//!
//! - `parallel`: trains forest members on a Rayon pool
//! - `compression`: reads and writes `.gz` / `.zst` datasets
//! - `full`: enables all features (default)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let result = pipelinescript::run(r#"
//!     load data/iris.csv
//!     clean missing
//!     encode
//!     split 80/20 --target species
//!     train random_forest
//!     evaluate
//! "#);
//! assert!(result.success);
//! println!("accuracy: {:?}", result.context.metric("accuracy"));
//! ```
//!
//! ## Error Handling
//!
//! `parse` and `compile` return `Result<T, PsError>` and fail fast. `run`
//! never returns an error: syntax, validation and execution failures all end
//! up in [`PsRunResult::error`] with `success == false`.

pub mod errors;
pub mod config;
pub mod dsl;
pub mod command;
pub mod commands;
pub mod dataset;
pub mod context;
pub mod metrics;
pub mod model;
pub mod io;
pub mod backend;
pub mod executor;
pub mod debugger;
pub mod pipeline;
pub mod visualizer;

pub use errors::{PsError, Result};
pub use config::PsConfig;
pub use dsl::{PsCompiler, PsLexer, PsParser, PsProgram, PsStep, PsStepSequence, PsSyntaxNode, PsToken, PsTokenKind};
pub use command::{PsCommand, PsCommandInput, PsCommandRegistry, PsCommandSpec, PsOptionKind, PsOptionSpec};
pub use dataset::{PsColumnKind, PsColumnStats, PsDataset, PsRow};
pub use context::{PsContext, PsReadiness, PsSplit};
pub use metrics::{PsClassificationEvaluator, PsClassificationReport, PsMetric, PsMetrics};
pub use model::{PsAlgorithm, PsHyperParams, PsNativeTrainer, PsTrainRequest, PsTrainedModel};
pub use io::{PsCompression, PsDataFormat, PsFileLoader, PsIO};
pub use backend::{PsBackends, PsDataLoader, PsEvaluationBackend, PsTrainingBackend};
pub use executor::{PsExecutor, PsRunResult, PsStepReport};
pub use debugger::PsDebugger;
pub use pipeline::{quick_classification, PsPipeline};
pub use visualizer::{PsVisualFormat, PsVisualizer};

/// Crate version, as reported by the command-line runner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parses script text into a program.
pub fn parse(source: &str) -> Result<PsProgram> {
    dsl::parse(source)
}

/// Compiles a program against the bundled commands.
pub fn compile(program: &PsProgram) -> Result<PsStepSequence> {
    dsl::compile(program)
}

/// Parses, compiles and executes `source` with the default configuration.
pub fn run(source: &str) -> PsRunResult {
    run_with_config(source, &PsConfig::default())
}

pub fn run_with_config(source: &str, config: &PsConfig) -> PsRunResult {
    let steps = parse(source).and_then(|program| PsCompiler::new().with_config(config.clone()).compile(&program));
    match steps {
        Ok(steps) => PsExecutor::with_config(config.clone()).execute(&steps),
        Err(err) => {
            log::error!("script rejected before execution: {}", err);
            PsRunResult::failed(err)
        }
    }
}

/// Parses and compiles `source`, returning a debugger paused before the
/// first step.
pub fn debug(source: &str) -> Result<PsDebugger> {
    debug_with_config(source, &PsConfig::default())
}

pub fn debug_with_config(source: &str, config: &PsConfig) -> Result<PsDebugger> {
    let program = parse(source)?;
    let steps = PsCompiler::new().with_config(config.clone()).compile(&program)?;
    Ok(PsDebugger::with_executor(steps, PsExecutor::with_config(config.clone())))
}
