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

//! # Fluent Pipeline Builder
//!
//! Builds the same [`PsProgram`] the parser would produce from text. Each
//! chained call appends one syntax node; nothing is validated until
//! [`PsPipeline::compile`] or [`PsPipeline::run`].
//!
//! ```rust,ignore
//! let result = PsPipeline::new()
//!     .load("iris.csv")
//!     .clean_missing()
//!     .encode()
//!     .split_with_target(0.8, "species")
//!     .train("random_forest")
//!     .evaluate()
//!     .run();
//! ```

use std::path::Path;

use crate::backend::PsBackends;
use crate::config::PsConfig;
use crate::dsl::compiler::{PsCompiler, PsStepSequence};
use crate::dsl::ir::{PsProgram, PsSyntaxNode};
use crate::errors::Result;
use crate::executor::{PsExecutor, PsRunResult};

#[derive(Clone, Debug, Default)]
pub struct PsPipeline {
    program: PsProgram,
    config: PsConfig,
    backends: Option<PsBackends>,
}

impl PsPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PsConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the native loader/trainer/evaluator used by [`run`](Self::run).
    pub fn with_backends(mut self, backends: PsBackends) -> Self {
        self.backends = Some(backends);
        self
    }

    /// Appends an arbitrary node.
    pub fn step(mut self, node: PsSyntaxNode) -> Self {
        let line = self.program.len() + 1;
        self.program.push(node.at_line(line));
        self
    }

    pub fn load(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.step(PsSyntaxNode::new("load").arg(path))
    }

    pub fn clean(self, strategy: &str) -> Self {
        self.step(PsSyntaxNode::new("clean").arg(strategy))
    }

    pub fn clean_missing(self) -> Self {
        self.clean("missing")
    }

    pub fn drop_duplicates(self) -> Self {
        self.clean("duplicates")
    }

    /// Label-encodes every categorical column.
    pub fn encode(self) -> Self {
        self.step(PsSyntaxNode::new("encode"))
    }

    pub fn encode_columns<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step(with_args(PsSyntaxNode::new("encode"), columns))
    }

    pub fn encode_onehot<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step(with_args(PsSyntaxNode::new("encode"), columns).option("method", "onehot"))
    }

    pub fn scale(self, method: &str) -> Self {
        self.step(PsSyntaxNode::new("scale").arg(method))
    }

    pub fn drop<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step(with_args(PsSyntaxNode::new("drop"), columns))
    }

    pub fn select<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step(with_args(PsSyntaxNode::new("select"), columns))
    }

    /// Splits with `fraction` of rows for training; `0.8` renders as `80/20`.
    pub fn split(self, fraction: f64) -> Self {
        self.step(PsSyntaxNode::new("split").arg(ratio_text(fraction)))
    }

    pub fn split_with_target(self, fraction: f64, target: &str) -> Self {
        self.step(
            PsSyntaxNode::new("split")
                .arg(ratio_text(fraction))
                .option("target", target),
        )
    }

    pub fn train(self, algorithm: &str) -> Self {
        self.step(PsSyntaxNode::new("train").arg(algorithm))
    }

    /// Trains with explicit `--key value` hyper-parameters.
    pub fn train_with<I, K, V>(self, algorithm: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let node = params
            .into_iter()
            .fold(PsSyntaxNode::new("train").arg(algorithm), |node, (k, v)| {
                node.option(k, v.to_string())
            });
        self.step(node)
    }

    pub fn evaluate(self) -> Self {
        self.step(PsSyntaxNode::new("evaluate"))
    }

    pub fn export(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.step(PsSyntaxNode::new("export").arg(path))
    }

    pub fn save(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.step(PsSyntaxNode::new("save").arg(path))
    }

    pub fn program(&self) -> &PsProgram {
        &self.program
    }

    pub fn into_program(self) -> PsProgram {
        self.program
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// Canonical script text, one command per line.
    pub fn get_script(&self) -> String {
        self.program.render()
    }

    pub fn compile(&self) -> Result<PsStepSequence> {
        PsCompiler::new().with_config(self.config.clone()).compile(&self.program)
    }

    pub fn run(&self) -> PsRunResult {
        let steps = match self.compile() {
            Ok(steps) => steps,
            Err(err) => {
                log::error!("pipeline failed to compile: {}", err);
                return PsRunResult::failed(err);
            }
        };
        let mut executor = PsExecutor::with_config(self.config.clone());
        if let Some(backends) = &self.backends {
            executor = executor.with_backends(backends.clone());
        }
        executor.execute(&steps)
    }
}

/// The canonical classification pipeline:
/// load, clean missing, encode, split 80/20 on `target`, train, evaluate.
pub fn quick_classification(path: impl AsRef<Path>, target: &str, algorithm: &str) -> PsPipeline {
    PsPipeline::new()
        .load(path)
        .clean_missing()
        .encode()
        .split_with_target(0.8, target)
        .train(algorithm)
        .evaluate()
}

fn with_args<I, S>(node: PsSyntaxNode, args: I) -> PsSyntaxNode
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().fold(node, |node, arg| node.arg(arg))
}

/// Percent pair for a training fraction, e.g. `0.75` -> `75/25`. Fractions
/// finer than a tenth of a percent keep their exact form, e.g. `0.8125/0.1875`.
fn ratio_text(fraction: f64) -> String {
    let permille = fraction * 1000.0;
    if (permille - permille.round()).abs() > 1e-9 {
        let train = fraction.to_string();
        let places = train.split_once('.').map_or(0, |(_, digits)| digits.len());
        return format!("{train}/{:.places$}", 1.0 - fraction);
    }
    let train = permille.round() / 10.0;
    let test = ((100.0 - train) * 10.0).round() / 10.0;
    format!("{}/{}", percent_text(train), percent_text(test))
}

fn percent_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}
