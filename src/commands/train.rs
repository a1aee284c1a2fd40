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

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec, PsOptionSpec};
use crate::context::PsContext;
use crate::errors::{PsError, Result};
use crate::model::{PsAlgorithm, PsHyperParams, PsTrainRequest};

const HYPER_PARAMETERS: [&str; 6] = ["trees", "max_depth", "k", "iterations", "learning_rate", "seed"];

#[derive(Debug)]
pub struct PsTrain {
    algorithm: PsAlgorithm,
    target: Option<String>,
    params: PsHyperParams,
}

impl PsTrain {
    pub fn new(algorithm: PsAlgorithm, target: Option<String>, params: PsHyperParams) -> Self {
        Self {
            algorithm,
            target,
            params,
        }
    }
}

impl PsCommand for PsTrain {
    fn name(&self) -> &'static str {
        "train"
    }

    fn execute(&self, ctx: &mut PsContext, backends: &PsBackends) -> Result<String> {
        let split = ctx.require_split()?;
        let target = self.target.as_deref().or(ctx.target.as_deref()).ok_or_else(|| {
            PsError::precondition(
                "target",
                "no target column designated; use `split <ratio> --target <column>` or `train <algorithm> --target <column>`",
            )
        })?;

        let request = PsTrainRequest {
            train: &split.train,
            target,
            algorithm: self.algorithm,
            params: &self.params,
            seed: ctx.seed,
            label_names: ctx.encodings.get(target).map(Vec::as_slice),
        };
        let model = backends.trainer.train(&request)?;

        let message = format!(
            "Trained {} on {} rows ({} features, {} classes)",
            model.algorithm,
            model.trained_rows,
            model.features.len(),
            model.classes.len()
        );
        let target = target.to_string();
        ctx.target = Some(target);
        ctx.model = Some(model);
        ctx.metrics.clear();
        Ok(message)
    }
}

pub fn train_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    let name = input.args[0].as_str();
    let algorithm = PsAlgorithm::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = PsAlgorithm::ALL.iter().map(PsAlgorithm::as_str).collect();
        input.error(format!("unknown algorithm '{name}' (known: {})", known.join(", ")))
    })?;

    for key in input.options.keys() {
        if HYPER_PARAMETERS.contains(&key.as_str()) && !algorithm.accepts(key) {
            return Err(input.error(format!("--{key} does not apply to {algorithm}")));
        }
    }

    let params = PsHyperParams {
        trees: input.option_usize("trees")?,
        max_depth: input.option_usize("max_depth")?,
        k: input.option_usize("k")?,
        iterations: input.option_usize("iterations")?,
        learning_rate: input.option_f64("learning_rate")?,
        seed: input.option_u64("seed")?,
    };
    for (key, value) in [
        ("trees", params.trees),
        ("max_depth", params.max_depth),
        ("k", params.k),
        ("iterations", params.iterations),
    ] {
        if value == Some(0) {
            return Err(input.error(format!("--{key} must be at least 1")));
        }
    }
    if params.learning_rate.is_some_and(|lr| lr <= 0.0) {
        return Err(input.error("--learning_rate must be positive"));
    }

    let target = input.option("target").map(str::to_string);
    Ok(Box::new(PsTrain::new(algorithm, target, params)))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("train", "train <algorithm> [--target column] [hyper-parameters]", train_factory)
        .args(1, Some(1))
        .option(PsOptionSpec::text("target"))
        .option(PsOptionSpec::integer("seed"))
        .option(PsOptionSpec::integer("trees"))
        .option(PsOptionSpec::integer("max_depth"))
        .option(PsOptionSpec::integer("k"))
        .option(PsOptionSpec::integer("iterations"))
        .option(PsOptionSpec::number("learning_rate"))
}
