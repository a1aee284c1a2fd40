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

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec, PsOptionSpec};
use crate::context::{PsContext, PsSplit};
use crate::errors::{PsError, Result};

const RATIO_TOLERANCE: f64 = 0.001;

fn ratio_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\s*$").expect("ratio pattern is valid")
    })
}

/// Parses `train/test` as percentages summing to 100 or fractions summing
/// to 1, returning the train fraction.
pub fn parse_ratio(text: &str) -> std::result::Result<f64, String> {
    let captures = ratio_pattern()
        .captures(text)
        .ok_or_else(|| format!("ratio '{text}' must look like 80/20"))?;
    let train: f64 = captures[1].parse().map_err(|_| format!("invalid ratio '{text}'"))?;
    let test: f64 = captures[2].parse().map_err(|_| format!("invalid ratio '{text}'"))?;
    let total = train + test;

    if (total - 100.0).abs() <= RATIO_TOLERANCE * 100.0 || (total - 1.0).abs() <= RATIO_TOLERANCE {
        Ok(train / total)
    } else {
        Err(format!(
            "ratio '{text}' sums to {total}; parts must sum to 100 (or 1.0)"
        ))
    }
}

#[derive(Debug)]
pub struct PsSplitData {
    train_fraction: f64,
    target: Option<String>,
    seed: Option<u64>,
}

impl PsSplitData {
    pub fn new(train_fraction: f64, target: Option<String>, seed: Option<u64>) -> Self {
        Self {
            train_fraction,
            target,
            seed,
        }
    }
}

impl PsCommand for PsSplitData {
    fn name(&self) -> &'static str {
        "split"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
        let dataset = ctx.require_dataset()?;
        if dataset.is_empty() {
            return Err(PsError::precondition("non-empty dataset", "cannot split a dataset with no rows"));
        }
        if let Some(target) = &self.target {
            dataset.require_column(target)?;
        }

        let seed = self.seed.unwrap_or(ctx.seed);
        let mut order: Vec<usize> = (0..dataset.n_rows()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let n_train = ((dataset.n_rows() as f64) * self.train_fraction).round() as usize;
        let n_train = n_train.min(dataset.n_rows());
        let split = PsSplit {
            train: dataset.take_rows(&order[..n_train]),
            test: dataset.take_rows(&order[n_train..]),
            train_fraction: self.train_fraction,
            seed,
        };

        let mut message = format!(
            "Split {} rows into {} train / {} test",
            dataset.n_rows(),
            split.train.n_rows(),
            split.test.n_rows()
        );
        if let Some(target) = &self.target {
            message.push_str(&format!(" (target: {target})"));
        }

        ctx.split = Some(split);
        ctx.model = None;
        ctx.metrics.clear();
        if let Some(target) = &self.target {
            ctx.target = Some(target.clone());
        }
        Ok(message)
    }
}

pub fn split_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    let train_fraction = parse_ratio(&input.args[0]).map_err(|msg| input.error(msg))?;
    let target = input.option("target").map(str::to_string);
    let seed = input.option_u64("seed")?;
    Ok(Box::new(PsSplitData::new(train_fraction, target, seed)))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("split", "split <train/test> [--target column] [--seed n]", split_factory)
        .args(1, Some(1))
        .option(PsOptionSpec::text("target"))
        .option(PsOptionSpec::integer("seed"))
}
