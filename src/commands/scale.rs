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

use std::collections::BTreeSet;

use serde_json::Value;

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec, PsOptionSpec};
use crate::context::PsContext;
use crate::dataset::{number_cell, PsColumnKind, PsDataset};
use crate::errors::{PsError, Result};

use super::column_list;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsScaling {
    /// Zero mean, unit variance.
    Standard,
    /// Rescale into `[0, 1]`.
    MinMax,
}

impl PsScaling {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "zscore" | "z-score" => Some(PsScaling::Standard),
            "minmax" | "min_max" | "min-max" | "normalize" => Some(PsScaling::MinMax),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PsScaling::Standard => "standard",
            PsScaling::MinMax => "minmax",
        }
    }
}

/// Rescales numeric columns. Without explicit columns every numeric column
/// is scaled except label-encoded ones, the known target, integer code
/// columns and those passed to `--exclude`.
#[derive(Debug)]
pub struct PsScale {
    method: PsScaling,
    columns: Vec<String>,
    exclude: Vec<String>,
}

impl PsScale {
    pub fn new(method: PsScaling, columns: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            method,
            columns,
            exclude,
        }
    }
}

impl PsCommand for PsScale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
        let dataset = ctx.require_unsplit_dataset("scale")?;
        for name in self.columns.iter().chain(&self.exclude) {
            dataset.require_column(name)?;
        }

        let targets: Vec<String> = if self.columns.is_empty() {
            dataset
                .numeric_columns()
                .into_iter()
                .filter(|c| {
                    !self.exclude.contains(c)
                        && !ctx.encodings.contains_key(c)
                        && ctx.target.as_ref() != Some(c)
                })
                .filter(|c| match dataset.column_index(c) {
                    Some(index) if is_code_column(dataset, index) => {
                        log::info!("scale: column '{}' holds integer codes, leaving it unscaled", c);
                        false
                    }
                    _ => true,
                })
                .collect()
        } else {
            self.columns.clone()
        };

        let mut scaled = dataset.clone();
        for name in &targets {
            let index = scaled.require_column(name)?;
            if scaled.column_kind(index) == PsColumnKind::Categorical {
                return Err(PsError::schema(format!(
                    "column '{name}' is not numeric; run `encode` before `scale`"
                )));
            }
            let stats = scaled.column_stats(index);
            let (offset, divisor) = match self.method {
                PsScaling::Standard => (stats.mean, stats.std_dev),
                PsScaling::MinMax => (stats.min, stats.max - stats.min),
            };
            let divisor = if divisor.abs() < 1e-12 { 1.0 } else { divisor };
            for row in scaled.rows_mut().iter_mut() {
                if let Some(v) = row[index].as_f64() {
                    row[index] = number_cell((v - offset) / divisor);
                }
            }
        }

        let message = format!(
            "Scaled {} column(s) with {}: {}",
            targets.len(),
            self.method.as_str(),
            targets.join(", ")
        );
        ctx.dataset = Some(scaled);
        ctx.transforms.push(format!("scale {}", self.method.as_str()));
        Ok(message)
    }
}

/// Integer-valued columns with at most this many distinct values are treated as codes.
const MAX_CODE_LEVELS: usize = 10;

/// Whether a numeric column looks like class labels or category codes.
fn is_code_column(dataset: &PsDataset, index: usize) -> bool {
    let mut levels = BTreeSet::new();
    for value in dataset.column(index).filter_map(Value::as_f64) {
        if value.fract() != 0.0 || !value.is_finite() {
            return false;
        }
        levels.insert(value as i64);
        if levels.len() > MAX_CODE_LEVELS {
            return false;
        }
    }
    !levels.is_empty()
}

pub fn scale_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    let name = input.args[0].as_str();
    let method = PsScaling::from_name(name)
        .ok_or_else(|| input.error(format!("unknown method '{name}' (expected standard or minmax)")))?;
    let columns = column_list(input.args[1..].iter().map(String::as_str));
    let exclude = column_list(input.option("exclude"));
    Ok(Box::new(PsScale::new(method, columns, exclude)))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("scale", "scale <standard|minmax> [columns...] [--exclude columns]", scale_factory)
        .args(1, None)
        .option(PsOptionSpec::text("exclude"))
}
