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

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec};
use crate::context::PsContext;
use crate::dataset::{cell_key, number_cell, PsColumnKind, PsDataset};
use crate::errors::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsCleanStrategy {
    /// Drop every row holding a missing cell.
    Missing,
    /// Fill numeric gaps with the column mean, categorical gaps with the mode.
    Mean,
    /// Fill numeric gaps with the column median, categorical gaps with the mode.
    Median,
    /// Fill every gap with the column's most frequent value.
    Mode,
    /// Drop exact duplicate rows, keeping the first occurrence.
    Duplicates,
}

impl PsCleanStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "missing" | "dropna" | "drop_missing" => Some(PsCleanStrategy::Missing),
            "mean" => Some(PsCleanStrategy::Mean),
            "median" => Some(PsCleanStrategy::Median),
            "mode" | "most_frequent" => Some(PsCleanStrategy::Mode),
            "duplicates" | "dedup" => Some(PsCleanStrategy::Duplicates),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PsCleanStrategy::Missing => "missing",
            PsCleanStrategy::Mean => "mean",
            PsCleanStrategy::Median => "median",
            PsCleanStrategy::Mode => "mode",
            PsCleanStrategy::Duplicates => "duplicates",
        }
    }
}

#[derive(Debug)]
pub struct PsClean {
    strategy: PsCleanStrategy,
}

impl PsClean {
    pub fn new(strategy: PsCleanStrategy) -> Self {
        Self { strategy }
    }

    fn drop_missing(dataset: &PsDataset) -> (PsDataset, String) {
        let keep: Vec<usize> = (0..dataset.n_rows())
            .filter(|&i| dataset.rows()[i].iter().all(|c| !c.is_null()))
            .collect();
        let dropped = dataset.n_rows() - keep.len();
        let cleaned = dataset.take_rows(&keep);
        let message = format!(
            "Cleaned missing values: dropped {} row(s), {} remaining",
            dropped,
            cleaned.n_rows()
        );
        (cleaned, message)
    }

    fn drop_duplicates(dataset: &PsDataset) -> (PsDataset, String) {
        let mut seen = HashSet::new();
        let keep: Vec<usize> = (0..dataset.n_rows())
            .filter(|&i| seen.insert(Value::Array(dataset.rows()[i].clone()).to_string()))
            .collect();
        let dropped = dataset.n_rows() - keep.len();
        let cleaned = dataset.take_rows(&keep);
        let message = format!(
            "Removed {} duplicate row(s), {} remaining",
            dropped,
            cleaned.n_rows()
        );
        (cleaned, message)
    }

    fn impute(&self, dataset: &PsDataset) -> (PsDataset, String) {
        let mut cleaned = dataset.clone();
        let mut filled = 0usize;
        let mut skipped = Vec::new();

        for index in 0..dataset.n_columns() {
            let missing = dataset.column(index).filter(|c| c.is_null()).count();
            if missing == 0 {
                continue;
            }
            let kind = dataset.column_kind(index);
            let fill = match (kind, self.strategy) {
                (PsColumnKind::Empty, _) => None,
                (PsColumnKind::Numeric, PsCleanStrategy::Mean) => Some(number_cell(dataset.column_stats(index).mean)),
                (PsColumnKind::Numeric, PsCleanStrategy::Median) => {
                    Some(number_cell(dataset.column_stats(index).median))
                }
                _ => mode(dataset, index),
            };
            let Some(fill) = fill else {
                skipped.push(dataset.columns()[index].clone());
                continue;
            };
            for row in cleaned.rows_mut().iter_mut() {
                if row[index].is_null() {
                    row[index] = fill.clone();
                    filled += 1;
                }
            }
        }

        if !skipped.is_empty() {
            log::warn!("clean {}: columns without values left untouched: {}", self.strategy.as_str(), skipped.join(", "));
        }
        let message = format!(
            "Imputed {} missing cell(s) using {}",
            filled,
            self.strategy.as_str()
        );
        (cleaned, message)
    }
}

// Most frequent non-missing value; ties go to the smallest key.
fn mode(dataset: &PsDataset, index: usize) -> Option<Value> {
    let mut counts: BTreeMap<String, (usize, &Value)> = BTreeMap::new();
    for cell in dataset.column(index) {
        if let Some(key) = cell_key(cell) {
            counts.entry(key).or_insert((0, cell)).0 += 1;
        }
    }
    let mut best: Option<(usize, &Value)> = None;
    for (count, value) in counts.into_values() {
        if best.map_or(true, |(c, _)| count > c) {
            best = Some((count, value));
        }
    }
    best.map(|(_, value)| value.clone())
}

impl PsCommand for PsClean {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
        let dataset = ctx.require_unsplit_dataset("clean")?;
        let (cleaned, message) = match self.strategy {
            PsCleanStrategy::Missing => Self::drop_missing(dataset),
            PsCleanStrategy::Duplicates => Self::drop_duplicates(dataset),
            _ => self.impute(dataset),
        };
        ctx.dataset = Some(cleaned);
        ctx.transforms.push(format!("clean {}", self.strategy.as_str()));
        Ok(message)
    }
}

pub fn clean_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    let name = input.args[0].as_str();
    let strategy = PsCleanStrategy::from_name(name).ok_or_else(|| {
        input.error(format!(
            "unknown strategy '{name}' (expected one of: missing, mean, median, mode, duplicates)"
        ))
    })?;
    Ok(Box::new(PsClean::new(strategy)))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("clean", "clean <missing|mean|median|mode|duplicates>", clean_factory).args(1, Some(1))
}
