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

use std::collections::BTreeMap;

use serde_json::Value;

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec, PsOptionSpec};
use crate::context::PsContext;
use crate::dataset::{cell_key, PsColumnKind, PsDataset, PsRow};
use crate::errors::Result;

use super::column_list;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsEncoding {
    /// Replace each category by its index in the sorted category list.
    Label,
    /// Replace the column by one 0/1 indicator column per category.
    OneHot,
}

impl PsEncoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "label" | "ordinal" => Some(PsEncoding::Label),
            "onehot" | "one_hot" | "one-hot" | "dummy" => Some(PsEncoding::OneHot),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PsEncoding::Label => "label",
            PsEncoding::OneHot => "onehot",
        }
    }
}

#[derive(Debug)]
pub struct PsEncode {
    /// Empty means every categorical column.
    columns: Vec<String>,
    method: PsEncoding,
}

impl PsEncode {
    pub fn new(columns: Vec<String>, method: PsEncoding) -> Self {
        Self { columns, method }
    }
}

fn categories(dataset: &PsDataset, index: usize) -> Vec<String> {
    let mut values: Vec<String> = dataset.column(index).filter_map(cell_key).collect();
    values.sort();
    values.dedup();
    values
}

fn label_encode(dataset: &mut PsDataset, index: usize, categories: &[String]) {
    let codes: BTreeMap<&str, usize> = categories.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();
    for row in dataset.rows_mut().iter_mut() {
        if let Some(key) = cell_key(&row[index]) {
            row[index] = Value::from(codes[key.as_str()]);
        }
    }
}

/// `labels` names the indicator columns and parallels `categories`.
fn one_hot_encode(dataset: &PsDataset, name: &str, categories: &[String], labels: &[String]) -> Result<PsDataset> {
    let index = dataset.require_column(name)?;
    let mut columns = Vec::with_capacity(dataset.n_columns() + categories.len());
    for (i, column) in dataset.columns().iter().enumerate() {
        if i == index {
            columns.extend(labels.iter().map(|c| format!("{name}_{c}")));
        } else {
            columns.push(column.clone());
        }
    }

    let rows = dataset
        .rows()
        .iter()
        .map(|row| {
            let key = cell_key(&row[index]);
            let mut out: PsRow = Vec::with_capacity(columns.len());
            for (i, cell) in row.iter().enumerate() {
                if i != index {
                    out.push(cell.clone());
                    continue;
                }
                for category in categories {
                    out.push(match &key {
                        None => Value::Null,
                        Some(k) => Value::from(u8::from(k == category)),
                    });
                }
            }
            out
        })
        .collect();
    PsDataset::from_rows(columns, rows)
}

impl PsCommand for PsEncode {
    fn name(&self) -> &'static str {
        "encode"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
        let dataset = ctx.require_unsplit_dataset("encode")?;
        let targets = if self.columns.is_empty() {
            dataset.categorical_columns()
        } else {
            for column in &self.columns {
                dataset.require_column(column)?;
            }
            self.columns.clone()
        };

        let mut encoded = dataset.clone();
        let mut encodings = BTreeMap::new();
        let mut retired = Vec::new();
        let mut summary = Vec::with_capacity(targets.len());
        for name in &targets {
            let index = encoded.require_column(name)?;
            let recorded = ctx.encodings.get(name);
            match (self.method, recorded) {
                (PsEncoding::Label, Some(names)) => {
                    log::info!("encode: column '{}' is already label-encoded, keeping its codes", name);
                    summary.push(format!("{} (already encoded, {} levels)", name, names.len()));
                    continue;
                }
                (_, None) if encoded.column_kind(index) == PsColumnKind::Numeric && !self.columns.is_empty() => {
                    log::info!("encode: column '{}' is already numeric, encoding its distinct values", name);
                }
                _ => {}
            }

            let cats = categories(&encoded, index);
            summary.push(format!("{} ({} levels)", name, cats.len()));
            match self.method {
                PsEncoding::Label => {
                    label_encode(&mut encoded, index, &cats);
                    encodings.insert(name.clone(), cats);
                }
                PsEncoding::OneHot => {
                    // Codes of a label-encoded column name their indicators after the recorded categories.
                    let labels: Vec<String> = match recorded {
                        Some(names) => cats
                            .iter()
                            .map(|code| {
                                code.parse::<usize>()
                                    .ok()
                                    .and_then(|i| names.get(i))
                                    .cloned()
                                    .unwrap_or_else(|| code.clone())
                            })
                            .collect(),
                        None => cats.clone(),
                    };
                    encoded = one_hot_encode(&encoded, name, &cats, &labels)?;
                    if recorded.is_some() {
                        retired.push(name.clone());
                    }
                }
            }
        }

        let message = if targets.is_empty() {
            "Encoded 0 categorical columns".to_string()
        } else {
            format!(
                "Encoded {} categorical column(s) with {}: {}",
                targets.len(),
                self.method.as_str(),
                summary.join(", ")
            )
        };
        ctx.dataset = Some(encoded);
        for name in &retired {
            ctx.encodings.remove(name);
        }
        ctx.encodings.extend(encodings);
        ctx.transforms.push(format!("encode {}", self.method.as_str()));
        Ok(message)
    }
}

pub fn encode_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    let method = match input.option("method") {
        None => PsEncoding::Label,
        Some(name) => PsEncoding::from_name(name)
            .ok_or_else(|| input.error(format!("unknown method '{name}' (expected label or onehot)")))?,
    };
    let columns = column_list(input.args.iter().map(String::as_str));
    Ok(Box::new(PsEncode::new(columns, method)))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("encode", "encode [columns...] [--method label|onehot]", encode_factory)
        .args(0, None)
        .option(PsOptionSpec::text("method"))
}
