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

//! # PipelineScript Dataset Module
//!
//! In-memory tabular data flowing through a run. A dataset is a list of
//! named columns and rows of JSON cells:
//!
//! - `Value::Null` marks a missing cell
//! - `Value::Number` is a numeric cell
//! - `Value::String` and `Value::Bool` are categorical cells
//!
//! Every row has exactly one cell per column.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::errors::{PsError, Result};

pub type PsRow = Vec<Value>;

/// Coarse column type inferred from its non-missing cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsColumnKind {
    Numeric,
    Categorical,
    /// Every cell is missing.
    Empty,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PsColumnStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PsDataset {
    columns: Vec<String>,
    rows: Vec<PsRow>,
}

impl PsDataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<PsRow>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(PsError::schema(format!("duplicate column name '{column}'")));
            }
        }
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    pub fn push_row(&mut self, row: PsRow) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(PsError::schema(format!(
                "row {} has {} cells, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[PsRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<PsRow> {
        &mut self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of `name`, or a schema error listing the available columns.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            PsError::schema(format!(
                "column '{}' not found (columns: {})",
                name,
                self.columns.join(", ")
            ))
        })
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    pub fn column_kind(&self, index: usize) -> PsColumnKind {
        let mut kind = PsColumnKind::Empty;
        for cell in self.column(index) {
            match cell {
                Value::Null => {}
                Value::Number(_) => {
                    if kind == PsColumnKind::Empty {
                        kind = PsColumnKind::Numeric;
                    }
                }
                _ => return PsColumnKind::Categorical,
            }
        }
        kind
    }

    /// Names of columns holding at least one non-numeric cell.
    pub fn categorical_columns(&self) -> Vec<String> {
        (0..self.columns.len())
            .filter(|&i| self.column_kind(i) == PsColumnKind::Categorical)
            .map(|i| self.columns[i].clone())
            .collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        (0..self.columns.len())
            .filter(|&i| self.column_kind(i) == PsColumnKind::Numeric)
            .map(|i| self.columns[i].clone())
            .collect()
    }

    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|c| c.is_null()).count())
            .sum()
    }

    /// Non-missing numeric values of a column.
    pub fn numeric_values(&self, index: usize) -> Vec<f64> {
        self.column(index).filter_map(Value::as_f64).collect()
    }

    pub fn column_stats(&self, index: usize) -> PsColumnStats {
        let mut values = self.numeric_values(index);
        let missing = self.column(index).filter(|c| c.is_null()).count();
        if values.is_empty() {
            return PsColumnStats {
                missing,
                ..PsColumnStats::default()
            };
        }

        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        } else {
            values[count / 2]
        };

        PsColumnStats {
            count,
            missing,
            mean,
            std_dev: variance.sqrt(),
            min: values[0],
            max: values[count - 1],
            median,
        }
    }

    /// New dataset holding the given rows in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> PsDataset {
        PsDataset {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    pub fn select_columns(&self, names: &[String]) -> Result<PsDataset> {
        let indices = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<Vec<_>>>()?;
        PsDataset::from_rows(
            names.to_vec(),
            self.rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        )
    }

    pub fn drop_columns(&self, names: &[String]) -> Result<PsDataset> {
        for name in names {
            self.require_column(name)?;
        }
        let keep: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !names.contains(c))
            .cloned()
            .collect();
        self.select_columns(&keep)
    }
}

/// Stable string key for a cell, used for class labels and categories.
/// Integral numbers render without a fractional part.
pub fn cell_key(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            Some(f) => f.to_string(),
            None => n.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

/// Numeric cell from an `f64`; non-finite values become missing.
pub fn number_cell(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}
