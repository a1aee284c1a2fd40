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

//! # PipelineScript Execution Context
//!
//! The mutable state a run threads through its steps. Each field is filled
//! by the step that produces it, and the `require_*` helpers give handlers
//! a precondition error naming the missing rung:
//!
//! ```text
//! load -> (clean | encode | scale | drop | select)* -> split -> train -> evaluate
//! ```
//!
//! Data-shaping commands are only allowed before `split`. A new `load`
//! resets everything downstream of the dataset.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::dataset::PsDataset;
use crate::errors::{PsError, Result};
use crate::metrics::{PsMetric, PsMetrics};
use crate::model::PsTrainedModel;

/// Train/test partition of the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct PsSplit {
    pub train: PsDataset,
    pub test: PsDataset,
    pub train_fraction: f64,
    pub seed: u64,
}

/// Furthest rung of the workflow the context has reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PsReadiness {
    Empty,
    Loaded,
    Prepared,
    Split,
    Trained,
    Evaluated,
}

impl PsReadiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            PsReadiness::Empty => "empty",
            PsReadiness::Loaded => "loaded",
            PsReadiness::Prepared => "prepared",
            PsReadiness::Split => "split",
            PsReadiness::Trained => "trained",
            PsReadiness::Evaluated => "evaluated",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PsContext {
    pub dataset: Option<PsDataset>,
    pub split: Option<PsSplit>,
    pub target: Option<String>,
    pub model: Option<PsTrainedModel>,
    pub metrics: PsMetrics,
    /// One message per successfully executed step, in order.
    pub log: Vec<String>,
    /// Category lists of label-encoded columns; a cell's code indexes its list.
    pub encodings: BTreeMap<String, Vec<String>>,
    /// Data-shaping steps applied since the last `load`.
    pub transforms: Vec<String>,
    pub seed: u64,
}

impl PsContext {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn require_dataset(&self) -> Result<&PsDataset> {
        self.dataset
            .as_ref()
            .ok_or_else(|| PsError::precondition("dataset", "no dataset is loaded; run `load <path>` first"))
    }

    /// Dataset for a data-shaping command, which must run before `split`.
    pub fn require_unsplit_dataset(&self, command: &str) -> Result<&PsDataset> {
        let dataset = self.require_dataset()?;
        if self.split.is_some() {
            return Err(PsError::precondition(
                "unsplit dataset",
                format!("`{command}` must run before `split`; the dataset has already been partitioned"),
            ));
        }
        Ok(dataset)
    }

    pub fn require_split(&self) -> Result<&PsSplit> {
        self.split
            .as_ref()
            .ok_or_else(|| PsError::precondition("split", "the dataset is not split; run `split <ratio>` first"))
    }

    pub fn require_model(&self) -> Result<&PsTrainedModel> {
        self.model
            .as_ref()
            .ok_or_else(|| PsError::precondition("model", "no model is trained; run `train <algorithm>` first"))
    }

    /// Installs a freshly loaded dataset and clears everything derived from
    /// the previous one.
    pub fn replace_dataset(&mut self, dataset: PsDataset) {
        self.dataset = Some(dataset);
        self.split = None;
        self.target = None;
        self.model = None;
        self.metrics.clear();
        self.encodings.clear();
        self.transforms.clear();
    }

    pub fn readiness(&self) -> PsReadiness {
        if !self.metrics.is_empty() {
            PsReadiness::Evaluated
        } else if self.model.is_some() {
            PsReadiness::Trained
        } else if self.split.is_some() {
            PsReadiness::Split
        } else if self.dataset.is_some() && !self.transforms.is_empty() {
            PsReadiness::Prepared
        } else if self.dataset.is_some() {
            PsReadiness::Loaded
        } else {
            PsReadiness::Empty
        }
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(PsMetric::as_f64)
    }

    /// JSON snapshot for reports and the command-line runner.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "readiness": self.readiness().as_str(),
            "dataset": self.dataset.as_ref().map(|d| serde_json::json!({
                "rows": d.n_rows(),
                "columns": d.columns(),
            })),
            "split": self.split.as_ref().map(|s| serde_json::json!({
                "train_rows": s.train.n_rows(),
                "test_rows": s.test.n_rows(),
                "train_fraction": s.train_fraction,
                "seed": s.seed,
            })),
            "target": self.target,
            "model": self.model.as_ref().map(PsTrainedModel::summary),
            "metrics": self.metrics,
            "transforms": self.transforms,
            "log": self.log,
        })
    }
}
