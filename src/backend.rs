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

//! Pluggable services used by the bundled commands.
//!
//! Commands never touch the filesystem or a learning library directly; they
//! go through the three traits below. [`PsBackends::native`] wires the
//! in-process implementations, and any of them can be swapped for tests or
//! for another library.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::PsConfig;
use crate::dataset::PsDataset;
use crate::errors::Result;
use crate::io::PsFileLoader;
use crate::metrics::{PsClassificationEvaluator, PsMetrics};
use crate::model::{PsNativeTrainer, PsTrainRequest, PsTrainedModel};

/// Reads and writes tabular files.
pub trait PsDataLoader: fmt::Debug + Send + Sync {
    fn load(&self, path: &Path) -> Result<PsDataset>;

    fn write(&self, path: &Path, dataset: &PsDataset) -> Result<()>;
}

/// Fits a classifier on the training split.
pub trait PsTrainingBackend: fmt::Debug + Send + Sync {
    fn train(&self, request: &PsTrainRequest<'_>) -> Result<PsTrainedModel>;
}

/// Scores a trained model on held-out rows.
pub trait PsEvaluationBackend: fmt::Debug + Send + Sync {
    fn evaluate(&self, model: &PsTrainedModel, test: &PsDataset) -> Result<PsMetrics>;
}

#[derive(Clone, Debug)]
pub struct PsBackends {
    pub loader: Arc<dyn PsDataLoader>,
    pub trainer: Arc<dyn PsTrainingBackend>,
    pub evaluator: Arc<dyn PsEvaluationBackend>,
}

impl Default for PsBackends {
    fn default() -> Self {
        Self::native(&PsConfig::default())
    }
}

impl PsBackends {
    /// In-process file loader, trainer and evaluator.
    pub fn native(config: &PsConfig) -> Self {
        Self {
            loader: Arc::new(PsFileLoader::new(config.clone())),
            trainer: Arc::new(PsNativeTrainer::new(config.default_trees)),
            evaluator: Arc::new(PsClassificationEvaluator),
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn PsDataLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_trainer(mut self, trainer: Arc<dyn PsTrainingBackend>) -> Self {
        self.trainer = trainer;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn PsEvaluationBackend>) -> Self {
        self.evaluator = evaluator;
        self
    }
}
