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

//! # PipelineScript Model Module
//!
//! Bundled classification algorithms and the native training backend.
//!
//! ## Algorithms
//!
//! | Name                  | Aliases                            | Hyper-parameters                           |
//! |-----------------------|------------------------------------|--------------------------------------------|
//! | `decision_tree`       | `tree`, `cart`                     | `max_depth`, `seed`                        |
//! | `random_forest`       | `forest`, `rf`                     | `trees`, `max_depth`, `seed`               |
//! | `boosting`            | `xgboost`, `adaboost`, `gradient_boosting` | `trees`, `max_depth`, `learning_rate`, `seed` |
//! | `knn`                 | `k_nearest_neighbors`              | `k`                                        |
//! | `logistic_regression` | `logistic`, `logreg`               | `iterations`, `learning_rate`              |
//! | `naive_bayes`         | `gaussian_nb`, `nb`                | none                                       |
//!
//! Features must be numeric and complete; run `encode` and `clean` first.

pub mod tree;
pub mod forest;
pub mod boosting;
pub mod knn;
pub mod logistic;
pub mod naive_bayes;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::PsTrainingBackend;
use crate::dataset::{cell_key, PsColumnKind, PsDataset};
use crate::errors::{PsError, Result};

pub use boosting::PsBoostedTrees;
pub use forest::PsRandomForest;
pub use knn::PsKnn;
pub use logistic::PsLogisticRegression;
pub use naive_bayes::PsGaussianNaiveBayes;
pub use tree::{PsDecisionTree, PsTreeParams};

/// A fitted classifier over dense numeric features.
pub trait PsClassifier: fmt::Debug + Send + Sync {
    /// Index into the model's class list.
    fn predict_one(&self, row: &[f64]) -> usize;

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<usize> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PsAlgorithm {
    DecisionTree,
    RandomForest,
    Boosting,
    Knn,
    LogisticRegression,
    NaiveBayes,
}

impl PsAlgorithm {
    pub const ALL: [PsAlgorithm; 6] = [
        PsAlgorithm::DecisionTree,
        PsAlgorithm::RandomForest,
        PsAlgorithm::Boosting,
        PsAlgorithm::Knn,
        PsAlgorithm::LogisticRegression,
        PsAlgorithm::NaiveBayes,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        let algorithm = match normalized.as_str() {
            "decision_tree" | "tree" | "cart" => PsAlgorithm::DecisionTree,
            "random_forest" | "forest" | "rf" => PsAlgorithm::RandomForest,
            "boosting" | "xgboost" | "adaboost" | "gradient_boosting" => PsAlgorithm::Boosting,
            "knn" | "k_nearest_neighbors" => PsAlgorithm::Knn,
            "logistic_regression" | "logistic" | "logreg" => PsAlgorithm::LogisticRegression,
            "naive_bayes" | "gaussian_nb" | "nb" => PsAlgorithm::NaiveBayes,
            _ => return None,
        };
        Some(algorithm)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PsAlgorithm::DecisionTree => "decision_tree",
            PsAlgorithm::RandomForest => "random_forest",
            PsAlgorithm::Boosting => "boosting",
            PsAlgorithm::Knn => "knn",
            PsAlgorithm::LogisticRegression => "logistic_regression",
            PsAlgorithm::NaiveBayes => "naive_bayes",
        }
    }

    /// Hyper-parameter options that mean something for this algorithm.
    pub fn hyper_parameters(&self) -> &'static [&'static str] {
        match self {
            PsAlgorithm::DecisionTree => &["max_depth", "seed"],
            PsAlgorithm::RandomForest => &["trees", "max_depth", "seed"],
            PsAlgorithm::Boosting => &["trees", "max_depth", "learning_rate", "seed"],
            PsAlgorithm::Knn => &["k"],
            PsAlgorithm::LogisticRegression => &["iterations", "learning_rate"],
            PsAlgorithm::NaiveBayes => &[],
        }
    }

    pub fn accepts(&self, parameter: &str) -> bool {
        self.hyper_parameters().contains(&parameter)
    }
}

impl fmt::Display for PsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PsHyperParams {
    pub trees: Option<usize>,
    pub max_depth: Option<usize>,
    pub k: Option<usize>,
    pub iterations: Option<usize>,
    pub learning_rate: Option<f64>,
    pub seed: Option<u64>,
}

/// Inputs handed to a training backend.
#[derive(Clone, Copy, Debug)]
pub struct PsTrainRequest<'a> {
    pub train: &'a PsDataset,
    pub target: &'a str,
    pub algorithm: PsAlgorithm,
    pub params: &'a PsHyperParams,
    /// Seed used when `params.seed` is absent.
    pub seed: u64,
    /// Category names for a label-encoded target, indexed by code.
    pub label_names: Option<&'a [String]>,
}

/// A trained classifier plus the schema it was trained on.
#[derive(Clone)]
pub struct PsTrainedModel {
    pub algorithm: String,
    pub target: String,
    pub features: Vec<String>,
    /// Display names of the classes, decoded when the target was label-encoded.
    pub classes: Vec<String>,
    pub trained_rows: usize,
    pub params: PsHyperParams,
    class_keys: Vec<String>,
    classifier: Arc<dyn PsClassifier>,
}

impl fmt::Debug for PsTrainedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PsTrainedModel")
            .field("algorithm", &self.algorithm)
            .field("target", &self.target)
            .field("features", &self.features)
            .field("classes", &self.classes)
            .field("trained_rows", &self.trained_rows)
            .finish()
    }
}

impl PsTrainedModel {
    pub fn new(
        algorithm: impl Into<String>,
        target: impl Into<String>,
        features: Vec<String>,
        class_keys: Vec<String>,
        classes: Vec<String>,
        trained_rows: usize,
        classifier: Arc<dyn PsClassifier>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            target: target.into(),
            features,
            classes,
            trained_rows,
            params: PsHyperParams::default(),
            class_keys,
            classifier,
        }
    }

    pub fn with_params(mut self, params: PsHyperParams) -> Self {
        self.params = params;
        self
    }

    /// Class index for a raw label key as found in the target column.
    pub fn class_index(&self, key: &str) -> Option<usize> {
        self.class_keys.iter().position(|k| k == key)
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<usize> {
        self.classifier.predict(rows)
    }

    pub fn predict_labels(&self, rows: &[Vec<f64>]) -> Vec<String> {
        self.predict(rows)
            .into_iter()
            .map(|i| self.classes[i].clone())
            .collect()
    }

    pub fn summary(&self) -> Value {
        serde_json::json!({
            "algorithm": self.algorithm,
            "target": self.target,
            "features": self.features,
            "classes": self.classes,
            "trained_rows": self.trained_rows,
            "params": self.params,
        })
    }
}

/// Feature columns for training: every column except the target, all numeric.
pub fn feature_columns(dataset: &PsDataset, target: &str) -> Result<Vec<String>> {
    dataset.require_column(target)?;
    let mut features = Vec::new();
    for (index, name) in dataset.columns().iter().enumerate() {
        if name == target {
            continue;
        }
        match dataset.column_kind(index) {
            PsColumnKind::Numeric => features.push(name.clone()),
            PsColumnKind::Categorical => {
                return Err(PsError::schema(format!(
                    "feature column '{name}' is not numeric; run `encode` before `train`"
                )))
            }
            PsColumnKind::Empty => {
                return Err(PsError::schema(format!(
                    "feature column '{name}' has no values; `drop` it before `train`"
                )))
            }
        }
    }
    if features.is_empty() {
        return Err(PsError::schema(format!("no feature columns besides target '{target}'")));
    }
    Ok(features)
}

/// Dense feature rows for the named columns.
pub fn feature_matrix(dataset: &PsDataset, columns: &[String]) -> Result<Vec<Vec<f64>>> {
    let indices = columns
        .iter()
        .map(|c| dataset.require_column(c))
        .collect::<Result<Vec<_>>>()?;

    dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(row_no, row)| {
            indices
                .iter()
                .map(|&i| match &row[i] {
                    Value::Number(n) => n.as_f64().ok_or_else(|| PsError::schema("number out of range")),
                    Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
                    Value::Null => Err(PsError::schema(format!(
                        "missing value in column '{}' (row {}); run `clean` before `train`",
                        dataset.columns()[i],
                        row_no + 1
                    ))),
                    other => Err(PsError::schema(format!(
                        "non-numeric value {} in column '{}'; run `encode` before `train`",
                        other,
                        dataset.columns()[i]
                    ))),
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect()
}

#[derive(Debug)]
struct PsConstantClassifier;

impl PsClassifier for PsConstantClassifier {
    fn predict_one(&self, _row: &[f64]) -> usize {
        0
    }
}

/// Training backend running the bundled algorithms in-process.
#[derive(Clone, Debug)]
pub struct PsNativeTrainer {
    default_trees: usize,
}

impl Default for PsNativeTrainer {
    fn default() -> Self {
        Self { default_trees: 100 }
    }
}

impl PsNativeTrainer {
    pub fn new(default_trees: usize) -> Self {
        Self {
            default_trees: default_trees.max(1),
        }
    }
}

impl PsTrainingBackend for PsNativeTrainer {
    fn train(&self, request: &PsTrainRequest<'_>) -> Result<PsTrainedModel> {
        let dataset = request.train;
        if dataset.is_empty() {
            return Err(PsError::precondition(
                "training rows",
                "the training split has no rows",
            ));
        }

        let features = feature_columns(dataset, request.target)?;
        let x = feature_matrix(dataset, &features)?;
        let target = dataset.require_column(request.target)?;

        let mut keys = Vec::with_capacity(dataset.n_rows());
        for (row_no, cell) in dataset.column(target).enumerate() {
            let key = cell_key(cell).ok_or_else(|| {
                PsError::schema(format!(
                    "missing label in target '{}' (row {}); run `clean` before `train`",
                    request.target,
                    row_no + 1
                ))
            })?;
            keys.push(key);
        }

        let class_keys = sorted_class_keys(&keys);
        let index: BTreeMap<&str, usize> = class_keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), i))
            .collect();
        let y: Vec<usize> = keys.iter().map(|k| index[k.as_str()]).collect();
        let classes: Vec<String> = class_keys
            .iter()
            .map(|key| decode_label(key, request.label_names))
            .collect();

        let params = request.params;
        let seed = params.seed.unwrap_or(request.seed);
        let n_classes = class_keys.len();

        let classifier: Arc<dyn PsClassifier> = if n_classes == 1 {
            log::warn!("training split holds a single class; the model predicts it unconditionally");
            Arc::new(PsConstantClassifier)
        } else {
            match request.algorithm {
                PsAlgorithm::DecisionTree => {
                    let tree_params = PsTreeParams::default().max_depth(params.max_depth);
                    let weights = vec![1.0; y.len()];
                    let mut rng = StdRng::seed_from_u64(seed);
                    Arc::new(PsDecisionTree::fit(&x, &y, &weights, n_classes, &tree_params, &mut rng))
                }
                PsAlgorithm::RandomForest => Arc::new(PsRandomForest::fit(
                    &x,
                    &y,
                    n_classes,
                    params.trees.unwrap_or(self.default_trees),
                    params.max_depth,
                    seed,
                )),
                PsAlgorithm::Boosting => Arc::new(PsBoostedTrees::fit(
                    &x,
                    &y,
                    n_classes,
                    params.trees.unwrap_or(50),
                    params.max_depth.unwrap_or(2),
                    params.learning_rate.unwrap_or(1.0),
                    seed,
                )),
                PsAlgorithm::Knn => Arc::new(PsKnn::fit(&x, &y, n_classes, params.k.unwrap_or(5))),
                PsAlgorithm::LogisticRegression => Arc::new(PsLogisticRegression::fit(
                    &x,
                    &y,
                    n_classes,
                    params.iterations.unwrap_or(300),
                    params.learning_rate.unwrap_or(0.1),
                )),
                PsAlgorithm::NaiveBayes => Arc::new(PsGaussianNaiveBayes::fit(&x, &y, n_classes)),
            }
        };

        log::debug!(
            "trained {} on {} rows, {} features, {} classes",
            request.algorithm,
            x.len(),
            features.len(),
            n_classes
        );

        Ok(PsTrainedModel::new(
            request.algorithm.as_str(),
            request.target,
            features,
            class_keys,
            classes,
            x.len(),
            classifier,
        )
        .with_params(params.clone()))
    }
}

// Numeric labels sort numerically, everything else lexically.
fn sorted_class_keys(keys: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = keys.to_vec();
    unique.sort();
    unique.dedup();
    if unique.iter().all(|k| k.parse::<f64>().is_ok()) {
        unique.sort_by(|a, b| {
            let a = a.parse::<f64>().unwrap_or(0.0);
            let b = b.parse::<f64>().unwrap_or(0.0);
            a.total_cmp(&b)
        });
    }
    unique
}

fn decode_label(key: &str, names: Option<&[String]>) -> String {
    names
        .and_then(|names| key.parse::<usize>().ok().and_then(|code| names.get(code)))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Index of the largest score; ties go to the lowest index.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }
    best
}
