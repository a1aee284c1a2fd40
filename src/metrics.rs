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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::PsEvaluationBackend;
use crate::dataset::{cell_key, PsDataset};
use crate::errors::{PsError, Result};
use crate::model::{feature_matrix, PsTrainedModel};

/// One named evaluation result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PsMetric {
    Score(f64),
    Report(Value),
}

impl PsMetric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PsMetric::Score(v) => Some(*v),
            PsMetric::Report(_) => None,
        }
    }
}

pub type PsMetrics = BTreeMap<String, PsMetric>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PsClassStats {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Classification quality of predictions against held-out labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PsClassificationReport {
    pub samples: usize,
    pub accuracy: f64,
    pub precision_macro: f64,
    pub recall_macro: f64,
    pub f1_macro: f64,
    pub classes: BTreeMap<String, PsClassStats>,
    /// Rows are true classes, columns predicted classes, in `labels` order.
    pub confusion_matrix: Vec<Vec<usize>>,
    pub labels: Vec<String>,
    /// Test rows whose label never appeared during training.
    pub unseen_labels: usize,
}

impl PsClassificationReport {
    /// `truth[i]` is `None` when the row's label is unknown to the model;
    /// such rows always count as misclassified.
    pub fn compute(truth: &[Option<usize>], predicted: &[usize], labels: &[String]) -> Self {
        let k = labels.len();
        let mut report = PsClassificationReport {
            samples: truth.len(),
            labels: labels.to_vec(),
            confusion_matrix: vec![vec![0; k]; k],
            ..Self::default()
        };
        if truth.is_empty() {
            return report;
        }

        let mut correct = 0usize;
        let mut predicted_counts = vec![0usize; k];
        for (t, &p) in truth.iter().zip(predicted) {
            predicted_counts[p] += 1;
            match t {
                Some(t) => {
                    report.confusion_matrix[*t][p] += 1;
                    if *t == p {
                        correct += 1;
                    }
                }
                None => report.unseen_labels += 1,
            }
        }
        report.accuracy = correct as f64 / truth.len() as f64;

        let mut averaged = 0usize;
        for (i, label) in labels.iter().enumerate() {
            let tp = report.confusion_matrix[i][i];
            let support: usize = report.confusion_matrix[i].iter().sum();
            let precision = ratio(tp, predicted_counts[i]);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            if support > 0 || predicted_counts[i] > 0 {
                report.precision_macro += precision;
                report.recall_macro += recall;
                report.f1_macro += f1;
                averaged += 1;
            }
            report.classes.insert(
                label.clone(),
                PsClassStats {
                    precision,
                    recall,
                    f1,
                    support,
                },
            );
        }
        if averaged > 0 {
            report.precision_macro /= averaged as f64;
            report.recall_macro /= averaged as f64;
            report.f1_macro /= averaged as f64;
        }
        report
    }

    /// Flattens the report into context metrics: headline scores plus the
    /// full breakdown under `report`.
    pub fn to_metrics(&self) -> PsMetrics {
        let mut metrics = PsMetrics::new();
        metrics.insert("accuracy".into(), PsMetric::Score(self.accuracy));
        metrics.insert("precision".into(), PsMetric::Score(self.precision_macro));
        metrics.insert("recall".into(), PsMetric::Score(self.recall_macro));
        metrics.insert("f1".into(), PsMetric::Score(self.f1_macro));
        metrics.insert("test_samples".into(), PsMetric::Score(self.samples as f64));
        metrics.insert(
            "report".into(),
            PsMetric::Report(serde_json::to_value(self).unwrap_or(Value::Null)),
        );
        metrics
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Default evaluation backend: predicts the held-out rows and scores them.
#[derive(Clone, Debug, Default)]
pub struct PsClassificationEvaluator;

impl PsEvaluationBackend for PsClassificationEvaluator {
    fn evaluate(&self, model: &PsTrainedModel, test: &PsDataset) -> Result<PsMetrics> {
        if test.is_empty() {
            return Err(PsError::precondition(
                "held-out split",
                "the test split has no rows; use a split ratio that leaves rows for evaluation",
            ));
        }
        let features = feature_matrix(test, &model.features)?;
        let target = test.require_column(&model.target)?;

        let truth: Vec<Option<usize>> = test
            .column(target)
            .map(|cell| cell_key(cell).and_then(|key| model.class_index(&key)))
            .collect();
        let predicted = model.predict(&features);

        let report = PsClassificationReport::compute(&truth, &predicted, &model.classes);
        if report.unseen_labels > 0 {
            log::warn!(
                "{} test row(s) carry labels never seen during training",
                report.unseen_labels
            );
        }
        Ok(report.to_metrics())
    }
}
