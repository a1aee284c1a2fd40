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

use super::{argmax, PsClassifier};

const L2_PENALTY: f64 = 1e-4;

/// Multinomial logistic regression fitted by full-batch gradient descent
/// on standardized features.
#[derive(Clone, Debug)]
pub struct PsLogisticRegression {
    means: Vec<f64>,
    scales: Vec<f64>,
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl PsLogisticRegression {
    pub fn fit(x: &[Vec<f64>], y: &[usize], n_classes: usize, iterations: usize, learning_rate: f64) -> Self {
        let n = x.len();
        let d = x.first().map(Vec::len).unwrap_or(0);

        let mut means = vec![0.0; d];
        let mut scales = vec![1.0; d];
        for j in 0..d {
            means[j] = x.iter().map(|r| r[j]).sum::<f64>() / n as f64;
            let var = x.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n as f64;
            if var > 1e-12 {
                scales[j] = var.sqrt();
            }
        }

        let z: Vec<Vec<f64>> = x
            .iter()
            .map(|r| r.iter().enumerate().map(|(j, v)| (v - means[j]) / scales[j]).collect())
            .collect();

        let mut model = Self {
            means,
            scales,
            weights: vec![vec![0.0; d]; n_classes],
            bias: vec![0.0; n_classes],
        };

        for _ in 0..iterations {
            let mut grad_w = vec![vec![0.0; d]; n_classes];
            let mut grad_b = vec![0.0; n_classes];
            for (row, &label) in z.iter().zip(y) {
                let probs = model.probabilities(row);
                for k in 0..n_classes {
                    let delta = probs[k] - if k == label { 1.0 } else { 0.0 };
                    grad_b[k] += delta;
                    for j in 0..d {
                        grad_w[k][j] += delta * row[j];
                    }
                }
            }
            for k in 0..n_classes {
                model.bias[k] -= learning_rate * grad_b[k] / n as f64;
                for j in 0..d {
                    let penalty = L2_PENALTY * model.weights[k][j];
                    model.weights[k][j] -= learning_rate * (grad_w[k][j] / n as f64 + penalty);
                }
            }
        }

        model
    }

    fn probabilities(&self, z: &[f64]) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| b + w.iter().zip(z).map(|(a, v)| a * v).sum::<f64>())
            .collect();
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / total).collect()
    }

    fn standardize(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(j, v)| (v - self.means[j]) / self.scales[j])
            .collect()
    }
}

impl PsClassifier for PsLogisticRegression {
    fn predict_one(&self, row: &[f64]) -> usize {
        argmax(&self.probabilities(&self.standardize(row)))
    }
}
