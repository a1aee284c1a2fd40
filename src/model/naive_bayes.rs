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

use std::f64::consts::PI;

use super::{argmax, PsClassifier};

#[derive(Clone, Debug)]
pub struct PsGaussianNaiveBayes {
    log_priors: Vec<f64>,
    means: Vec<Vec<f64>>,
    variances: Vec<Vec<f64>>,
}

impl PsGaussianNaiveBayes {
    pub fn fit(x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Self {
        let d = x.first().map(Vec::len).unwrap_or(0);
        let mut counts = vec![0usize; n_classes];
        let mut means = vec![vec![0.0; d]; n_classes];
        let mut variances = vec![vec![0.0; d]; n_classes];

        for (row, &label) in x.iter().zip(y) {
            counts[label] += 1;
            for j in 0..d {
                means[label][j] += row[j];
            }
        }
        for k in 0..n_classes {
            if counts[k] > 0 {
                for m in means[k].iter_mut() {
                    *m /= counts[k] as f64;
                }
            }
        }
        for (row, &label) in x.iter().zip(y) {
            for j in 0..d {
                variances[label][j] += (row[j] - means[label][j]).powi(2);
            }
        }

        // Variance floor keeps constant features from producing infinities.
        let largest = x
            .iter()
            .flat_map(|r| r.iter())
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        let epsilon = 1e-9 * largest.powi(2).max(1.0);
        for k in 0..n_classes {
            for v in variances[k].iter_mut() {
                *v = *v / counts[k].max(1) as f64 + epsilon;
            }
        }

        let n = y.len().max(1) as f64;
        let log_priors = counts
            .iter()
            .map(|&c| if c == 0 { f64::NEG_INFINITY } else { (c as f64 / n).ln() })
            .collect();

        Self {
            log_priors,
            means,
            variances,
        }
    }
}

impl PsClassifier for PsGaussianNaiveBayes {
    fn predict_one(&self, row: &[f64]) -> usize {
        let scores: Vec<f64> = (0..self.log_priors.len())
            .map(|k| {
                let likelihood: f64 = row
                    .iter()
                    .enumerate()
                    .map(|(j, v)| {
                        let var = self.variances[k][j];
                        -0.5 * (2.0 * PI * var).ln() - (v - self.means[k][j]).powi(2) / (2.0 * var)
                    })
                    .sum();
                self.log_priors[k] + likelihood
            })
            .collect();
        argmax(&scores)
    }
}
