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

use super::PsClassifier;

/// Majority vote among the `k` nearest training rows (Euclidean).
#[derive(Clone, Debug)]
pub struct PsKnn {
    x: Vec<Vec<f64>>,
    y: Vec<usize>,
    n_classes: usize,
    k: usize,
}

impl PsKnn {
    pub fn fit(x: &[Vec<f64>], y: &[usize], n_classes: usize, k: usize) -> Self {
        Self {
            x: x.to_vec(),
            y: y.to_vec(),
            n_classes,
            k: k.clamp(1, y.len().max(1)),
        }
    }
}

impl PsClassifier for PsKnn {
    fn predict_one(&self, row: &[f64]) -> usize {
        let mut distances: Vec<(f64, usize)> = self
            .x
            .iter()
            .zip(&self.y)
            .map(|(train, &label)| {
                let d: f64 = train.iter().zip(row).map(|(a, b)| (a - b).powi(2)).sum();
                (d, label)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        let neighbours = &distances[..self.k.min(distances.len())];
        let mut votes = vec![0usize; self.n_classes];
        for &(_, label) in neighbours {
            votes[label] += 1;
        }
        let top = votes.iter().copied().max().unwrap_or(0);
        // Ties go to the class of the closest tied neighbour.
        neighbours
            .iter()
            .map(|&(_, label)| label)
            .find(|&label| votes[label] == top)
            .unwrap_or(0)
    }
}
