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

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::tree::{PsDecisionTree, PsTreeParams};
use super::{argmax, PsClassifier};

/// Multi-class AdaBoost (SAMME) over shallow decision trees.
#[derive(Clone, Debug)]
pub struct PsBoostedTrees {
    stages: Vec<(PsDecisionTree, f64)>,
    n_classes: usize,
}

impl PsBoostedTrees {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        rounds: usize,
        max_depth: usize,
        learning_rate: f64,
        seed: u64,
    ) -> Self {
        let n = y.len();
        let params = PsTreeParams::default().max_depth(Some(max_depth));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut weights = vec![1.0 / n as f64; n];
        let mut stages = Vec::new();
        let chance = 1.0 - 1.0 / n_classes as f64;

        for round in 0..rounds.max(1) {
            let tree = PsDecisionTree::fit(x, y, &weights, n_classes, &params, &mut rng);
            let missed: Vec<bool> = x
                .iter()
                .zip(y)
                .map(|(row, &label)| tree.predict_one(row) != label)
                .collect();

            let total: f64 = weights.iter().sum();
            let error: f64 = weights
                .iter()
                .zip(&missed)
                .filter(|(_, &m)| m)
                .map(|(w, _)| w)
                .sum::<f64>()
                / total;

            if error <= 1e-10 {
                stages.push((tree, 1.0));
                break;
            }
            if error >= chance {
                if round == 0 {
                    stages.push((tree, 1.0));
                }
                break;
            }

            let alpha = learning_rate * (((1.0 - error) / error).ln() + ((n_classes - 1) as f64).ln());
            for (w, &m) in weights.iter_mut().zip(&missed) {
                if m {
                    *w *= alpha.exp();
                }
            }
            let norm: f64 = weights.iter().sum();
            for w in weights.iter_mut() {
                *w /= norm;
            }
            stages.push((tree, alpha));
        }

        Self { stages, n_classes }
    }

    pub fn rounds(&self) -> usize {
        self.stages.len()
    }
}

impl PsClassifier for PsBoostedTrees {
    fn predict_one(&self, row: &[f64]) -> usize {
        let mut scores = vec![0.0; self.n_classes];
        for (tree, alpha) in &self.stages {
            scores[tree.predict_one(row)] += alpha;
        }
        argmax(&scores)
    }
}
