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
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::tree::{PsDecisionTree, PsTreeParams};
use super::{argmax, PsClassifier};

/// Bagged decision trees with `sqrt(features)` candidates per split.
///
/// Each member draws from its own RNG seeded with `seed + member`, so the
/// fitted forest is identical whether members train serially or on the
/// Rayon pool.
#[derive(Clone, Debug)]
pub struct PsRandomForest {
    trees: Vec<PsDecisionTree>,
    n_classes: usize,
}

impl PsRandomForest {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        n_trees: usize,
        max_depth: Option<usize>,
        seed: u64,
    ) -> Self {
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        let max_features = ((n_features as f64).sqrt().ceil() as usize).max(1);
        let params = PsTreeParams::default()
            .max_depth(max_depth)
            .max_features(Some(max_features));

        let fit_member = |member: usize| -> PsDecisionTree {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(member as u64));
            let mut weights = vec![0.0; y.len()];
            for _ in 0..y.len() {
                weights[rng.gen_range(0..y.len())] += 1.0;
            }
            let drawn: Vec<usize> = (0..y.len()).filter(|&i| weights[i] > 0.0).collect();
            let bx: Vec<Vec<f64>> = drawn.iter().map(|&i| x[i].clone()).collect();
            let by: Vec<usize> = drawn.iter().map(|&i| y[i]).collect();
            let bw: Vec<f64> = drawn.iter().map(|&i| weights[i]).collect();
            PsDecisionTree::fit(&bx, &by, &bw, n_classes, &params, &mut rng)
        };

        let members = n_trees.max(1);
        #[cfg(feature = "parallel")]
        let trees: Vec<PsDecisionTree> = (0..members).into_par_iter().map(fit_member).collect();
        #[cfg(not(feature = "parallel"))]
        let trees: Vec<PsDecisionTree> = (0..members).map(fit_member).collect();

        Self { trees, n_classes }
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl PsClassifier for PsRandomForest {
    fn predict_one(&self, row: &[f64]) -> usize {
        let mut votes = vec![0.0; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict_one(row)] += 1.0;
        }
        argmax(&votes)
    }
}
