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
use rand::seq::index::sample;

use super::{argmax, PsClassifier};

const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct PsTreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features considered per split; `None` considers all of them.
    pub max_features: Option<usize>,
}

impl Default for PsTreeParams {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

impl PsTreeParams {
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth.unwrap_or(DEFAULT_MAX_DEPTH).max(1);
        self
    }

    pub fn max_features(mut self, features: Option<usize>) -> Self {
        self.max_features = features;
        self
    }
}

#[derive(Clone, Debug)]
enum PsTreeNode {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<PsTreeNode>,
        right: Box<PsTreeNode>,
    },
}

/// CART classification tree grown on weighted Gini impurity.
#[derive(Clone, Debug)]
pub struct PsDecisionTree {
    root: PsTreeNode,
}

struct PsTreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    params: &'a PsTreeParams,
}

impl PsDecisionTree {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        params: &PsTreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let builder = PsTreeBuilder {
            x,
            y,
            weights,
            n_classes,
            params,
        };
        let indices: Vec<usize> = (0..y.len()).collect();
        Self {
            root: builder.grow(indices, 0, rng),
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(node: &PsTreeNode) -> usize {
            match node {
                PsTreeNode::Leaf { .. } => 0,
                PsTreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }
}

impl PsClassifier for PsDecisionTree {
    fn predict_one(&self, row: &[f64]) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                PsTreeNode::Leaf { class } => return *class,
                PsTreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

impl PsTreeBuilder<'_> {
    fn class_weights(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += self.weights[i];
        }
        counts
    }

    fn grow(&self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> PsTreeNode {
        let counts = self.class_weights(&indices);
        let class = argmax(&counts);
        let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;

        if pure || depth >= self.params.max_depth || indices.len() < self.params.min_samples_split {
            return PsTreeNode::Leaf { class };
        }

        let Some((feature, threshold)) = self.best_split(&indices, &counts, rng) else {
            return PsTreeNode::Leaf { class };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][feature] <= threshold);

        PsTreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.grow(left, depth + 1, rng)),
            right: Box::new(self.grow(right, depth + 1, rng)),
        }
    }

    fn best_split(&self, indices: &[usize], counts: &[f64], rng: &mut StdRng) -> Option<(usize, f64)> {
        let n_features = self.x.first().map(Vec::len).unwrap_or(0);
        if n_features == 0 {
            return None;
        }
        let candidates: Vec<usize> = match self.params.max_features {
            Some(m) if m < n_features => sample(rng, n_features, m.max(1)).into_vec(),
            _ => (0..n_features).collect(),
        };

        let total: f64 = counts.iter().sum();
        let parent = gini(counts, total);
        let mut best: Option<(usize, f64, f64)> = None;

        let mut order = indices.to_vec();
        for feature in candidates {
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left = vec![0.0; self.n_classes];
            let mut left_total = 0.0;
            for pos in 0..order.len() - 1 {
                let i = order[pos];
                left[self.y[i]] += self.weights[i];
                left_total += self.weights[i];

                let here = self.x[i][feature];
                let next = self.x[order[pos + 1]][feature];
                if here == next {
                    continue;
                }

                let right: Vec<f64> = counts.iter().zip(&left).map(|(c, l)| c - l).collect();
                let right_total = total - left_total;
                let impurity =
                    (left_total * gini(&left, left_total) + right_total * gini(&right, right_total)) / total;

                if impurity < parent - 1e-12 && best.map_or(true, |(_, _, b)| impurity < b) {
                    best = Some((feature, (here + next) / 2.0, impurity));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}
