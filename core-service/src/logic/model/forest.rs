//! Random Forest - bootstrap ensemble of Gini decision trees
//!
//! Trees are grown to purity on a bootstrap sample, considering
//! `floor(sqrt(n_features))` randomly chosen features per split. Each tree
//! gets its own RNG seeded from `base_seed + tree_index`, so a forest is
//! reproducible and tree order does not depend on scheduling.
//!
//! Nodes are stored flat (index-linked), samples with `value <= threshold`
//! go left.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::pipeline::TrainingFailure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        class: u8,
        /// Fraction of training samples in this leaf labeled safe
        safe_fraction: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

/// Class counts [unsafe, safe]
fn counts(y: &[u8], samples: &[usize]) -> [usize; 2] {
    let mut c = [0usize; 2];
    for &i in samples {
        c[usize::from(y[i] == 1)] += 1;
    }
    c
}

fn gini(c: [usize; 2]) -> f64 {
    let total = (c[0] + c[1]) as f64;
    if total == 0.0 {
        return 0.0;
    }
    let p0 = c[0] as f64 / total;
    let p1 = c[1] as f64 / total;
    1.0 - p0 * p0 - p1 * p1
}

fn leaf(c: [usize; 2]) -> TreeNode {
    let total = (c[0] + c[1]).max(1) as f64;
    let safe_fraction = c[1] as f64 / total;
    TreeNode::Leaf {
        class: u8::from(c[1] > c[0]),
        safe_fraction,
    }
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Best threshold on one feature, or `None` when the feature is constant here
fn best_threshold(
    x: ArrayView2<f64>,
    y: &[u8],
    samples: &[usize],
    feature: usize,
    parent: [usize; 2],
) -> Option<Candidate> {
    let mut sorted: Vec<(f64, u8)> = samples.iter().map(|&i| (x[[i, feature]], y[i])).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = sorted.len() as f64;
    let mut left = [0usize; 2];
    let mut best: Option<Candidate> = None;

    for k in 0..sorted.len() - 1 {
        left[usize::from(sorted[k].1 == 1)] += 1;
        let (lo, hi) = (sorted[k].0, sorted[k + 1].0);
        if lo >= hi {
            continue;
        }

        let right = [parent[0] - left[0], parent[1] - left[1]];
        let n_left = (k + 1) as f64;
        let impurity = (n_left * gini(left) + (n - n_left) * gini(right)) / n;

        if best.as_ref().map_or(true, |b| impurity < b.impurity) {
            let mut threshold = lo + (hi - lo) / 2.0;
            if threshold >= hi {
                threshold = lo;
            }
            best = Some(Candidate {
                feature,
                threshold,
                impurity,
            });
        }
    }
    best
}

impl DecisionTree {
    pub fn fit(
        x: ArrayView2<f64>,
        y: &[u8],
        samples: Vec<usize>,
        max_features: usize,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = x.ncols();
        let mut nodes: Vec<TreeNode> = Vec::new();
        // (node slot, samples reaching it)
        let mut pending: Vec<(usize, Vec<usize>)> = Vec::new();

        nodes.push(leaf(counts(y, &samples)));
        pending.push((0, samples));

        while let Some((slot, samples)) = pending.pop() {
            let c = counts(y, &samples);
            if samples.len() < 2 || c[0] == 0 || c[1] == 0 {
                nodes[slot] = leaf(c);
                continue;
            }

            let mut order: Vec<usize> = (0..n_features).collect();
            order.shuffle(rng);

            // Keep drawing features past max_features until one can split
            let mut best: Option<Candidate> = None;
            for (visited, &feature) in order.iter().enumerate() {
                if visited >= max_features && best.is_some() {
                    break;
                }
                if let Some(found) = best_threshold(x, y, &samples, feature, c) {
                    if best.as_ref().map_or(true, |b| found.impurity < b.impurity) {
                        best = Some(found);
                    }
                }
            }

            let Some(split) = best else {
                nodes[slot] = leaf(c);
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = samples
                .iter()
                .partition(|&&i| x[[i, split.feature]] <= split.threshold);

            let left = nodes.len();
            nodes.push(leaf(counts(y, &left_rows)));
            let right = nodes.len();
            nodes.push(leaf(counts(y, &right_rows)));

            nodes[slot] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            pending.push((right, right_rows));
            pending.push((left, left_rows));
        }

        Self { nodes }
    }

    fn leaf_for(&self, row: ArrayView1<f64>) -> (u8, f64) {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf {
                    class,
                    safe_fraction,
                } => return (*class, *safe_fraction),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn predict(&self, row: ArrayView1<f64>) -> u8 {
        self.leaf_for(row).0
    }

    pub fn safe_probability(&self, row: ArrayView1<f64>) -> f64 {
        self.leaf_for(row).1
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let TreeNode::Split { left, right, .. } = &self.nodes[index] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn fit(
        x: ArrayView2<f64>,
        y: &[u8],
        n_estimators: usize,
        seed: u64,
    ) -> Result<Self, TrainingFailure> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 {
            return Err(TrainingFailure::EmptyTrainingSet);
        }
        if y.len() != n_samples {
            return Err(TrainingFailure::ShapeMismatch {
                rows: n_samples,
                labels: y.len(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(TrainingFailure::NumericalInstability(
                "non-finite feature value".to_string(),
            ));
        }

        let max_features = ((n_features as f64).sqrt().floor() as usize).max(1);
        let trees = (0..n_estimators.max(1))
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                DecisionTree::fit(x, y, bootstrap, max_features, &mut rng)
            })
            .collect();

        Ok(Self { trees, n_features })
    }

    /// Mean of the per-tree leaf safe fractions
    pub fn predict_proba(&self, row: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.safe_probability(row)).sum();
        total / self.trees.len().max(1) as f64
    }

    /// Safe only on a strict majority; an even split votes unsafe
    pub fn predict(&self, row: ArrayView1<f64>) -> u8 {
        u8::from(self.predict_proba(row) > 0.5)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn avg_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: usize = self.trees.iter().map(DecisionTree::depth).sum();
        total as f64 / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_tree_fits_training_data() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 1.0], [4.0, 1.0]];
        let y = [0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(x.view(), &y, vec![0, 1, 2, 3], 1, &mut rng);

        for (row, &label) in x.rows().into_iter().zip(&y) {
            assert_eq!(tree.predict(row), label);
        }
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let x = array![[1.0], [3.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &[0, 1], vec![0, 1], 1, &mut rng);
        match &tree.nodes[0] {
            TreeNode::Split { threshold, .. } => assert_eq!(*threshold, 2.0),
            other => panic!("Expected split, got {:?}", other),
        }
        assert_eq!(tree.predict(array![2.0].view()), 0);
        assert_eq!(tree.predict(array![2.1].view()), 1);
    }

    #[test]
    fn test_constant_features_make_a_leaf() {
        let x = array![[5.0, 5.0], [5.0, 5.0], [5.0, 5.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &[1, 0, 1], vec![0, 1, 2], 1, &mut rng);

        assert_eq!(tree.n_nodes(), 1);
        let p = tree.safe_probability(array![5.0, 5.0].view());
        assert!((p - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_forest_single_class_trains() {
        let x = array![[1.0], [2.0], [3.0]];
        let forest = RandomForest::fit(x.view(), &[1, 1, 1], 10, 42).unwrap();
        assert_eq!(forest.n_trees(), 10);
        assert_eq!(forest.predict(array![100.0].view()), 1);
        assert_eq!(forest.avg_depth(), 0.0);
    }

    #[test]
    fn test_forest_is_reproducible() {
        let x = array![
            [0.1, 2.0, 3.0],
            [0.9, 1.0, 0.0],
            [0.4, 0.5, 1.5],
            [0.7, 2.5, 2.0],
            [0.2, 0.1, 0.3],
            [0.8, 1.8, 2.2]
        ];
        let y = [0, 1, 0, 1, 0, 1];
        let a = RandomForest::fit(x.view(), &y, 25, 42).unwrap();
        let b = RandomForest::fit(x.view(), &y, 25, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_features(), 3);
    }

    #[test]
    fn test_forest_separates_clusters() {
        let x = array![[-3.0, -3.0], [-2.5, -2.0], [-2.0, -3.0], [2.0, 3.0], [2.5, 2.0], [3.0, 3.0]];
        let y = [0, 0, 0, 1, 1, 1];
        let forest = RandomForest::fit(x.view(), &y, 50, 7).unwrap();

        assert_eq!(forest.predict(array![-2.8, -2.6].view()), 0);
        assert_eq!(forest.predict(array![2.8, 2.6].view()), 1);
    }

    #[test]
    fn test_non_finite_input_fails() {
        let x = array![[1.0], [f64::NAN]];
        let result = RandomForest::fit(x.view(), &[0, 1], 5, 0);
        assert!(matches!(result, Err(TrainingFailure::NumericalInstability(_))));
    }
}
