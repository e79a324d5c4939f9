//! CART regression tree fitted by exact greedy squared-error splits
//!
//! Nodes live in a flat vector; a split sends `x[feature] <= threshold` to
//! `left` and everything else to `right`.

use serde::{Deserialize, Serialize};

/// Smallest reduction in squared error worth a split
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

/// A node of a fitted tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fit on the given `rows` of `inputs`, considering only `features`
    ///
    /// `rows` must be non-empty and index into both `inputs` and `targets`.
    pub fn fit(
        inputs: &[Vec<f64>],
        targets: &[f64],
        rows: &[usize],
        features: &[usize],
        params: &TreeParams,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        if rows.is_empty() {
            tree.nodes.push(TreeNode::Leaf { value: 0.0 });
            return tree;
        }
        tree.grow(inputs, targets, rows.to_vec(), features, 0, params);
        tree
    }

    fn grow(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[f64],
        rows: Vec<usize>,
        features: &[usize],
        depth: usize,
        params: &TreeParams,
    ) -> usize {
        let node = self.nodes.len();
        let mean = rows.iter().map(|&r| targets[r]).sum::<f64>() / rows.len() as f64;
        self.nodes.push(TreeNode::Leaf { value: mean });

        if depth >= params.max_depth || rows.len() < 2 * params.min_samples_leaf {
            return node;
        }
        let Some(split) = best_split(inputs, targets, &rows, features, params.min_samples_leaf)
        else {
            return node;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| inputs[r][split.feature] <= split.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return node;
        }

        let left = self.grow(inputs, targets, left_rows, features, depth + 1, params);
        let right = self.grow(inputs, targets, right_rows, features, depth + 1, params);
        self.nodes[node] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node
    }

    /// Walk the tree for one feature vector
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => return 0.0,
            }
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(TreeNode::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

/// Best squared-error split over `features`, if any improves on the parent
fn best_split(
    inputs: &[Vec<f64>],
    targets: &[f64],
    rows: &[usize],
    features: &[usize],
    min_samples_leaf: usize,
) -> Option<Split> {
    let n = rows.len();
    let total: f64 = rows.iter().map(|&r| targets[r]).sum();
    let parent_score = total * total / n as f64;

    let mut best: Option<Split> = None;
    let mut order = rows.to_vec();

    for &feature in features {
        order.sort_by(|&a, &b| inputs[a][feature].total_cmp(&inputs[b][feature]));

        let mut left_sum = 0.0;
        for i in 0..n - 1 {
            left_sum += targets[order[i]];
            let left_n = i + 1;
            let right_n = n - left_n;
            if left_n < min_samples_leaf || right_n < min_samples_leaf {
                continue;
            }

            let current = inputs[order[i]][feature];
            let next = inputs[order[i + 1]][feature];
            if current >= next {
                continue;
            }

            let right_sum = total - left_sum;
            let score =
                left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64;
            let gain = score - parent_score;

            if gain > best.map_or(MIN_SPLIT_GAIN, |b| b.gain) {
                let mid = current + (next - current) / 2.0;
                // Adjacent floats can round the midpoint up onto `next`
                let threshold = if mid < next { mid } else { current };
                best = Some(Split {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}
