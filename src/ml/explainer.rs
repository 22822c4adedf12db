//! Additive per-feature attributions for tree ensemble predictions.
//!
//! [`TreeShap`] implements the exact path-dependent TreeSHAP algorithm
//! (Lundberg, Erion & Lee, 2018). For every input it returns one contribution
//! per feature such that `expected_value + Σ contributions` reproduces the
//! ensemble prediction. Cost is O(trees × leaves × depth²), noticeably more
//! than a single prediction; callers wanting a latency bound must impose it
//! from outside.

use crate::error::{AppError, Result};
use crate::ml::ensemble::{RegressionTree, TreeEnsemble, TreeNode};
use crate::ml::features::{FeatureVector, N_FEATURES};
use crate::ml::models::Explanation;
use std::sync::Arc;

/// Attribution strategy behind the explainer
pub trait Attributor: Send + Sync {
    /// Mean model output over the training data
    fn expected_value(&self) -> f64;

    /// One contribution per input feature, in canonical order
    fn attribute(&self, x: &FeatureVector) -> Result<Vec<f64>>;
}

/// Holds the baseline captured at construction plus the attribution method
#[derive(Clone)]
pub struct AttributionExplainer {
    base_value: f64,
    method: Arc<dyn Attributor>,
}

impl AttributionExplainer {
    /// Capture the baseline once; it never changes afterwards
    pub fn new(method: Arc<dyn Attributor>) -> Result<Self> {
        let base_value = method.expected_value();
        if !base_value.is_finite() {
            return Err(AppError::Startup(format!(
                "explainer baseline is not finite ({})",
                base_value
            )));
        }
        Ok(Self { base_value, method })
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    pub fn explain(&self, x: &FeatureVector) -> Result<Explanation> {
        let values = self.method.attribute(x)?;
        let contributions: [f64; N_FEATURES] = values.try_into().map_err(|v: Vec<f64>| {
            AppError::ModelInference(format!(
                "explainer returned {} attributions, expected {}",
                v.len(),
                N_FEATURES
            ))
        })?;

        Ok(Explanation {
            base_value: self.base_value,
            contributions,
        })
    }
}

impl std::fmt::Debug for AttributionExplainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributionExplainer")
            .field("base_value", &self.base_value)
            .finish()
    }
}

/// Exact TreeSHAP over a shared, immutable ensemble
#[derive(Debug, Clone)]
pub struct TreeShap {
    ensemble: Arc<TreeEnsemble>,
}

impl TreeShap {
    pub fn new(ensemble: Arc<TreeEnsemble>) -> Self {
        Self { ensemble }
    }

    fn tree_shap(tree: &RegressionTree, x: &FeatureVector, phi: &mut [f64]) {
        recurse(tree, 0, x, phi, Vec::with_capacity(tree.max_depth() + 2), 1.0, 1.0, None);
    }
}

impl Attributor for TreeShap {
    fn expected_value(&self) -> f64 {
        self.ensemble.expected_value()
    }

    fn attribute(&self, x: &FeatureVector) -> Result<Vec<f64>> {
        self.ensemble.check_schema()?;

        let mut phi = vec![0.0; N_FEATURES];
        for tree in self.ensemble.trees() {
            Self::tree_shap(tree, x, &mut phi);
        }

        if phi.iter().any(|v| !v.is_finite()) {
            return Err(AppError::ModelInference(
                "attribution produced a non-finite value".to_string(),
            ));
        }
        Ok(phi)
    }
}

/// One entry of the unique feature path from the root to the current node
#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

fn extend_path(
    path: &mut Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let scale = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i + 1) as f64 / scale;
        path[i].pweight = zero_fraction * path[i].pweight * (depth - i) as f64 / scale;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let scale = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
            next_one_portion = tmp - path[i].pweight * zero_fraction * (depth - i) as f64 / scale;
        } else {
            path[i].pweight = path[i].pweight * scale / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total permutation weight of the path with element `index` removed
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let scale = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * scale / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion =
                path[i].pweight - tmp * zero_fraction * ((depth - i) as f64 / scale);
        } else if zero_fraction != 0.0 {
            total += (path[i].pweight / zero_fraction) / ((depth - i) as f64 / scale);
        }
    }
    total
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &RegressionTree,
    index: usize,
    x: &FeatureVector,
    phi: &mut [f64],
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend_path(&mut path, zero_fraction, one_fraction, feature);

    match *tree.node(index) {
        TreeNode::Leaf { value, .. } => {
            for i in 1..path.len() {
                let weight = unwound_path_sum(&path, i);
                let element = path[i];
                if let Some(f) = element.feature {
                    phi[f] += weight * (element.one_fraction - element.zero_fraction) * value;
                }
            }
        }
        TreeNode::Split {
            feature: split,
            left,
            right,
            cover,
            ..
        } => {
            let hot = tree.follow(index, x);
            let cold = if hot == left { right } else { left };
            let hot_zero_fraction = tree.node(hot).cover() / cover;
            let cold_zero_fraction = tree.node(cold).cover() / cover;

            let mut incoming_zero_fraction = 1.0;
            let mut incoming_one_fraction = 1.0;

            // A feature already on the path is unwound so this split can redo it
            if let Some(k) = path.iter().position(|e| e.feature == Some(split)) {
                incoming_zero_fraction = path[k].zero_fraction;
                incoming_one_fraction = path[k].one_fraction;
                unwind_path(&mut path, k);
            }

            recurse(
                tree,
                hot,
                x,
                phi,
                path.clone(),
                hot_zero_fraction * incoming_zero_fraction,
                incoming_one_fraction,
                Some(split),
            );
            recurse(
                tree,
                cold,
                x,
                phi,
                path,
                cold_zero_fraction * incoming_zero_fraction,
                0.0,
                Some(split),
            );
        }
    }
}
