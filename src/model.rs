//! Trained model seams and the tree-ensemble models loaded from disk.
//!
//! Trees use the flat array layout of a fitted CART tree: node `i` is a leaf when
//! `children_left[i] == -1`, otherwise rows with `x[feature[i]] <= threshold[i]` go
//! to `children_left[i]` and the rest to `children_right[i]`.

use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use linfa::traits::{Predict, PredictInplace};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::artifact;
use crate::error::{AdvisorError, Result};

const LEAF: i64 = -1;

/// A model producing one continuous value per feature row.
pub trait Regressor {
    fn regress(&self, features: &[f64]) -> Result<f64>;
}

/// A model producing one class code per feature row.
pub trait Classifier {
    fn classify(&self, features: &[f64]) -> Result<usize>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

impl Tree {
    pub fn new(
        children_left: Vec<i64>,
        children_right: Vec<i64>,
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            children_left,
            children_right,
            feature,
            threshold,
            value,
        }
    }

    /// Single-node tree that always answers `value`.
    pub fn leaf(value: Vec<f64>) -> Self {
        Self::new(vec![LEAF], vec![LEAF], vec![-2], vec![-2.0], vec![value])
    }

    fn len(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, id: usize, n_features: usize, n_outputs: usize) -> Result<()> {
        let invalid = |reason: String| AdvisorError::InvalidTree { tree: id, reason };
        let n = self.len();
        if n == 0 {
            return Err(invalid("no nodes".into()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(invalid("node arrays differ in length".into()));
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(invalid(format!("node {} has only a right child", node)));
                }
                if self.value[node].len() != n_outputs {
                    return Err(invalid(format!(
                        "leaf {} carries {} values, expected {}",
                        node,
                        self.value[node].len(),
                        n_outputs
                    )));
                }
                continue;
            }
            // Children always follow their parent, which rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(invalid(format!("node {} points at child {}", node, child)));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(invalid(format!(
                    "node {} splits on feature {} of {}",
                    node, feature, n_features
                )));
            }
        }
        Ok(())
    }

    fn leaf_value(&self, row: ArrayView1<f64>) -> &[f64] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            node = if row[self.feature[node] as usize] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }
}

fn check_width(n_features: usize, got: usize) -> Result<()> {
    if got != n_features {
        return Err(AdvisorError::FeatureCount {
            expected: n_features,
            got,
        });
    }
    Ok(())
}

fn validate_trees(trees: &[Tree], n_features: usize, n_outputs: usize) -> Result<()> {
    if trees.is_empty() {
        return Err(AdvisorError::EmptyForest);
    }
    trees
        .iter()
        .enumerate()
        .try_for_each(|(id, tree)| tree.validate(id, n_features, n_outputs))
}

fn single_row(features: &[f64]) -> Array2<f64> {
    Array1::from(features.to_vec()).insert_axis(Axis(0))
}

/// Random-forest regressor: mean of the trees' leaf values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    n_features: usize,
    trees: Vec<Tree>,
}

impl ForestRegressor {
    pub fn new(n_features: usize, trees: Vec<Tree>) -> Result<Self> {
        let model = Self { n_features, trees };
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> AnyResult<Self> {
        let model: Self = artifact::load(path)?;
        model
            .validate()
            .with_context(|| format!("validating regressor {}", path.display()))?;
        log::info!(
            "Loaded regressor from {} ({} trees, {} features)",
            path.display(),
            model.trees.len(),
            model.n_features
        );
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        validate_trees(&self.trees, self.n_features, 1)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn mean_leaf(&self, row: ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.leaf_value(row)[0]).sum();
        total / self.trees.len() as f64
    }
}

impl PredictInplace<Array2<f64>, Array1<f64>> for ForestRegressor {
    fn predict_inplace<'a>(&'a self, x: &'a Array2<f64>, y: &mut Array1<f64>) {
        assert_eq!(x.nrows(), y.len(), "one target per record");
        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = self.mean_leaf(row);
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<f64> {
        Array1::zeros(x.nrows())
    }
}

impl Regressor for ForestRegressor {
    fn regress(&self, features: &[f64]) -> Result<f64> {
        check_width(self.n_features, features.len())?;
        let predicted: Array1<f64> = self.predict(&single_row(features));
        Ok(predicted[0])
    }
}

/// Random-forest classifier: averages each tree's normalized leaf distribution and
/// answers the class with the highest mean probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestClassifier {
    n_features: usize,
    classes: Vec<usize>,
    trees: Vec<Tree>,
}

impl ForestClassifier {
    pub fn new(n_features: usize, classes: Vec<usize>, trees: Vec<Tree>) -> Result<Self> {
        let model = Self {
            n_features,
            classes,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> AnyResult<Self> {
        let model: Self = artifact::load(path)?;
        model
            .validate()
            .with_context(|| format!("validating classifier {}", path.display()))?;
        log::info!(
            "Loaded classifier from {} ({} trees, {} features, {} classes)",
            path.display(),
            model.trees.len(),
            model.n_features,
            model.classes.len()
        );
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(AdvisorError::ClassCount {
                expected: 1,
                got: 0,
            });
        }
        let root_width = self
            .trees
            .first()
            .and_then(|t| t.value.first())
            .map(Vec::len);
        if let Some(expected) = root_width.filter(|w| *w != self.classes.len()) {
            return Err(AdvisorError::ClassCount {
                expected,
                got: self.classes.len(),
            });
        }
        validate_trees(&self.trees, self.n_features, self.classes.len())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn probabilities(&self, row: ArrayView1<f64>) -> Array1<f64> {
        let mut mean = Array1::<f64>::zeros(self.classes.len());
        for tree in &self.trees {
            let leaf = ArrayView1::from(tree.leaf_value(row));
            let total = leaf.sum();
            if total > 0.0 {
                mean.scaled_add(1.0 / total, &leaf);
            }
        }
        mean / self.trees.len() as f64
    }

    fn most_likely(&self, row: ArrayView1<f64>) -> usize {
        let proba = self.probabilities(row);
        let mut best = 0;
        for (pos, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = pos;
            }
        }
        self.classes[best]
    }
}

impl PredictInplace<Array2<f64>, Array1<usize>> for ForestClassifier {
    fn predict_inplace<'a>(&'a self, x: &'a Array2<f64>, y: &mut Array1<usize>) {
        assert_eq!(x.nrows(), y.len(), "one target per record");
        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            *target = self.most_likely(row);
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl Classifier for ForestClassifier {
    fn classify(&self, features: &[f64]) -> Result<usize> {
        check_width(self.n_features, features.len())?;
        let predicted: Array1<usize> = self.predict(&single_row(features));
        Ok(predicted[0])
    }
}
