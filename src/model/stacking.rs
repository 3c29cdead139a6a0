//! Stacking ensemble with a linear meta-learner.
//!
//! The ensemble owns a set of already-trained leaf models and fits a
//! [`LinearHead`] over their predictions. Meta-learner training data
//! must be compound-disjoint from every leaf's training set, otherwise
//! the head would fit to memorized leaf outputs.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::dataset::RetentionEntry;
use crate::error::{RetenerError, Result};
use crate::metrics::Metrics;
use crate::model::linear::LinearHead;
use crate::model::neural::RETENTION_SCALE;
use crate::model::{ModelData, Predictor, LEAKAGE_NOTIONS};

pub struct StackingModel {
    name: String,
    data: ModelData,
    leaves: Vec<Box<dyn Predictor>>,
    head: Option<LinearHead>,
}

impl std::fmt::Debug for StackingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackingModel")
            .field("name", &self.name)
            .field("data", &self.data)
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

impl StackingModel {
    /// Wraps trained leaves around a fresh meta-learner dataset.
    ///
    /// # Errors
    /// Fails with [`RetenerError::Leakage`] when any leaf's training
    /// set shares a compound with the meta-learner's train or
    /// validation set, and when the leaf list is empty.
    pub fn new(name: &str, data: ModelData, leaves: Vec<Box<dyn Predictor>>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(RetenerError::empty_input("leaf models"));
        }
        for leaf in &leaves {
            let leaf_train = leaf.data().train();
            for own in [data.train(), data.validation()] {
                for notion in LEAKAGE_NOTIONS {
                    let overlap = leaf_train.count_overlap(own, notion, data.chem().as_ref())?;
                    if overlap > 0 {
                        return Err(RetenerError::Leakage {
                            overlap,
                            notion: notion.describe().to_string(),
                        });
                    }
                }
            }
        }
        Ok(Self { name: name.to_string(), data, leaves, head: None })
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// One feature per leaf: its prediction scaled to runtime units.
    fn leaf_features(&self, entry: &RetentionEntry) -> Result<Vec<f32>> {
        self.leaves
            .iter()
            .map(|leaf| Ok(leaf.predict_entry(entry)? / RETENTION_SCALE))
            .collect()
    }

    /// Fits the head on the meta-learner training set and returns the
    /// validation metrics.
    ///
    /// # Errors
    /// Fails when a leaf cannot predict, when the head cannot be
    /// fitted, or when validation fails.
    pub fn train(&mut self) -> Result<Metrics> {
        let rows: Vec<Vec<f32>> = self
            .data
            .train()
            .entries()
            .iter()
            .map(|entry| self.leaf_features(entry))
            .collect::<Result<_>>()?;
        let targets: Vec<f32> = self
            .data
            .train()
            .entries()
            .iter()
            .map(|e| e.retention() / RETENTION_SCALE)
            .collect();
        self.head = Some(LinearHead::fit(&rows, &targets)?);
        self.validate(None)
    }

    fn fitted_head(&self) -> Result<&LinearHead> {
        self.head.as_ref().ok_or_else(|| RetenerError::NotFitted {
            operation: "StackingModel::predict_entry".into(),
        })
    }

    /// Persists the fitted head. Leaves persist through their own
    /// save paths.
    pub fn save(&self, path: &Path) -> Result<()> {
        let head = self.fitted_head()?;
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), head)
            .map_err(|e| RetenerError::Serialization(e.to_string()))
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let head: LinearHead = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RetenerError::Serialization(e.to_string()))?;
        if head.coefficients().len() != self.leaves.len() {
            return Err(RetenerError::dimension_mismatch(
                "leaf models",
                self.leaves.len(),
                head.coefficients().len(),
            ));
        }
        self.head = Some(head);
        Ok(())
    }
}

impl Predictor for StackingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> &ModelData {
        &self.data
    }

    fn predict_entry(&self, entry: &RetentionEntry) -> Result<f32> {
        let head = self.fitted_head()?;
        let features = self.leaf_features(entry)?;
        Ok(head.predict_row(&features)? * RETENTION_SCALE)
    }
}
