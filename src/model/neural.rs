//! Iteratively trained leaf model over a [`GraphRuntime`].
//!
//! Retention indices are scaled by 1/1000 for training and scaled back
//! on prediction, keeping runtime targets near the unit interval.

use std::path::Path;

use crate::dataset::RetentionEntry;
use crate::error::Result;
use crate::model::leaf::LeafKind;
use crate::model::runtime::GraphRuntime;
use crate::model::{ModelData, Predictor};

/// Target scale between retention units and runtime units.
pub const RETENTION_SCALE: f32 = 1000.0;

pub struct NeuralModel<R: GraphRuntime> {
    name: String,
    data: ModelData,
    kind: LeafKind,
    runtime: R,
    inputs: Vec<Vec<f32>>,
    labels: Vec<f32>,
    cursor: usize,
}

impl<R: GraphRuntime> NeuralModel<R> {
    /// Materializes the training matrix for `kind` and wraps `runtime`.
    ///
    /// # Errors
    /// Fails when any training entry cannot be featurized.
    pub fn new(name: &str, data: ModelData, kind: LeafKind, runtime: R) -> Result<Self> {
        let inputs = kind.batch_input(data.train(), &data)?;
        let labels = data
            .train()
            .entries()
            .iter()
            .map(|e| e.retention() / RETENTION_SCALE)
            .collect();
        Ok(Self { name: name.to_string(), data, kind, runtime, inputs, labels, cursor: 0 })
    }

    #[must_use]
    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Draws the next mini-batch by walking the training set in order.
    /// The cursor resets to zero after handing out the last sample, so
    /// a batch may wrap around the end of an epoch.
    fn next_batch(&mut self, batch_size: usize) -> (Vec<Vec<f32>>, Vec<f32>) {
        let mut inputs = Vec::with_capacity(batch_size);
        let mut labels = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            inputs.push(self.inputs[self.cursor].clone());
            labels.push(self.labels[self.cursor]);
            if self.cursor + 1 >= self.inputs.len() {
                self.cursor = 0;
            } else {
                self.cursor += 1;
            }
        }
        (inputs, labels)
    }

    /// Runs one training step and returns the batch loss.
    ///
    /// # Errors
    /// Fails when the training set is empty or the runtime rejects the
    /// batch.
    pub fn train_iteration(&mut self, batch_size: usize) -> Result<f32> {
        let (inputs, labels) = self.next_batch(batch_size);
        self.runtime.fit_batch(&inputs, &labels)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.runtime.save(path)
    }

    /// Restores runtime state and rewinds the batch cursor.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.runtime.load(path)?;
        self.cursor = 0;
        Ok(())
    }
}

impl<R: GraphRuntime> Predictor for NeuralModel<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> &ModelData {
        &self.data
    }

    fn predict_entry(&self, entry: &RetentionEntry) -> Result<f32> {
        let row = self.kind.input_row(entry, &self.data)?;
        Ok(self.runtime.output(&row)? * RETENTION_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::toy::ToyChemService;
    use crate::chem::ChemService;
    use crate::dataset::RetentionDataset;
    use crate::error::RetenerError;
    use crate::model::runtime::SgdRegressor;
    use std::sync::Arc;

    fn simple_data() -> ModelData {
        let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
        let train = RetentionDataset::new(vec![
            RetentionEntry::new("C", 100.0, 0),
            RetentionEntry::new("CC", 200.0, 0),
            RetentionEntry::new("CCC", 300.0, 0),
        ]);
        let validation = RetentionDataset::new(vec![RetentionEntry::new("CCCC", 400.0, 0)]);
        ModelData::from_parts(train, validation, chem, None).unwrap()
    }

    /// Records the targets it is fed; predicts zero.
    #[derive(Default)]
    struct RecordingRuntime {
        seen: Vec<f32>,
    }

    impl GraphRuntime for RecordingRuntime {
        fn fit_batch(&mut self, _inputs: &[Vec<f32>], targets: &[f32]) -> Result<f32> {
            self.seen.extend_from_slice(targets);
            Ok(0.0)
        }

        fn output(&self, _input: &[f32]) -> Result<f32> {
            Ok(0.5)
        }

        fn save(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn load(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_batches_walk_in_order_and_wrap() {
        let mut model =
            NeuralModel::new("cnn", simple_data(), LeafKind::SmilesCnn, RecordingRuntime::default())
                .unwrap();
        // Two batches of two over three samples: 0,1 then 2,0.
        model.train_iteration(2).unwrap();
        model.train_iteration(2).unwrap();
        let runtime = &model.runtime;
        assert_eq!(runtime.seen, vec![0.1, 0.2, 0.3, 0.1]);
    }

    #[test]
    fn test_batch_can_wrap_mid_batch() {
        let mut model =
            NeuralModel::new("cnn", simple_data(), LeafKind::SmilesCnn, RecordingRuntime::default())
                .unwrap();
        model.train_iteration(5).unwrap();
        let runtime = &model.runtime;
        assert_eq!(runtime.seen, vec![0.1, 0.2, 0.3, 0.1, 0.2]);
    }

    #[test]
    fn test_predictions_scale_back_to_retention_units() {
        let model =
            NeuralModel::new("cnn", simple_data(), LeafKind::SmilesCnn, RecordingRuntime::default())
                .unwrap();
        // Runtime answers 0.5, so the model answers 500.
        assert_eq!(model.predict_single("CC", 0).unwrap(), 500.0);
    }

    #[test]
    fn test_training_reduces_validation_error() {
        let mut model =
            NeuralModel::new("cnn", simple_data(), LeafKind::SmilesCnn, SgdRegressor::new(0.001))
                .unwrap();
        model.train_iteration(3).unwrap();
        let before = model.validate(None).unwrap().mae;
        for _ in 0..500 {
            model.train_iteration(3).unwrap();
        }
        let after = model.validate(None).unwrap().mae;
        assert!(after < before);
    }

    #[test]
    fn test_save_load_restores_predictions() {
        let mut model =
            NeuralModel::new("cnn", simple_data(), LeafKind::SmilesCnn, SgdRegressor::new(0.001))
                .unwrap();
        for _ in 0..50 {
            model.train_iteration(3).unwrap();
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cnn.json");
        model.save(&path).unwrap();
        let expected = model.predict_single("CC", 0).unwrap();

        let mut restored =
            NeuralModel::new("cnn", simple_data(), LeafKind::SmilesCnn, SgdRegressor::new(0.001))
                .unwrap();
        assert!(matches!(
            restored.predict_single("CC", 0).unwrap_err(),
            RetenerError::NotFitted { .. }
        ));
        restored.load(&path).unwrap();
        assert_eq!(restored.predict_single("CC", 0).unwrap(), expected);
    }
}
