//! Retention prediction models.
//!
//! [`ModelData`] owns the train/validation pair every model trains
//! against and enforces compound-level disjointness between the two.
//! [`Predictor`] is the single contract all models implement; the
//! submodules hold the concrete learners.

pub mod gbt;
pub mod leaf;
pub mod linear;
pub mod neural;
pub mod runtime;
pub mod stacking;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use rand::Rng;

use crate::chem::{ChemService, IdentityNotion};
use crate::dataset::{RetentionDataset, RetentionEntry};
use crate::descriptors::DescriptorCache;
use crate::error::{RetenerError, Result};
use crate::metrics::Metrics;

/// Identity notions the leakage gate checks. A shared compound under
/// either notion is fatal: stereo-aware canonical form catches literal
/// duplicates, the structure key catches stereo variants of the same
/// skeleton.
pub const LEAKAGE_NOTIONS: [IdentityNotion; 2] =
    [IdentityNotion::CanonicalStereo, IdentityNotion::StructureKey];

/// Train/validation data plus the shared services models consume.
///
/// Construction always passes through the leakage gate, so any
/// `ModelData` in hand holds a compound-disjoint pair.
#[derive(Clone)]
pub struct ModelData {
    train: RetentionDataset,
    validation: RetentionDataset,
    chem: Arc<dyn ChemService>,
    descriptors: Option<Arc<DescriptorCache>>,
}

impl std::fmt::Debug for ModelData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelData")
            .field("train", &self.train)
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl ModelData {
    /// Builds from an explicit train/validation pair.
    ///
    /// # Errors
    /// Fails with [`RetenerError::Leakage`] when the two sets share a
    /// compound under any of [`LEAKAGE_NOTIONS`].
    pub fn from_parts(
        train: RetentionDataset,
        validation: RetentionDataset,
        chem: Arc<dyn ChemService>,
        descriptors: Option<Arc<DescriptorCache>>,
    ) -> Result<Self> {
        let data = Self { train, validation, chem, descriptors };
        data.assert_no_leakage()?;
        Ok(data)
    }

    /// Shuffles a copy of `dataset` and splits off a validation set
    /// holding `validation_fraction` of the distinct compounds.
    ///
    /// # Errors
    /// Fails when the split cannot be made or when the resulting pair
    /// leaks compounds across the boundary.
    pub fn split<R: Rng>(
        dataset: &RetentionDataset,
        validation_fraction: f32,
        rng: &mut R,
        chem: Arc<dyn ChemService>,
        descriptors: Option<Arc<DescriptorCache>>,
    ) -> Result<Self> {
        let mut shuffled = dataset.clone();
        shuffled.shuffle(rng);
        let (validation, train) = shuffled.split_by_identity_fraction(validation_fraction, rng)?;
        Self::from_parts(train, validation, chem, descriptors)
    }

    /// Re-checks compound disjointness under every gated notion.
    pub fn assert_no_leakage(&self) -> Result<()> {
        for notion in LEAKAGE_NOTIONS {
            let overlap = self
                .train
                .count_overlap(&self.validation, notion, self.chem.as_ref())?;
            if overlap > 0 {
                return Err(RetenerError::Leakage {
                    overlap,
                    notion: notion.describe().to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn train(&self) -> &RetentionDataset {
        &self.train
    }

    #[must_use]
    pub fn validation(&self) -> &RetentionDataset {
        &self.validation
    }

    #[must_use]
    pub fn chem(&self) -> &Arc<dyn ChemService> {
        &self.chem
    }

    #[must_use]
    pub fn descriptors(&self) -> Option<&Arc<DescriptorCache>> {
        self.descriptors.as_ref()
    }

    /// Swaps in a new training set. Used by cross-validation to rotate
    /// folds; the caller is responsible for fold disjointness.
    pub fn set_train(&mut self, train: RetentionDataset) {
        self.train = train;
    }

    pub fn set_validation(&mut self, validation: RetentionDataset) {
        self.validation = validation;
    }

    pub fn set_descriptors(&mut self, descriptors: Option<Arc<DescriptorCache>>) {
        self.descriptors = descriptors;
    }
}

/// Common contract of every retention model.
pub trait Predictor {
    /// Short human-readable model name for log lines and file names.
    fn name(&self) -> &str;

    /// The data the model was built around.
    fn data(&self) -> &ModelData;

    /// Predicts the retention index of one entry. Implementations must
    /// only read the structure and column, never the stored retention.
    fn predict_entry(&self, entry: &RetentionEntry) -> Result<f32>;

    /// Predicts every entry of a dataset, in order.
    fn predict(&self, dataset: &RetentionDataset) -> Result<Vec<f32>> {
        dataset
            .entries()
            .iter()
            .map(|entry| self.predict_entry(entry))
            .collect()
    }

    /// Predicts a bare structure/column pair.
    fn predict_single(&self, smiles: &str, column: i32) -> Result<f32> {
        self.predict_entry(&RetentionEntry::new(smiles, 0.0, column))
    }

    /// Scores the model on an arbitrary test set. When
    /// `predictions_file` is given, one `smiles truth predicted` line
    /// per entry is written there.
    fn validate_on(&self, test: &RetentionDataset, predictions_file: Option<&Path>) -> Result<Metrics> {
        if test.is_empty() {
            return Err(RetenerError::empty_input("test set"));
        }
        let predictions = self.predict(test)?;
        let targets: Vec<f32> = test.entries().iter().map(RetentionEntry::retention).collect();

        if let Some(path) = predictions_file {
            let mut out = BufWriter::new(File::create(path)?);
            write_predictions(&mut out, test, &predictions)?;
        }
        Metrics::compute(&predictions, &targets)
    }

    /// Scores the model on its own validation set.
    fn validate(&self, predictions_file: Option<&Path>) -> Result<Metrics> {
        self.validate_on(self.data().validation(), predictions_file)
    }
}

/// Streams one `smiles truth predicted` line per scored entry.
pub fn write_predictions(
    out: &mut dyn Write,
    dataset: &RetentionDataset,
    predictions: &[f32],
) -> Result<()> {
    for (entry, prediction) in dataset.entries().iter().zip(predictions) {
        writeln!(out, "{} {} {}", entry.smiles(), entry.retention(), prediction)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::toy::ToyChemService;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chem() -> Arc<dyn ChemService> {
        Arc::new(ToyChemService::new())
    }

    fn sample_dataset() -> RetentionDataset {
        RetentionDataset::new(vec![
            RetentionEntry::new("CCC", 300.0, 0),
            RetentionEntry::new("CCC", 301.0, 1),
            RetentionEntry::new("CCCC", 400.0, 0),
            RetentionEntry::new("CCCCC", 500.0, 2),
            RetentionEntry::new("CCCCCC", 600.0, 2),
            RetentionEntry::new("CCCCCCC", 700.0, 0),
        ])
    }

    /// Memorizes nothing, answers with a constant. Lets the provided
    /// trait methods be exercised without a real learner.
    struct ConstantModel {
        data: ModelData,
        value: f32,
    }

    impl Predictor for ConstantModel {
        fn name(&self) -> &str {
            "constant"
        }

        fn data(&self) -> &ModelData {
            &self.data
        }

        fn predict_entry(&self, _entry: &RetentionEntry) -> Result<f32> {
            Ok(self.value)
        }
    }

    #[test]
    fn test_split_is_compound_disjoint() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = ModelData::split(&sample_dataset(), 0.4, &mut rng, chem(), None).unwrap();
        assert!(!data.train().is_empty());
        assert!(!data.validation().is_empty());
        assert_eq!(data.train().len() + data.validation().len(), 6);
        data.assert_no_leakage().unwrap();
    }

    #[test]
    fn test_from_parts_rejects_shared_compound() {
        let train = RetentionDataset::new(vec![
            RetentionEntry::new("CCC", 300.0, 0),
            RetentionEntry::new("CCCC", 400.0, 0),
        ]);
        let validation = RetentionDataset::new(vec![RetentionEntry::new("CCC", 301.0, 1)]);
        let err = ModelData::from_parts(train, validation, chem(), None).unwrap_err();
        assert!(matches!(err, RetenerError::Leakage { overlap: 1, .. }));
    }

    #[test]
    fn test_from_parts_rejects_stereo_variant_leak() {
        // Same skeleton, different stereo annotation: caught by the
        // structure-key notion even though canonical forms differ.
        let train = RetentionDataset::new(vec![RetentionEntry::new("C/C=C/C", 410.0, 0)]);
        let validation = RetentionDataset::new(vec![RetentionEntry::new("CC=CC", 405.0, 0)]);
        let err = ModelData::from_parts(train, validation, chem(), None).unwrap_err();
        assert!(matches!(err, RetenerError::Leakage { .. }));
    }

    #[test]
    fn test_validate_and_predictions_file() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = ModelData::split(&sample_dataset(), 0.4, &mut rng, chem(), None).unwrap();
        let expected_len = data.validation().len();
        let model = ConstantModel { data, value: 450.0 };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.txt");
        let metrics = model.validate(Some(&path)).unwrap();
        assert!(metrics.mae > 0.0);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), expected_len);
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[2], "450");
        }
    }

    #[test]
    fn test_validate_on_arbitrary_test_set() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = ModelData::split(&sample_dataset(), 0.4, &mut rng, chem(), None).unwrap();
        let model = ConstantModel { data, value: 500.0 };

        let test = RetentionDataset::new(vec![
            RetentionEntry::new("CCO", 450.0, 0),
            RetentionEntry::new("CCCO", 550.0, 1),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.txt");
        let metrics = model.validate_on(&test, Some(&path)).unwrap();
        assert!((metrics.mae - 50.0).abs() < 1e-6);
        assert_eq!(metrics.mdae, 50.0);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("CCO 450 500"));

        // validate() is validate_on over the model's validation set.
        let own = model.validate(None).unwrap();
        let via = model.validate_on(model.data().validation(), None).unwrap();
        assert_eq!(own.to_string(), via.to_string());
    }

    #[test]
    fn test_predict_single_uses_placeholder_label() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = ModelData::split(&sample_dataset(), 0.4, &mut rng, chem(), None).unwrap();
        let model = ConstantModel { data, value: 123.0 };
        assert_eq!(model.predict_single("CCO", 0).unwrap(), 123.0);
    }

    #[test]
    fn test_validate_requires_validation_entries() {
        let data = ModelData::from_parts(
            sample_dataset(),
            RetentionDataset::new(Vec::new()),
            chem(),
            None,
        )
        .unwrap();
        let model = ConstantModel { data, value: 0.0 };
        assert!(model.validate(None).is_err());
    }
}
