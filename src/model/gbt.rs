//! Gradient-boosting style leaf model over a [`BoosterRuntime`].
//!
//! Trains on the tabular descriptor representation and predicts in
//! retention units directly. Hyperparameter tuning is plain random
//! search over fixed value lists, keeping the assignment with the best
//! validation MAE.

use std::path::Path;

use rand::Rng;

use crate::dataset::RetentionEntry;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::model::leaf::LeafKind;
use crate::model::runtime::BoosterRuntime;
use crate::model::{ModelData, Predictor};
use crate::train::search::{gbt_default_params, gbt_search_space, params_to_string, ParamSet};

pub struct GbtModel<B: BoosterRuntime> {
    name: String,
    data: ModelData,
    booster: B,
}

impl<B: BoosterRuntime> GbtModel<B> {
    pub fn new(name: &str, data: ModelData, booster: B) -> Self {
        Self { name: name.to_string(), data, booster }
    }

    #[must_use]
    pub fn kind(&self) -> LeafKind {
        LeafKind::DescriptorTable
    }

    /// Fits the booster on the training set with the given parameters
    /// and returns the validation metrics.
    ///
    /// # Errors
    /// Fails when featurization, training, or validation fails.
    pub fn train(&mut self, params: &ParamSet) -> Result<Metrics> {
        let rows = self.kind().batch_input(self.data.train(), &self.data)?;
        let targets: Vec<f32> = self
            .data
            .train()
            .entries()
            .iter()
            .map(RetentionEntry::retention)
            .collect();
        self.booster.train(params, &rows, &targets)?;
        self.validate(None)
    }

    /// Fits with the default parameter set.
    pub fn train_default(&mut self) -> Result<Metrics> {
        self.train(&gbt_default_params())
    }

    /// Random search over the fixed parameter lists. Each attempt is
    /// trained and validated; the booster state with the best MAE is
    /// checkpointed to `checkpoint` and reloaded before returning.
    ///
    /// # Errors
    /// Fails when `attempts` is zero or any attempt fails.
    pub fn tune<R: Rng>(
        &mut self,
        attempts: usize,
        rng: &mut R,
        checkpoint: &Path,
    ) -> Result<(ParamSet, Metrics)> {
        if attempts == 0 {
            return Err(crate::error::RetenerError::empty_input("tuning attempts"));
        }
        let space = gbt_search_space();
        let mut best: Option<(ParamSet, Metrics)> = None;
        for _ in 0..attempts {
            let params = space.sample(rng);
            let metrics = self.train(&params)?;
            println!("{} {}", params_to_string(&params), metrics);
            let improved = best.as_ref().map_or(true, |(_, b)| metrics.mae < b.mae);
            if improved {
                self.booster.save(checkpoint)?;
                best = Some((params, metrics));
            }
        }
        self.booster.load(checkpoint)?;
        // An attempt always ran, so a best assignment exists.
        best.ok_or_else(|| crate::error::RetenerError::empty_input("tuning attempts"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.booster.save(path)
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.booster.load(path)
    }
}

impl<B: BoosterRuntime> Predictor for GbtModel<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> &ModelData {
        &self.data
    }

    fn predict_entry(&self, entry: &RetentionEntry) -> Result<f32> {
        let row = self.kind().input_row(entry, &self.data)?;
        self.booster.predict_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::toy::ToyChemService;
    use crate::chem::ChemService;
    use crate::dataset::RetentionDataset;
    use crate::descriptors::DescriptorCache;
    use crate::model::runtime::LinearBooster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn gbt_data() -> ModelData {
        let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
        let train = RetentionDataset::new(vec![
            RetentionEntry::new("C", 100.0, 0),
            RetentionEntry::new("CC", 200.0, 0),
            RetentionEntry::new("CCC", 300.0, 1),
            RetentionEntry::new("CCCC", 400.0, 0),
            RetentionEntry::new("CCCCC", 500.0, 2),
            RetentionEntry::new("CCCCCC", 600.0, 0),
        ]);
        let validation = RetentionDataset::new(vec![
            RetentionEntry::new("CCCCCCC", 700.0, 0),
            RetentionEntry::new("CCCCCCCC", 800.0, 1),
        ]);

        let mut cache = DescriptorCache::precomputed(vec!["d0".into(), "d1".into()]);
        let compounds: HashSet<String> = train
            .entries()
            .iter()
            .chain(validation.entries())
            .map(|e| e.smiles().to_string())
            .collect();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        cache.precompute(&compounds, true, &chem, &pool).unwrap();
        ModelData::from_parts(train, validation, chem, Some(Arc::new(cache))).unwrap()
    }

    #[test]
    fn test_train_default_produces_finite_metrics() {
        let mut model = GbtModel::new("gbt", gbt_data(), LinearBooster::new());
        let metrics = model.train_default().unwrap();
        assert!(metrics.rmse.is_finite());
        assert!(metrics.mae >= 0.0);
    }

    #[test]
    fn test_predicts_only_after_training() {
        let mut model = GbtModel::new("gbt", gbt_data(), LinearBooster::new());
        assert!(model.predict_single("CCC", 0).is_err());
        model.train_default().unwrap();
        assert!(model.predict_single("CCC", 0).unwrap().is_finite());
    }

    #[test]
    fn test_tune_returns_best_by_mae() {
        let mut model = GbtModel::new("gbt", gbt_data(), LinearBooster::new());
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = dir.path().join("best.json");
        let mut rng = StdRng::seed_from_u64(9);
        let (params, best) = model.tune(8, &mut rng, &checkpoint).unwrap();
        assert!(checkpoint.exists());
        assert!(params.contains_key("lambda"));

        // Refitting with the returned parameters reproduces the score.
        let mut refit = GbtModel::new("gbt", gbt_data(), LinearBooster::new());
        let metrics = refit.train(&params).unwrap();
        assert!((metrics.mae - best.mae).abs() < 1e-3);
    }

    #[test]
    fn test_tune_rejects_zero_attempts() {
        let mut model = GbtModel::new("gbt", gbt_data(), LinearBooster::new());
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        assert!(model.tune(0, &mut rng, &dir.path().join("b.json")).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut model = GbtModel::new("gbt", gbt_data(), LinearBooster::new());
        model.train_default().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gbt.json");
        model.save(&path).unwrap();

        let mut restored = GbtModel::new("gbt", gbt_data(), LinearBooster::new());
        restored.load(&path).unwrap();
        assert_eq!(
            restored.predict_single("CCC", 1).unwrap(),
            model.predict_single("CCC", 1).unwrap()
        );
    }
}
