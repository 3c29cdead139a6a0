//! Training orchestration: the iterative training loop with best-state
//! checkpointing, and compound-aware cross-validation.

pub mod search;

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;

use crate::chem::ChemService;
use crate::dataset::{RetentionDataset, RetentionEntry};
use crate::descriptors::DescriptorCache;
use crate::error::{RetenerError, Result};
use crate::metrics::{self, Metrics};
use crate::model::neural::NeuralModel;
use crate::model::runtime::GraphRuntime;
use crate::model::{ModelData, Predictor};

/// A model trained by repeated mini-batch iterations.
pub trait IterativeModel: Predictor {
    /// Runs one training step and returns its loss.
    fn train_iteration(&mut self, batch_size: usize) -> Result<f32>;

    fn save(&self, path: &Path) -> Result<()>;

    fn load(&mut self, path: &Path) -> Result<()>;
}

impl<R: GraphRuntime> IterativeModel for NeuralModel<R> {
    fn train_iteration(&mut self, batch_size: usize) -> Result<f32> {
        NeuralModel::train_iteration(self, batch_size)
    }

    fn save(&self, path: &Path) -> Result<()> {
        NeuralModel::save(self, path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        NeuralModel::load(self, path)
    }
}

/// Knobs of [`train_loop`].
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Total training iterations.
    pub iterations: usize,
    /// Print the batch loss every this many iterations.
    pub print_every: usize,
    /// Validate (and maybe checkpoint) every this many iterations.
    pub validate_every: usize,
    pub batch_size: usize,
    /// Where the best-so-far model state is written. Without it, no
    /// checkpointing happens and `load_best` has no effect.
    pub best_checkpoint: Option<PathBuf>,
    /// Restore the best checkpoint after the final iteration.
    pub load_best: bool,
    /// Append validation log lines here in addition to stdout.
    pub log_file: Option<PathBuf>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            print_every: 100,
            validate_every: 1_000,
            batch_size: 32,
            best_checkpoint: None,
            load_best: false,
            log_file: None,
        }
    }
}

/// Result of a [`train_loop`] run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Iteration whose validation MAE was lowest.
    pub best_iteration: usize,
    pub best_metrics: Metrics,
}

fn append_log(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Drives an [`IterativeModel`] for a fixed number of iterations,
/// tracking the best validation MAE and optionally checkpointing and
/// restoring that state.
///
/// # Errors
/// Fails on zero `iterations`/`validate_every`/`batch_size`, and when
/// training, validation, or checkpoint I/O fails.
pub fn train_loop<M: IterativeModel>(model: &mut M, options: &TrainOptions) -> Result<TrainOutcome> {
    if options.iterations == 0 || options.validate_every == 0 || options.batch_size == 0 {
        return Err(RetenerError::from(
            "iterations, validate_every and batch_size must be positive",
        ));
    }

    let mut best: Option<TrainOutcome> = None;
    for i in 1..=options.iterations {
        let loss = model.train_iteration(options.batch_size)?;
        if options.print_every > 0 && i % options.print_every == 0 {
            println!("Training iteration {i} ; Loss: {loss}");
        }
        if i % options.validate_every == 0 {
            let metrics = model.validate(None)?;
            let line = format!("Training iteration {i} ; Accuracy: {metrics}");
            println!("{line}");
            if let Some(log) = &options.log_file {
                append_log(log, &line)?;
            }
            let improved = best.as_ref().map_or(true, |b| metrics.mae < b.best_metrics.mae);
            if improved {
                if let Some(checkpoint) = &options.best_checkpoint {
                    model.save(checkpoint)?;
                }
                best = Some(TrainOutcome { best_iteration: i, best_metrics: metrics });
            }
        }
    }

    let outcome = match best {
        Some(outcome) => outcome,
        // Validation never ran; score the final state instead.
        None => TrainOutcome {
            best_iteration: options.iterations,
            best_metrics: model.validate(None)?,
        },
    };
    if options.load_best {
        if let Some(checkpoint) = &options.best_checkpoint {
            model.load(checkpoint)?;
        }
    }
    Ok(outcome)
}

/// Splits a dataset into `n_folds` compound-disjoint folds. The first
/// `n_folds - 1` folds hold `round(distinct / n_folds)` compounds
/// each; the last fold takes the remainder.
///
/// # Errors
/// Fails when `n_folds < 2` or the dataset has too few compounds.
pub fn cv_split<R: Rng>(
    dataset: &RetentionDataset,
    n_folds: usize,
    rng: &mut R,
) -> Result<Vec<RetentionDataset>> {
    if n_folds < 2 {
        return Err(RetenerError::from("cross-validation needs at least 2 folds"));
    }
    let distinct = dataset.identities_literal().len();
    let per_fold = (distinct as f32 / n_folds as f32).round() as usize;
    if per_fold == 0 {
        return Err(RetenerError::Other(format!(
            "cannot split {distinct} compounds into {n_folds} folds"
        )));
    }

    let mut folds = Vec::with_capacity(n_folds);
    let mut rest = dataset.clone();
    for _ in 0..n_folds - 1 {
        let (fold, remainder) = rest.split_by_identity(per_fold, rng)?;
        folds.push(fold);
        rest = remainder;
    }
    folds.push(rest);
    Ok(folds)
}

/// Per-fold and pooled cross-validation results.
#[derive(Debug, Clone)]
pub struct CvReport {
    pub fold_metrics: Vec<Metrics>,
    /// Metrics over the concatenated per-record errors of all folds.
    pub pooled: Metrics,
}

/// Compound-disjoint cross-validation.
///
/// Each fold in turn becomes the test set. The remaining records are
/// filtered against the test fold under both leakage notions, a
/// one-compound validation set is carved out for training-time
/// monitoring, and `train_fold` must return a model trained on the
/// resulting [`ModelData`]. Fold metrics are computed on the held-out
/// fold; the pooled result concatenates per-record errors, so folds
/// with more records weigh more.
///
/// With `predictions_file` set, one `smiles truth predicted` line per
/// test record is written, a `Subset{i} {metrics}` line after each
/// fold, and a final `CV {metrics}` line for the pooled result.
///
/// # Errors
/// Fails when splitting, training, or prediction fails on any fold.
pub fn cross_validation<R, F>(
    dataset: &RetentionDataset,
    n_folds: usize,
    rng: &mut R,
    chem: &Arc<dyn ChemService>,
    descriptors: Option<Arc<DescriptorCache>>,
    predictions_file: Option<&Path>,
    mut train_fold: F,
) -> Result<CvReport>
where
    R: Rng,
    F: FnMut(ModelData) -> Result<Box<dyn Predictor>>,
{
    let folds = cv_split(dataset, n_folds, rng)?;
    let mut out = match predictions_file {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    let mut fold_metrics = Vec::with_capacity(folds.len());
    let mut all_deviations = Vec::new();
    let mut all_percentage_errors = Vec::new();
    for (i, test) in folds.iter().enumerate() {
        let remaining = dataset
            .filter_out(test, crate::chem::IdentityNotion::CanonicalStereo, chem.as_ref())?
            .filter_out(test, crate::chem::IdentityNotion::StructureKey, chem.as_ref())?;
        let (validation, train) = remaining.split_by_identity(1, rng)?;
        let data = ModelData::from_parts(train, validation, Arc::clone(chem), descriptors.clone())?;
        let model = train_fold(data)?;

        let predictions = model.predict(test)?;
        let targets: Vec<f32> = test.entries().iter().map(RetentionEntry::retention).collect();
        let metrics = Metrics::compute(&predictions, &targets)?;
        if let Some(out) = out.as_mut() {
            crate::model::write_predictions(out, test, &predictions)?;
            writeln!(out, "Subset{i} {metrics}")?;
        }
        all_deviations.extend(metrics::deviations(&predictions, &targets));
        all_percentage_errors.extend(metrics::percentage_errors(&predictions, &targets));
        fold_metrics.push(metrics);
    }

    let pooled = Metrics::from_errors(&all_deviations, &all_percentage_errors);
    if let Some(out) = out.as_mut() {
        writeln!(out, "\nCV {pooled}")?;
    }
    Ok(CvReport { fold_metrics, pooled })
}
