//! Retener: gas-chromatographic retention index prediction in Rust.
//!
//! Retener turns SMILES/retention datasets into trained prediction
//! models: compound-aware dataset handling, a scaled descriptor cache,
//! leaf models over pluggable runtimes, and a stacking ensemble with a
//! linear meta-learner, plus the training loop and cross-validation
//! machinery around them.
//!
//! # Quick Start
//!
//! ```
//! use retener::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::sync::Arc;
//!
//! let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
//! let dataset = RetentionDataset::new(
//!     (1..=10)
//!         .map(|i| RetentionEntry::new(&"C".repeat(i), 100.0 * i as f32, 0))
//!         .collect(),
//! );
//!
//! // Compound-disjoint train/validation split, then a trainable model.
//! let mut rng = StdRng::seed_from_u64(42);
//! let data = ModelData::split(&dataset, 0.3, &mut rng, chem, None).unwrap();
//! let mut model = NeuralModel::new(
//!     "cnn",
//!     data,
//!     LeafKind::SmilesCnn,
//!     SgdRegressor::new(0.001),
//! )
//! .unwrap();
//!
//! for _ in 0..100 {
//!     model.train_iteration(4).unwrap();
//! }
//! let metrics = model.validate(None).unwrap();
//! assert!(metrics.mae.is_finite());
//! ```
//!
//! # Modules
//!
//! - [`chem`]: Chemistry service contract, SMILES tokenization, scaling
//! - [`columns`]: Chromatographic column catalog and encodings
//! - [`dataset`]: Identity-aware retention datasets and splits
//! - [`descriptors`]: Precomputed, min-max scaled descriptor cache
//! - [`metrics`]: The five accuracy measures and their string form
//! - [`model`]: Model data, the [`Predictor`](model::Predictor) contract, leaf and stacking models
//! - [`train`]: Training loop, cross-validation, hyperparameter search
//! - [`error`]: Crate-wide error type

pub mod chem;
pub mod columns;
pub mod dataset;
pub mod descriptors;
pub mod error;
pub mod metrics;
pub mod model;
pub mod prelude;
pub mod train;

pub use error::{Result, RetenerError};
