//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use retener::prelude::*;
//! ```

pub use crate::chem::toy::ToyChemService;
pub use crate::chem::{ChemService, FingerprintKind, IdentityNotion};
pub use crate::dataset::{Aggregation, RetentionDataset, RetentionEntry};
pub use crate::descriptors::DescriptorCache;
pub use crate::error::{Result, RetenerError};
pub use crate::metrics::Metrics;
pub use crate::model::gbt::GbtModel;
pub use crate::model::leaf::LeafKind;
pub use crate::model::linear::LinearHead;
pub use crate::model::neural::NeuralModel;
pub use crate::model::runtime::{BoosterRuntime, GraphRuntime, LinearBooster, SgdRegressor};
pub use crate::model::stacking::StackingModel;
pub use crate::model::{ModelData, Predictor};
pub use crate::train::search::{HyperParam, ParamSet, ParamSpace, ParamValue};
pub use crate::train::{cross_validation, cv_split, train_loop, CvReport, TrainOptions};
