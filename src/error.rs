//! Error types for Retener operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Retener operations.
///
/// Covers structure-identity failures, train/test leakage, cache misses,
/// dimension mismatches, and persistence problems.
///
/// # Examples
///
/// ```
/// use retener::error::RetenerError;
///
/// let err = RetenerError::Leakage {
///     overlap: 3,
///     notion: "canonical SMILES (stereo)".to_string(),
/// };
/// assert!(err.to_string().contains("leakage"));
/// ```
#[derive(Debug)]
pub enum RetenerError {
    /// A structure string could not be interpreted or canonicalized.
    Identity {
        /// The raw structure string as received
        raw: String,
        /// What went wrong
        reason: String,
    },

    /// Training and evaluation sets share compounds.
    Leakage {
        /// Number of shared identities
        overlap: usize,
        /// Identity notion under which the overlap was found
        notion: String,
    },

    /// Feature vector length doesn't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Identity absent from a precomputed-only descriptor cache.
    CacheMiss {
        /// Identity that was looked up
        identity: String,
    },

    /// Linear system is singular (non-invertible).
    SingularMatrix {
        /// Determinant value (close to zero)
        det: f64,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Predictor used before training.
    NotFitted {
        /// What was attempted
        operation: String,
    },

    /// Invalid or corrupt file format.
    FormatError {
        /// Error description
        message: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for RetenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetenerError::Identity { raw, reason } => {
                write!(f, "Cannot resolve structure identity for {raw:?}: {reason}")
            }
            RetenerError::Leakage { overlap, notion } => {
                write!(
                    f,
                    "Compound leakage between train and evaluation sets: {overlap} shared under {notion}"
                )
            }
            RetenerError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            RetenerError::CacheMiss { identity } => {
                write!(
                    f,
                    "Descriptor cache miss for {identity:?} (on-demand computation disabled)"
                )
            }
            RetenerError::SingularMatrix { det } => {
                write!(
                    f,
                    "Singular matrix detected: determinant = {det}, cannot invert"
                )
            }
            RetenerError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            RetenerError::NotFitted { operation } => {
                write!(f, "Model not fitted: cannot {operation}")
            }
            RetenerError::FormatError { message } => {
                write!(f, "Invalid file format: {message}")
            }
            RetenerError::Io(e) => write!(f, "I/O error: {e}"),
            RetenerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            RetenerError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RetenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetenerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RetenerError {
    fn from(err: std::io::Error) -> Self {
        RetenerError::Io(err)
    }
}

impl From<&str> for RetenerError {
    fn from(msg: &str) -> Self {
        RetenerError::Other(msg.to_string())
    }
}

impl From<String> for RetenerError {
    fn from(msg: String) -> Self {
        RetenerError::Other(msg)
    }
}

impl RetenerError {
    /// Create an identity error.
    #[must_use]
    pub fn identity(raw: &str, reason: &str) -> Self {
        Self::Identity {
            raw: raw.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a dimension mismatch error with descriptive context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create a file format error.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError {
            message: message.into(),
        }
    }

    /// Create an empty input error.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::Other(format!("empty input: {context}"))
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, RetenerError>;
