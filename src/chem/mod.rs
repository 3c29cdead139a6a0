//! Chemistry service contract and SMILES utilities.
//!
//! The pipeline never computes chemistry itself: canonicalization,
//! structure keys, molecular descriptors, fingerprints, and functional
//! group counts are obtained from an injected [`ChemService`]
//! implementation. The crate ships a deterministic in-process service
//! ([`toy::ToyChemService`]) for tests and examples; production backends
//! wrap an external cheminformatics toolkit.
//!
//! This module also carries the SMILES token table and the tokenizer used
//! by the convolutional leaf input adapter.

pub mod toy;

use crate::error::{RetenerError, Result};

/// Symbols a SMILES string may contain for tokenization. The space must be
/// first: index 0 is the padding token.
///
/// Any change here invalidates previously trained sequence models.
pub const TOKENS: [char; 35] = [
    ' ', 'C', 'c', 'N', 'n', 'H', 'O', 'o', 'F', 'B', 'l', 'r', 'S', 'i', '+', '(', ')', '[', ']',
    '-', '=', '#', '1', '2', '3', '4', '5', '6', '7', '8', '9', 's', 'P', '%', 'I',
];

/// Number of distinct tokens (`TOKENS.len()`).
pub const SMILES_TOKENS: usize = TOKENS.len();

/// Fixed tokenized length. Longer SMILES strings are rejected; shorter
/// ones are padded with the space token.
pub const SMILES_LEN: usize = 250;

/// Spatial edge of the 2D structure sketch, in grid cells.
pub const DEPICTION_GRID: usize = 130;

/// Channels of the 2D structure sketch: one per atom type plus one per
/// bond order.
pub const DEPICTION_CHANNELS: usize = 29;

/// Flattened length of a depiction tensor,
/// `DEPICTION_CHANNELS x DEPICTION_GRID x DEPICTION_GRID`.
pub const DEPICTION_LEN: usize = DEPICTION_CHANNELS * DEPICTION_GRID * DEPICTION_GRID;

/// Which string is used as a compound's identity for grouping, splitting,
/// overlap counting, and cache keys.
///
/// Two records can agree under one notion and disagree under another, so
/// every identity-keyed operation takes the notion explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityNotion {
    /// The SMILES string exactly as stored, no chemistry involved.
    Literal,
    /// Canonical SMILES with stereochemistry stripped.
    Canonical,
    /// Canonical SMILES preserving stereochemistry.
    CanonicalStereo,
    /// Structure-derived hash key (InChI-key style), stereo-insensitive.
    StructureKey,
}

impl IdentityNotion {
    /// Human-readable name used in error messages and logs.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            IdentityNotion::Literal => "literal SMILES",
            IdentityNotion::Canonical => "canonical SMILES",
            IdentityNotion::CanonicalStereo => "canonical SMILES (stereo)",
            IdentityNotion::StructureKey => "structure key",
        }
    }
}

/// Supported molecular fingerprint families.
///
/// Additive circular fingerprints count substructure occurrences instead
/// of flagging presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerprintKind {
    None,
    Maccs,
    Circular4x512,
    Circular4x1024,
    Circular6x1024,
    Circular6x4096,
    AdditiveCircular4x1024,
    AdditiveCircular6x1024,
    Lingo,
    PubChem,
    Klekota,
}

impl FingerprintKind {
    /// Bit width of the fingerprint vector.
    #[must_use]
    pub fn len(self) -> usize {
        match self {
            FingerprintKind::None => 0,
            FingerprintKind::Maccs => 166,
            FingerprintKind::Circular4x512 => 512,
            FingerprintKind::Circular4x1024
            | FingerprintKind::Circular6x1024
            | FingerprintKind::AdditiveCircular4x1024
            | FingerprintKind::AdditiveCircular6x1024 => 1024,
            FingerprintKind::Circular6x4096 => 4096,
            FingerprintKind::Lingo => 1024,
            FingerprintKind::PubChem => 881,
            FingerprintKind::Klekota => 4860,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// External chemistry backend.
///
/// Implementations must be deterministic for a given input: the same
/// string always yields the same canonical form, key, and features.
/// Per-feature descriptor failures are reported in-band as NaN entries,
/// not as errors; an `Err` means the molecule itself could not be
/// interpreted.
pub trait ChemService: Send + Sync {
    /// Canonical SMILES form of `raw`, with or without stereochemistry.
    ///
    /// Must be idempotent: canonicalizing a canonical string returns it
    /// unchanged.
    ///
    /// # Errors
    /// Returns [`RetenerError::Identity`] when `raw` cannot be parsed.
    fn canonical(&self, raw: &str, stereochemistry: bool) -> Result<String>;

    /// Stereo-insensitive structure-unique key (InChI-key analog).
    ///
    /// # Errors
    /// Returns [`RetenerError::Identity`] when `raw` cannot be parsed.
    fn structure_key(&self, raw: &str) -> Result<String>;

    /// Raw (unscaled) molecular descriptors, one per requested name, in
    /// request order. A NaN entry marks a feature that failed for this
    /// molecule.
    ///
    /// # Errors
    /// Returns [`RetenerError::Identity`] when `smiles` cannot be parsed.
    fn descriptors(&self, smiles: &str, names: &[String]) -> Result<Vec<f32>>;

    /// Molecular fingerprint of the given kind, length `kind.len()`.
    ///
    /// # Errors
    /// Returns [`RetenerError::Identity`] when `smiles` cannot be parsed.
    fn fingerprints(&self, smiles: &str, kind: FingerprintKind) -> Result<Vec<f32>>;

    /// Functional group occurrence counts, fixed length for all molecules.
    ///
    /// # Errors
    /// Returns [`RetenerError::Identity`] when `smiles` cannot be parsed.
    fn func_groups(&self, smiles: &str) -> Result<Vec<f32>>;

    /// Image-like 2D structure sketch for convolutional models: atoms
    /// and bonds rasterized onto a [`DEPICTION_GRID`]-square grid with
    /// one channel per atom/bond type, centered, flattened
    /// channel-major to [`DEPICTION_LEN`]. Stereo-insensitive.
    ///
    /// # Errors
    /// Returns [`RetenerError::Identity`] when `smiles` cannot be
    /// parsed or the molecule does not fit the grid.
    fn depiction(&self, smiles: &str) -> Result<Vec<f32>>;
}

/// Converts a SMILES string into token indices for sequence models.
///
/// Result is always `SMILES_LEN` long, padded with 0 (the space token).
///
/// # Errors
/// Fails when the string exceeds [`SMILES_LEN`] or contains a symbol
/// absent from [`TOKENS`].
pub fn tokenize(s: &str) -> Result<Vec<usize>> {
    if s.chars().count() > SMILES_LEN {
        return Err(RetenerError::identity(s, "SMILES string too long"));
    }
    let mut result = vec![0usize; SMILES_LEN];
    for (i, c) in s.chars().enumerate() {
        match TOKENS.iter().position(|&t| t == c) {
            Some(j) => result[i] = j,
            None => {
                return Err(RetenerError::identity(s, &format!("unknown symbol {c:?}")));
            }
        }
    }
    Ok(result)
}

/// Inverse of [`tokenize`]. The result carries trailing padding spaces;
/// callers usually want `.trim()`.
#[must_use]
pub fn tokens_to_smiles(tokens: &[usize]) -> String {
    tokens.iter().map(|&t| TOKENS[t]).collect()
}

/// One-hot token grid for convolutional inputs, row-major
/// `SMILES_LEN x SMILES_TOKENS`, flattened.
///
/// # Errors
/// Same failure modes as [`tokenize`].
pub fn token_grid(s: &str) -> Result<Vec<f32>> {
    let tokens = tokenize(s)?;
    let mut grid = vec![0.0f32; SMILES_LEN * SMILES_TOKENS];
    for (i, &t) in tokens.iter().enumerate() {
        grid[i * SMILES_TOKENS + t] = 1.0;
    }
    Ok(grid)
}

/// Rescales each value to `[0, 1]`: `(v - min) / (max - min)`.
///
/// A zero-width or infinite range maps the value to 0. NaN values (and
/// values under a NaN range) stay NaN, so missing-feature sentinels
/// survive scaling.
#[must_use]
pub fn scale_min_max(values: &[f32], min: &[f32], max: &[f32]) -> Vec<f32> {
    values
        .iter()
        .zip(min.iter().zip(max.iter()))
        .map(|(&v, (&lo, &hi))| {
            let width = hi - lo;
            if width == 0.0 || width.is_infinite() {
                0.0
            } else {
                (v - lo) / width
            }
        })
        .collect()
}

/// Replaces NaN entries with zero.
#[must_use]
pub fn nans_to_zero(values: &[f32]) -> Vec<f32> {
    values
        .iter()
        .map(|&v| if v.is_nan() { 0.0 } else { v })
        .collect()
}

/// Number of NaN entries in a feature vector.
#[must_use]
pub fn count_nans(values: &[f32]) -> usize {
    values.iter().filter(|v| v.is_nan()).count()
}
