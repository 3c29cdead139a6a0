//! Deterministic in-process chemistry backend for tests and examples.
//!
//! `ToyChemService` implements [`ChemService`](super::ChemService) over a
//! simplified SMILES-like grammar with no external toolkit. Canonical
//! forms, keys, descriptors, and fingerprints are pure functions of the
//! input string, so pipelines built on it are fully reproducible.

use std::collections::HashSet;
use std::time::Duration;

use crate::chem::{
    ChemService, FingerprintKind, DEPICTION_CHANNELS, DEPICTION_GRID, DEPICTION_LEN, TOKENS,
};
use crate::error::{RetenerError, Result};

/// Characters carrying stereochemistry in the toy grammar. Stripped by
/// stereo-insensitive canonicalization.
const STEREO_MARKS: [char; 3] = ['@', '/', '\\'];

/// Number of functional-group counters reported by [`ToyChemService`].
pub const TOY_FUNC_GROUPS: usize = 10;

/// Deterministic chemistry stand-in.
///
/// Canonicalization trims whitespace and validates symbols; the
/// stereo-insensitive form additionally drops stereo marks. Descriptor
/// values are hash-derived from the molecule and feature name; a feature
/// whose name ends in `_fail` yields NaN, which lets tests exercise the
/// missing-feature paths.
///
/// # Examples
///
/// ```
/// use retener::chem::{ChemService, IdentityNotion};
/// use retener::chem::toy::ToyChemService;
///
/// let chem = ToyChemService::new();
/// let canon = chem.canonical(" C/C=C/C ", false).unwrap();
/// assert_eq!(canon, "CC=CC");
/// assert_eq!(chem.canonical(&canon, false).unwrap(), canon);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToyChemService {
    latency: Option<Duration>,
}

impl ToyChemService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every descriptor computation. Used to test
    /// the per-molecule timeout path.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn validate(raw: &str) -> Result<&str> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RetenerError::identity(raw, "empty structure string"));
        }
        if trimmed.chars().all(|c| STEREO_MARKS.contains(&c)) {
            return Err(RetenerError::identity(raw, "stereo marks only, no structure"));
        }
        let allowed: HashSet<char> = TOKENS.iter().chain(STEREO_MARKS.iter()).copied().collect();
        for c in trimmed.chars() {
            if !allowed.contains(&c) {
                return Err(RetenerError::identity(
                    raw,
                    &format!("unsupported symbol {c:?}"),
                ));
            }
        }
        Ok(trimmed)
    }
}

/// FNV-1a, the only hashing the toy backend needs.
fn hash64(parts: &[&str]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for part in parts {
        for b in part.as_bytes() {
            h ^= u64::from(*b);
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        h ^= 0xff;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

impl ChemService for ToyChemService {
    fn canonical(&self, raw: &str, stereochemistry: bool) -> Result<String> {
        let trimmed = Self::validate(raw)?;
        if stereochemistry {
            Ok(trimmed.to_string())
        } else {
            Ok(trimmed.chars().filter(|c| !STEREO_MARKS.contains(c)).collect())
        }
    }

    fn structure_key(&self, raw: &str) -> Result<String> {
        let canon = self.canonical(raw, false)?;
        let h = hash64(&[&canon]);
        Ok(format!("TOY-{:08X}{:08X}", h >> 32, h & 0xFFFF_FFFF))
    }

    fn descriptors(&self, smiles: &str, names: &[String]) -> Result<Vec<f32>> {
        let canon = self.canonical(smiles, false)?;
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        Ok(names
            .iter()
            .map(|name| {
                if name.ends_with("_fail") {
                    f32::NAN
                } else {
                    let h = hash64(&[&canon, name]);
                    (h % 10_000) as f32 / 100.0
                }
            })
            .collect())
    }

    fn fingerprints(&self, smiles: &str, kind: FingerprintKind) -> Result<Vec<f32>> {
        let canon = self.canonical(smiles, false)?;
        let len = kind.len();
        let mut bits = vec![0.0f32; len];
        if len == 0 {
            return Ok(bits);
        }
        // Each 3-gram of the canonical string sets one bit; additive kinds
        // count occurrences instead.
        let additive = matches!(
            kind,
            FingerprintKind::AdditiveCircular4x1024 | FingerprintKind::AdditiveCircular6x1024
        );
        let chars: Vec<char> = canon.chars().collect();
        for window in chars.windows(3.min(chars.len()).max(1)) {
            let gram: String = window.iter().collect();
            let idx = (hash64(&[&gram, &format!("{kind:?}")]) as usize) % len;
            if additive {
                bits[idx] += 1.0;
            } else {
                bits[idx] = 1.0;
            }
        }
        Ok(bits)
    }

    fn func_groups(&self, smiles: &str) -> Result<Vec<f32>> {
        let canon = self.canonical(smiles, false)?;
        let count = |pred: fn(char) -> bool| canon.chars().filter(|&c| pred(c)).count() as f32;
        let mut groups = vec![0.0f32; TOY_FUNC_GROUPS];
        groups[0] = count(|c| c == 'O' || c == 'o');
        groups[1] = count(|c| c == 'N' || c == 'n');
        groups[2] = count(|c| c == '=');
        groups[3] = count(|c| c == '#');
        groups[4] = count(|c| c.is_ascii_digit());
        groups[5] = count(|c| c.is_ascii_lowercase());
        groups[6] = count(|c| c == 'S');
        groups[7] = count(|c| c == 'F' || c == 'I');
        groups[8] = count(|c| c == '(');
        groups[9] = canon.len() as f32;
        Ok(groups)
    }

    fn depiction(&self, smiles: &str) -> Result<Vec<f32>> {
        let canon = self.canonical(smiles, false)?;
        let chars: Vec<char> = canon.chars().collect();
        if chars.len() > DEPICTION_GRID {
            return Err(RetenerError::identity(smiles, "molecule too large to depict"));
        }
        let mut grid = vec![0.0f32; DEPICTION_LEN];
        // Zigzag walk centered on the grid, one cell per symbol. Bond
        // symbols land on the bond channels, everything else on an
        // atom channel picked by hash.
        let plane = DEPICTION_GRID * DEPICTION_GRID;
        let start = (DEPICTION_GRID - chars.len()) / 2;
        let mid = DEPICTION_GRID / 2;
        for (i, &c) in chars.iter().enumerate() {
            let channel = match c {
                '-' => DEPICTION_CHANNELS - 3,
                '=' => DEPICTION_CHANNELS - 2,
                '#' => DEPICTION_CHANNELS - 1,
                _ => (hash64(&[&c.to_string()]) % 26) as usize,
            };
            let (x, y) = (start + i, mid + i % 2);
            grid[channel * plane + x * DEPICTION_GRID + y] += 1.0;
        }
        Ok(grid)
    }
}
