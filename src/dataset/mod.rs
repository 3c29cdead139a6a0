//! Retention datasets and identity-aware set operations.
//!
//! A dataset is an ordered list of [`RetentionEntry`] records. Several
//! records may describe the same compound (measured on different columns
//! or reported by different sources), so splitting, overlap counting,
//! filtering, and grouping are all performed per *compound identity*
//! under an explicitly chosen [`IdentityNotion`], never per record.
//!
//! Splits and filters return new datasets and leave the receiver
//! untouched.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chem::{ChemService, IdentityNotion};
use crate::columns::NO_COLUMN;
use crate::error::{RetenerError, Result};

/// One retention measurement: a structure, a retention index, and the
/// column it was measured on ([`NO_COLUMN`] when the column context is
/// absent).
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionEntry {
    smiles: String,
    retention: f32,
    column: i32,
}

impl RetentionEntry {
    /// Entry with the structure string stored literally (trimmed, not
    /// canonicalized).
    #[must_use]
    pub fn new(smiles: &str, retention: f32, column: i32) -> Self {
        Self {
            smiles: smiles.trim().to_string(),
            retention,
            column,
        }
    }

    /// Entry without column context.
    #[must_use]
    pub fn without_column(smiles: &str, retention: f32) -> Self {
        Self::new(smiles, retention, NO_COLUMN)
    }

    /// Entry with the structure canonicalized on construction.
    ///
    /// # Errors
    /// Propagates identity failures from the chemistry service.
    pub fn canonical(
        smiles: &str,
        retention: f32,
        column: i32,
        stereochemistry: bool,
        chem: &dyn ChemService,
    ) -> Result<Self> {
        Ok(Self::new(
            &chem.canonical(smiles, stereochemistry)?,
            retention,
            column,
        ))
    }

    #[must_use]
    pub fn smiles(&self) -> &str {
        &self.smiles
    }

    #[must_use]
    pub fn retention(&self) -> f32 {
        self.retention
    }

    #[must_use]
    pub fn column(&self) -> i32 {
        self.column
    }
}

/// How labels of one compound's records are reduced during
/// [`RetentionDataset::aggregate_by_identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Mean,
    Median,
}

/// Ordered collection of retention measurements.
///
/// # Examples
///
/// ```
/// use retener::dataset::{RetentionDataset, RetentionEntry};
///
/// let data = RetentionDataset::new(vec![
///     RetentionEntry::new("CCC", 300.0, 0),
///     RetentionEntry::new("CCCC", 400.0, 1),
/// ]);
/// assert_eq!(data.len(), 2);
/// assert_eq!(data.smiles(1), "CCCC");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetentionDataset {
    data: Vec<RetentionEntry>,
}

impl RetentionDataset {
    #[must_use]
    pub fn new(data: Vec<RetentionEntry>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn entry(&self, i: usize) -> &RetentionEntry {
        &self.data[i]
    }

    #[must_use]
    pub fn entries(&self) -> &[RetentionEntry] {
        &self.data
    }

    #[must_use]
    pub fn smiles(&self, i: usize) -> &str {
        self.data[i].smiles()
    }

    #[must_use]
    pub fn retention(&self, i: usize) -> f32 {
        self.data[i].retention()
    }

    #[must_use]
    pub fn column(&self, i: usize) -> i32 {
        self.data[i].column()
    }

    /// In-place random permutation. No records are lost or duplicated.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.data.shuffle(rng);
    }

    /// The identity string of record `i` under the given notion.
    ///
    /// # Errors
    /// Propagates identity failures from the chemistry service.
    pub fn identity(
        &self,
        i: usize,
        notion: IdentityNotion,
        chem: &dyn ChemService,
    ) -> Result<String> {
        entry_identity(&self.data[i], notion, chem)
    }

    /// Distinct compound identities under the given notion.
    ///
    /// # Errors
    /// Fails on the first record whose identity cannot be resolved.
    pub fn identity_set(
        &self,
        notion: IdentityNotion,
        chem: &dyn ChemService,
    ) -> Result<HashSet<String>> {
        let mut set = HashSet::new();
        for entry in &self.data {
            set.insert(entry_identity(entry, notion, chem)?);
        }
        Ok(set)
    }

    /// Number of distinct identities shared with `other` under the given
    /// notion. Zero means the two datasets are compound-disjoint.
    ///
    /// # Errors
    /// Fails when any identity in either dataset cannot be resolved.
    pub fn count_overlap(
        &self,
        other: &RetentionDataset,
        notion: IdentityNotion,
        chem: &dyn ChemService,
    ) -> Result<usize> {
        let mine = self.identity_set(notion, chem)?;
        let theirs = other.identity_set(notion, chem)?;
        Ok(mine.intersection(&theirs).count())
    }

    /// Splits off all records of `n_compounds` randomly chosen compounds
    /// (literal identity). Returns `(split, rest)`; every compound's
    /// records land entirely on one side. Both halves are shuffled.
    ///
    /// # Errors
    /// Fails when `n_compounds` exceeds the number of distinct compounds.
    pub fn split_by_identity<R: Rng>(
        &self,
        n_compounds: usize,
        rng: &mut R,
    ) -> Result<(RetentionDataset, RetentionDataset)> {
        let mut compounds: Vec<&str> = self
            .identities_literal()
            .into_iter()
            .collect::<Vec<_>>();
        compounds.sort_unstable(); // set order is unstable across runs
        if n_compounds > compounds.len() {
            return Err(RetenerError::Other(format!(
                "cannot split {n_compounds} compounds out of {}",
                compounds.len()
            )));
        }
        compounds.shuffle(rng);
        let chosen: HashSet<&str> = compounds[..n_compounds].iter().copied().collect();

        let mut split = Vec::new();
        let mut rest = Vec::new();
        for entry in &self.data {
            if chosen.contains(entry.smiles()) {
                split.push(entry.clone());
            } else {
                rest.push(entry.clone());
            }
        }
        split.shuffle(rng);
        rest.shuffle(rng);
        Ok((RetentionDataset::new(split), RetentionDataset::new(rest)))
    }

    /// Like [`split_by_identity`](Self::split_by_identity), sized as a
    /// fraction of the distinct compound count (rounded).
    ///
    /// # Errors
    /// Same failure modes as [`split_by_identity`](Self::split_by_identity).
    pub fn split_by_identity_fraction<R: Rng>(
        &self,
        fraction: f32,
        rng: &mut R,
    ) -> Result<(RetentionDataset, RetentionDataset)> {
        let n = (fraction * self.identities_literal().len() as f32).round() as usize;
        self.split_by_identity(n, rng)
    }

    /// Record-based split: the first `n` records versus the remainder, in
    /// order. Compounds may end up on both sides.
    #[must_use]
    pub fn split_records(&self, n: usize) -> (RetentionDataset, RetentionDataset) {
        let n = n.min(self.data.len());
        (
            RetentionDataset::new(self.data[..n].to_vec()),
            RetentionDataset::new(self.data[n..].to_vec()),
        )
    }

    /// Records whose identity under `notion` does not occur in `other`.
    /// The result shares no compound with `other` under that notion.
    ///
    /// # Errors
    /// Fails when any identity in either dataset cannot be resolved.
    pub fn filter_out(
        &self,
        other: &RetentionDataset,
        notion: IdentityNotion,
        chem: &dyn ChemService,
    ) -> Result<RetentionDataset> {
        let exclude = other.identity_set(notion, chem)?;
        let mut keep = Vec::new();
        for entry in &self.data {
            if !exclude.contains(&entry_identity(entry, notion, chem)?) {
                keep.push(entry.clone());
            }
        }
        Ok(RetentionDataset::new(keep))
    }

    /// Groups records by identity. Every record appears in exactly one
    /// group; keys are the identity strings.
    ///
    /// # Errors
    /// Fails when any identity cannot be resolved.
    pub fn group_by_identity(
        &self,
        notion: IdentityNotion,
        chem: &dyn ChemService,
    ) -> Result<HashMap<String, Vec<RetentionEntry>>> {
        let mut groups: HashMap<String, Vec<RetentionEntry>> = HashMap::new();
        for entry in &self.data {
            groups
                .entry(entry_identity(entry, notion, chem)?)
                .or_default()
                .push(entry.clone());
        }
        Ok(groups)
    }

    /// One record per identity with the label reduced by `how`. The
    /// resulting records carry the identity string as structure and
    /// [`NO_COLUMN`] as column, since values from different columns are
    /// folded together.
    ///
    /// # Errors
    /// Fails when any identity cannot be resolved.
    pub fn aggregate_by_identity(
        &self,
        notion: IdentityNotion,
        how: Aggregation,
        chem: &dyn ChemService,
    ) -> Result<RetentionDataset> {
        let groups = self.group_by_identity(notion, chem)?;
        let mut data = Vec::with_capacity(groups.len());
        for (identity, entries) in groups {
            let retentions: Vec<f32> = entries.iter().map(RetentionEntry::retention).collect();
            let label = match how {
                Aggregation::Mean => mean(&retentions),
                Aggregation::Median => median(&retentions),
            };
            data.push(RetentionEntry::without_column(&identity, label));
        }
        Ok(RetentionDataset::new(data))
    }

    /// Dataset with every structure string replaced by its canonical
    /// form. Idempotent. Any record that fails to canonicalize aborts the
    /// whole operation.
    ///
    /// # Errors
    /// Propagates the first canonicalization failure.
    pub fn canonicalize_all(
        &self,
        stereochemistry: bool,
        chem: &dyn ChemService,
    ) -> Result<RetentionDataset> {
        let mut data = Vec::with_capacity(self.data.len());
        for entry in &self.data {
            data.push(RetentionEntry::new(
                &chem.canonical(entry.smiles(), stereochemistry)?,
                entry.retention(),
                entry.column(),
            ));
        }
        Ok(RetentionDataset::new(data))
    }

    /// Like [`canonicalize_all`](Self::canonicalize_all) but records that
    /// fail to canonicalize are dropped and reported alongside the result
    /// instead of aborting it.
    #[must_use]
    pub fn canonicalize_all_dropping(
        &self,
        stereochemistry: bool,
        chem: &dyn ChemService,
    ) -> (RetentionDataset, Vec<(String, RetenerError)>) {
        let mut data = Vec::with_capacity(self.data.len());
        let mut dropped = Vec::new();
        for entry in &self.data {
            match chem.canonical(entry.smiles(), stereochemistry) {
                Ok(canon) => data.push(RetentionEntry::new(&canon, entry.retention(), entry.column())),
                Err(e) => dropped.push((entry.smiles().to_string(), e)),
            }
        }
        (RetentionDataset::new(data), dropped)
    }

    /// Concatenates several datasets in order.
    #[must_use]
    pub fn merge(parts: &[&RetentionDataset]) -> RetentionDataset {
        let mut data = Vec::new();
        for part in parts {
            data.extend_from_slice(&part.data);
        }
        RetentionDataset::new(data)
    }

    /// Writes one record per line: `SMILES retention column`, space
    /// separated, no header, no blank lines.
    ///
    /// # Errors
    /// Propagates I/O failures.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for entry in &self.data {
            writeln!(
                out,
                "{} {} {}",
                entry.smiles(),
                entry.retention(),
                entry.column()
            )?;
        }
        out.flush()?;
        Ok(())
    }

    /// Reads the format written by [`save`](Self::save). Structure
    /// strings are loaded as-is, without canonicalization. Reading stops
    /// at the first blank line.
    ///
    /// # Errors
    /// Fails on I/O errors or lines that don't parse as
    /// `SMILES float int`.
    pub fn load(path: &Path) -> Result<RetentionDataset> {
        let reader = BufReader::new(File::open(path)?);
        let mut data = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                break;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(RetenerError::format(format!(
                    "line {}: expected 'SMILES retention column', got {:?}",
                    lineno + 1,
                    line
                )));
            }
            let retention: f32 = fields[1].parse().map_err(|_| {
                RetenerError::format(format!("line {}: bad retention {:?}", lineno + 1, fields[1]))
            })?;
            let column: i32 = fields[2].parse().map_err(|_| {
                RetenerError::format(format!("line {}: bad column {:?}", lineno + 1, fields[2]))
            })?;
            data.push(RetentionEntry::new(fields[0], retention, column));
        }
        Ok(RetentionDataset::new(data))
    }

    /// Distinct literal SMILES strings in this dataset.
    #[must_use]
    pub fn identities_literal(&self) -> HashSet<&str> {
        self.data.iter().map(RetentionEntry::smiles).collect()
    }
}

fn entry_identity(
    entry: &RetentionEntry,
    notion: IdentityNotion,
    chem: &dyn ChemService,
) -> Result<String> {
    match notion {
        IdentityNotion::Literal => Ok(entry.smiles().to_string()),
        IdentityNotion::Canonical => chem.canonical(entry.smiles(), false),
        IdentityNotion::CanonicalStereo => chem.canonical(entry.smiles(), true),
        IdentityNotion::StructureKey => chem.structure_key(entry.smiles()),
    }
}

/// Arithmetic mean. `[1, 2, 6]` gives `3.0`.
#[must_use]
pub fn mean(a: &[f32]) -> f32 {
    a.iter().sum::<f32>() / a.len() as f32
}

/// Median. `[1, 2, 6]` gives `2.0`; even lengths average the middle
/// pair; an empty slice gives NaN.
#[must_use]
pub fn median(a: &[f32]) -> f32 {
    if a.is_empty() {
        return f32::NAN;
    }
    let mut b = a.to_vec();
    b.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    let n = b.len() / 2;
    if b.len() % 2 == 1 {
        b[n]
    } else {
        (b[n] + b[n - 1]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::toy::ToyChemService;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> RetentionDataset {
        RetentionDataset::new(vec![
            RetentionEntry::new("CCC", 300.0, 0),
            RetentionEntry::new("CCC", 301.0, 1),
            RetentionEntry::new("CCCC", 400.0, 0),
            RetentionEntry::new("CCC", 302.0, 2),
            RetentionEntry::new("CCCCC", 500.0, 0),
            RetentionEntry::new("CCCC", 401.0, 1),
        ])
    }

    fn sorted_lines(d: &RetentionDataset) -> Vec<String> {
        let mut lines: Vec<String> = d
            .entries()
            .iter()
            .map(|e| format!("{} {} {}", e.smiles(), e.retention(), e.column()))
            .collect();
        lines.sort();
        lines
    }

    #[test]
    fn test_entry_trims_smiles() {
        let e = RetentionEntry::new("  CCO ", 430.0, 3);
        assert_eq!(e.smiles(), "CCO");
        assert_eq!(e.column(), 3);
    }

    #[test]
    fn test_shuffle_preserves_records() {
        let mut d = sample();
        let before = sorted_lines(&d);
        let mut rng = StdRng::seed_from_u64(7);
        d.shuffle(&mut rng);
        assert_eq!(sorted_lines(&d), before);
        assert_eq!(d.len(), 6);
    }

    #[test]
    fn test_split_by_identity_disjoint_and_complete() {
        let d = sample();
        let mut rng = StdRng::seed_from_u64(42);
        let (split, rest) = d.split_by_identity(1, &mut rng).unwrap();
        let chem = ToyChemService::new();

        assert_eq!(split.len() + rest.len(), d.len());
        assert_eq!(
            split
                .count_overlap(&rest, IdentityNotion::Literal, &chem)
                .unwrap(),
            0
        );
        // Every record of a chosen compound moved together.
        let split_ids = split.identity_set(IdentityNotion::Literal, &chem).unwrap();
        assert_eq!(split_ids.len(), 1);
        let compound = split_ids.iter().next().unwrap();
        let expected = d
            .entries()
            .iter()
            .filter(|e| e.smiles() == compound)
            .count();
        assert_eq!(split.len(), expected);

        // Original untouched; union reconstitutes the multiset.
        assert_eq!(d.len(), 6);
        let merged = RetentionDataset::merge(&[&split, &rest]);
        assert_eq!(sorted_lines(&merged), sorted_lines(&d));
    }

    #[test]
    fn test_split_by_identity_fraction() {
        let d = sample();
        let mut rng = StdRng::seed_from_u64(3);
        // 3 compounds, fraction 0.34 rounds to 1.
        let (split, rest) = d.split_by_identity_fraction(0.34, &mut rng).unwrap();
        let chem = ToyChemService::new();
        assert_eq!(
            split
                .identity_set(IdentityNotion::Literal, &chem)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            rest.identity_set(IdentityNotion::Literal, &chem)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_split_by_identity_too_many() {
        let d = sample();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(d.split_by_identity(4, &mut rng).is_err());
    }

    #[test]
    fn test_split_records() {
        let d = sample();
        let (first, rest) = d.split_records(2);
        assert_eq!(first.len(), 2);
        assert_eq!(rest.len(), 4);
        assert_eq!(first.smiles(0), "CCC");
        assert_eq!(rest.smiles(0), "CCCC");

        let (all, none) = d.split_records(100);
        assert_eq!(all.len(), 6);
        assert!(none.is_empty());
    }

    #[test]
    fn test_filter_out_all_notions() {
        let chem = ToyChemService::new();
        let d = sample();
        let other = RetentionDataset::new(vec![RetentionEntry::new("CCC", 0.0, 0)]);
        for notion in [
            IdentityNotion::Literal,
            IdentityNotion::Canonical,
            IdentityNotion::CanonicalStereo,
            IdentityNotion::StructureKey,
        ] {
            let filtered = d.filter_out(&other, notion, &chem).unwrap();
            assert_eq!(filtered.len(), 3);
            assert_eq!(filtered.count_overlap(&other, notion, &chem).unwrap(), 0);
        }
        // Original unchanged.
        assert_eq!(d.len(), 6);
    }

    #[test]
    fn test_filter_out_sees_through_stereo_marks() {
        let chem = ToyChemService::new();
        let d = RetentionDataset::new(vec![RetentionEntry::new("C/C=C/C", 100.0, 0)]);
        let other = RetentionDataset::new(vec![RetentionEntry::new("CC=CC", 0.0, 0)]);
        // Literal and stereo-sensitive identities differ...
        assert_eq!(
            d.filter_out(&other, IdentityNotion::Literal, &chem)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            d.filter_out(&other, IdentityNotion::CanonicalStereo, &chem)
                .unwrap()
                .len(),
            1
        );
        // ...but the stereo-insensitive ones collide.
        assert!(d
            .filter_out(&other, IdentityNotion::Canonical, &chem)
            .unwrap()
            .is_empty());
        assert!(d
            .filter_out(&other, IdentityNotion::StructureKey, &chem)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_group_by_identity() {
        let chem = ToyChemService::new();
        let groups = sample()
            .group_by_identity(IdentityNotion::Canonical, &chem)
            .unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups["CCC"].len(), 3);
        assert_eq!(groups["CCCC"].len(), 2);
        assert_eq!(groups["CCCCC"].len(), 1);
    }

    #[test]
    fn test_aggregate_mean() {
        let chem = ToyChemService::new();
        let agg = sample()
            .aggregate_by_identity(IdentityNotion::Canonical, Aggregation::Mean, &chem)
            .unwrap();
        assert_eq!(agg.len(), 3);
        for entry in agg.entries() {
            assert_eq!(entry.column(), NO_COLUMN);
            match entry.smiles() {
                "CCC" => assert!((entry.retention() - 301.0).abs() < 1e-4),
                "CCCC" => assert!((entry.retention() - 400.5).abs() < 1e-4),
                "CCCCC" => assert!((entry.retention() - 500.0).abs() < 1e-4),
                other => panic!("unexpected compound {other}"),
            }
        }
    }

    #[test]
    fn test_aggregate_mean_repeated_values() {
        let chem = ToyChemService::new();
        let d = RetentionDataset::new(vec![
            RetentionEntry::new("CCO", 10.0, 0),
            RetentionEntry::new("CCO", 11.0, 1),
            RetentionEntry::new("CCO", 11.0, 2),
        ]);
        let agg = d
            .aggregate_by_identity(IdentityNotion::Canonical, Aggregation::Mean, &chem)
            .unwrap();
        assert_eq!(agg.len(), 1);
        assert!((agg.retention(0) - 10.667).abs() < 1e-3);
        assert_eq!(agg.column(0), NO_COLUMN);
    }

    #[test]
    fn test_aggregate_median() {
        let chem = ToyChemService::new();
        let agg = sample()
            .aggregate_by_identity(IdentityNotion::Canonical, Aggregation::Median, &chem)
            .unwrap();
        for entry in agg.entries() {
            if entry.smiles() == "CCC" {
                assert!((entry.retention() - 301.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_canonicalize_all_idempotent() {
        let chem = ToyChemService::new();
        let d = RetentionDataset::new(vec![
            RetentionEntry::new("C/C=C/C", 100.0, 0),
            RetentionEntry::new("CCO", 200.0, 1),
        ]);
        for stereo in [false, true] {
            let once = d.canonicalize_all(stereo, &chem).unwrap();
            let twice = once.canonicalize_all(stereo, &chem).unwrap();
            assert_eq!(once, twice);
        }
        assert_eq!(
            d.canonicalize_all(false, &chem).unwrap().smiles(0),
            "CC=CC"
        );
    }

    #[test]
    fn test_canonicalize_all_aborts_on_bad_entry() {
        let chem = ToyChemService::new();
        let d = RetentionDataset::new(vec![
            RetentionEntry::new("CCO", 200.0, 1),
            RetentionEntry::new("C!!!", 300.0, 1),
        ]);
        assert!(d.canonicalize_all(false, &chem).is_err());
    }

    #[test]
    fn test_canonicalize_all_dropping() {
        let chem = ToyChemService::new();
        let d = RetentionDataset::new(vec![
            RetentionEntry::new("CCO", 200.0, 1),
            RetentionEntry::new("C!!!", 300.0, 1),
            RetentionEntry::new("CCC", 310.0, 0),
        ]);
        let (kept, dropped) = d.canonicalize_all_dropping(false, &chem);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].0, "C!!!");
    }

    #[test]
    fn test_merge() {
        let a = RetentionDataset::new(vec![RetentionEntry::new("C", 100.0, 0)]);
        let b = RetentionDataset::new(vec![
            RetentionEntry::new("CC", 200.0, 1),
            RetentionEntry::new("CCC", 300.0, 2),
        ]);
        let merged = RetentionDataset::merge(&[&a, &b]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.smiles(0), "C");
        assert_eq!(merged.smiles(2), "CCC");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ri.txt");
        let d = sample();
        d.save(&path).unwrap();
        let loaded = RetentionDataset::load(&path).unwrap();
        assert_eq!(loaded, d);
    }

    #[test]
    fn test_load_rejects_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "CCC 300 0\nCCCC nan_oops\n").unwrap();
        assert!(RetentionDataset::load(&path).is_err());
    }

    #[test]
    fn test_mean_median() {
        assert_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
        assert_eq!(median(&[1.0, 2.0, 6.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert!(median(&[]).is_nan());
    }
}
