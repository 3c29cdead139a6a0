//! Feature assembly for the leaf models.
//!
//! Each [`LeafKind`] names one way of turning a dataset entry into a
//! numeric input row. The kinds form a closed set; adding a leaf means
//! adding a variant here and covering it in `input_row`.

use crate::chem::{self, FingerprintKind};
use crate::columns;
use crate::dataset::{RetentionDataset, RetentionEntry};
use crate::error::{RetenerError, Result};
use crate::model::ModelData;

/// The input representation a leaf model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Character-level one-hot grid of the SMILES string plus column
    /// one-hot with polarity flags.
    SmilesCnn,
    /// Flattened 2D structure sketch plus column one-hot with polarity
    /// flags. The image-like input of the 2D convolutional leaf.
    DepictionCnn,
    /// Column one-hot with polarity, scaled descriptors, functional
    /// group counts, and optionally a structural fingerprint.
    Mlp { fingerprints: FingerprintKind },
    /// Column one-hot with polarity, scaled descriptors, and
    /// functional group counts. The tabular representation boosters
    /// train on.
    DescriptorTable,
}

impl LeafKind {
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::SmilesCnn => "smiles-cnn",
            Self::DepictionCnn => "depiction-cnn",
            Self::Mlp { .. } => "mlp",
            Self::DescriptorTable => "descriptor-table",
        }
    }

    /// Whether this representation reads from the descriptor cache.
    #[must_use]
    pub fn needs_descriptors(self) -> bool {
        !matches!(self, Self::SmilesCnn | Self::DepictionCnn)
    }

    /// Builds the input row for one entry.
    ///
    /// # Errors
    /// Fails when the SMILES cannot be processed, or when the kind
    /// needs descriptors and `data` carries no cache.
    pub fn input_row(self, entry: &RetentionEntry, data: &ModelData) -> Result<Vec<f32>> {
        let chem = data.chem().as_ref();
        match self {
            Self::SmilesCnn => {
                let mut row = chem::token_grid(entry.smiles())?;
                row.extend(columns::one_hot_with_polarity(entry.column()));
                Ok(row)
            }
            Self::DepictionCnn => {
                let mut row = chem.depiction(entry.smiles())?;
                row.extend(columns::one_hot_with_polarity(entry.column()));
                Ok(row)
            }
            Self::Mlp { fingerprints } => {
                let mut row = self.tabular_row(entry, data)?;
                if !fingerprints.is_empty() {
                    row.extend(chem.fingerprints(entry.smiles(), fingerprints)?);
                }
                Ok(row)
            }
            Self::DescriptorTable => self.tabular_row(entry, data),
        }
    }

    /// Input rows for a whole dataset, in entry order.
    pub fn batch_input(self, dataset: &RetentionDataset, data: &ModelData) -> Result<Vec<Vec<f32>>> {
        dataset
            .entries()
            .iter()
            .map(|entry| self.input_row(entry, data))
            .collect()
    }

    /// Width of the rows this kind produces for the given data.
    pub fn input_width(self, data: &ModelData) -> Result<usize> {
        match self {
            Self::SmilesCnn => {
                Ok(chem::SMILES_LEN * chem::SMILES_TOKENS + columns::NUM_COLUMNS + 2)
            }
            Self::DepictionCnn => Ok(chem::DEPICTION_LEN + columns::NUM_COLUMNS + 2),
            Self::Mlp { fingerprints } => {
                let cache = require_descriptors(data)?;
                Ok(columns::NUM_COLUMNS
                    + 2
                    + cache.n_features()
                    + data.chem().func_groups("C")?.len()
                    + fingerprints.len())
            }
            Self::DescriptorTable => {
                let cache = require_descriptors(data)?;
                Ok(columns::NUM_COLUMNS + 2 + cache.n_features() + data.chem().func_groups("C")?.len())
            }
        }
    }

    fn tabular_row(self, entry: &RetentionEntry, data: &ModelData) -> Result<Vec<f32>> {
        let cache = require_descriptors(data)?;
        let chem = data.chem().as_ref();
        let mut row = columns::one_hot_with_polarity(entry.column());
        row.extend(cache.get_no_nans(entry.smiles(), chem)?);
        row.extend(chem.func_groups(entry.smiles())?);
        Ok(row)
    }
}

fn require_descriptors(data: &ModelData) -> Result<&crate::descriptors::DescriptorCache> {
    data.descriptors()
        .map(AsRef::as_ref)
        .ok_or_else(|| RetenerError::from("descriptor cache required but not configured"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::toy::ToyChemService;
    use crate::chem::ChemService;
    use crate::descriptors::DescriptorCache;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn data_with_cache() -> ModelData {
        let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
        let train = RetentionDataset::new(vec![
            RetentionEntry::new("CCC", 300.0, 0),
            RetentionEntry::new("CCCC", 400.0, 15),
        ]);
        let validation = RetentionDataset::new(vec![RetentionEntry::new("CCCCC", 500.0, 2)]);

        let mut cache = DescriptorCache::precomputed(vec!["mw".into(), "logp".into()]);
        let compounds: HashSet<String> =
            ["CCC", "CCCC", "CCCCC"].iter().map(|s| (*s).to_string()).collect();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        cache.precompute(&compounds, true, &chem, &pool).unwrap();

        ModelData::from_parts(train, validation, chem, Some(Arc::new(cache))).unwrap()
    }

    #[test]
    fn test_smiles_cnn_row_shape() {
        let data = data_with_cache();
        let kind = LeafKind::SmilesCnn;
        let entry = RetentionEntry::new("CCC", 300.0, 0);
        let row = kind.input_row(&entry, &data).unwrap();
        assert_eq!(row.len(), kind.input_width(&data).unwrap());
        assert_eq!(row.len(), chem::SMILES_LEN * chem::SMILES_TOKENS + 38);
        // The grid is one-hot per position.
        let grid = &row[..chem::SMILES_LEN * chem::SMILES_TOKENS];
        assert_eq!(grid.iter().filter(|&&v| v == 1.0).count(), chem::SMILES_LEN);
    }

    #[test]
    fn test_smiles_cnn_does_not_need_cache() {
        let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
        let data = ModelData::from_parts(
            RetentionDataset::new(vec![RetentionEntry::new("CCC", 300.0, 0)]),
            RetentionDataset::new(vec![RetentionEntry::new("CCCC", 400.0, 0)]),
            chem,
            None,
        )
        .unwrap();
        let entry = RetentionEntry::new("CCC", 300.0, 0);
        assert!(LeafKind::SmilesCnn.input_row(&entry, &data).is_ok());
        assert!(!LeafKind::SmilesCnn.needs_descriptors());
    }

    #[test]
    fn test_depiction_cnn_row_shape() {
        let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
        let data = ModelData::from_parts(
            RetentionDataset::new(vec![RetentionEntry::new("CCC", 300.0, 0)]),
            RetentionDataset::new(vec![RetentionEntry::new("CCCC", 400.0, 0)]),
            chem,
            None,
        )
        .unwrap();
        let kind = LeafKind::DepictionCnn;
        assert!(!kind.needs_descriptors());
        let entry = RetentionEntry::new("CC=CC", 400.0, 15);
        let row = kind.input_row(&entry, &data).unwrap();
        assert_eq!(row.len(), kind.input_width(&data).unwrap());
        assert_eq!(row.len(), chem::DEPICTION_LEN + 38);
        // One occupied sketch cell per structure symbol.
        let sketch = &row[..chem::DEPICTION_LEN];
        assert_eq!(sketch.iter().sum::<f32>(), 4.0);
        // Column 15 one-hot with the semi-non-polar flag set.
        let tail = &row[chem::DEPICTION_LEN..];
        assert_eq!(tail[15], 1.0);
        assert_eq!(tail[columns::NUM_COLUMNS], 0.0);
        assert_eq!(tail[columns::NUM_COLUMNS + 1], 1.0);
    }

    #[test]
    fn test_tabular_kinds_require_cache() {
        let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
        let data = ModelData::from_parts(
            RetentionDataset::new(vec![RetentionEntry::new("CCC", 300.0, 0)]),
            RetentionDataset::new(vec![RetentionEntry::new("CCCC", 400.0, 0)]),
            chem,
            None,
        )
        .unwrap();
        let entry = RetentionEntry::new("CCC", 300.0, 0);
        assert!(LeafKind::DescriptorTable.input_row(&entry, &data).is_err());
        assert!(LeafKind::Mlp { fingerprints: FingerprintKind::None }
            .input_row(&entry, &data)
            .is_err());
    }

    #[test]
    fn test_descriptor_table_row_shape() {
        let data = data_with_cache();
        let kind = LeafKind::DescriptorTable;
        let entry = RetentionEntry::new("CCCC", 400.0, 15);
        let row = kind.input_row(&entry, &data).unwrap();
        assert_eq!(row.len(), kind.input_width(&data).unwrap());
        // Column 15 is in the semi-non-polar bucket.
        assert_eq!(row[15], 1.0);
        assert_eq!(row[columns::NUM_COLUMNS], 0.0);
        assert_eq!(row[columns::NUM_COLUMNS + 1], 1.0);
        // Descriptors live in the unit interval and never carry NaN.
        for &v in &row[columns::NUM_COLUMNS + 2..] {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_mlp_appends_fingerprints() {
        let data = data_with_cache();
        let entry = RetentionEntry::new("CCC", 300.0, 0);
        let bare = LeafKind::Mlp { fingerprints: FingerprintKind::None }
            .input_row(&entry, &data)
            .unwrap();
        let with_fp = LeafKind::Mlp { fingerprints: FingerprintKind::Maccs }
            .input_row(&entry, &data)
            .unwrap();
        assert_eq!(with_fp.len(), bare.len() + FingerprintKind::Maccs.len());
        assert_eq!(&with_fp[..bare.len()], &bare[..]);
    }

    #[test]
    fn test_batch_input_matches_per_entry_rows() {
        let data = data_with_cache();
        let kind = LeafKind::DescriptorTable;
        let rows = kind.batch_input(data.train(), &data).unwrap();
        assert_eq!(rows.len(), data.train().len());
        for (entry, row) in data.train().entries().iter().zip(&rows) {
            assert_eq!(row, &kind.input_row(entry, &data).unwrap());
        }
    }
}
