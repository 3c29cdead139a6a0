//! Descriptor cache: precomputed, min/max-scaled molecular descriptors.
//!
//! The cache owns a fixed ordered list of descriptor names together with
//! per-descriptor min/max bounds used to rescale raw values into `[0, 1]`.
//! It runs in one of two modes:
//!
//! * **precomputed** — descriptors are computed up front for a set of
//!   compounds (in parallel, on an injected thread pool) and later served
//!   from memory; a lookup for an unknown compound is a
//!   [`RetenerError::CacheMiss`];
//! * **on-demand** — every `get` computes fresh values through the
//!   chemistry service; `precompute` and `save` are unavailable.
//!
//! Failed features are NaN entries, never errors. Callers that need
//! NaN-free rows use [`DescriptorCache::get_no_nans`].

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;

use crate::chem::{self, ChemService};
use crate::error::{RetenerError, Result};

/// Descriptor computation manager. See the module docs for the two modes.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use retener::chem::ChemService;
/// use retener::chem::toy::ToyChemService;
/// use retener::descriptors::DescriptorCache;
///
/// let chem: Arc<dyn ChemService> = Arc::new(ToyChemService::new());
/// let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
/// let mut cache = DescriptorCache::precomputed(vec!["weight".into(), "tpsa".into()]);
/// let compounds = ["CCO".to_string()].into_iter().collect();
/// cache.precompute(&compounds, true, &chem, &pool).unwrap();
/// assert_eq!(cache.get("CCO", chem.as_ref()).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorCache {
    names: Vec<String>,
    min: Vec<f32>,
    max: Vec<f32>,
    /// `None` in on-demand mode.
    precomputed: Option<HashMap<String, Vec<f32>>>,
    timeout: Option<Duration>,
}

impl DescriptorCache {
    /// Empty precomputed-mode cache with zeroed bounds.
    #[must_use]
    pub fn precomputed(names: Vec<String>) -> Self {
        let n = names.len();
        Self {
            names,
            min: vec![0.0; n],
            max: vec![0.0; n],
            precomputed: Some(HashMap::new()),
            timeout: None,
        }
    }

    /// Cache with explicit scaling bounds. `use_precomputed = false`
    /// selects on-demand mode.
    ///
    /// # Errors
    /// Fails when the bound arrays don't match the name list length.
    pub fn with_bounds(
        names: Vec<String>,
        min: Vec<f32>,
        max: Vec<f32>,
        use_precomputed: bool,
    ) -> Result<Self> {
        if min.len() != names.len() || max.len() != names.len() {
            return Err(RetenerError::dimension_mismatch(
                "descriptor bounds",
                names.len(),
                min.len().min(max.len()),
            ));
        }
        Ok(Self {
            precomputed: use_precomputed.then(HashMap::new),
            names,
            min,
            max,
            timeout: None,
        })
    }

    /// Abandon any single molecule's descriptor computation after this
    /// long and record an all-NaN row for it instead. Applies to
    /// [`precompute`](Self::precompute) only.
    #[must_use]
    pub fn with_descriptor_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of descriptors per compound.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Number of compounds with precomputed rows (0 in on-demand mode).
    #[must_use]
    pub fn n_compounds(&self) -> usize {
        self.precomputed.as_ref().map_or(0, HashMap::len)
    }

    #[must_use]
    pub fn bounds(&self) -> (&[f32], &[f32]) {
        (&self.min, &self.max)
    }

    /// Scaled descriptor row for a compound.
    ///
    /// Precomputed mode looks the string up literally, then under its
    /// stereo-preserving canonical form. On-demand mode canonicalizes and
    /// computes through the service, scaling with the stored bounds.
    ///
    /// # Errors
    /// [`RetenerError::CacheMiss`] for unknown compounds in precomputed
    /// mode; identity failures from the service otherwise.
    pub fn get(&self, smiles: &str, chem: &dyn ChemService) -> Result<Vec<f32>> {
        match &self.precomputed {
            None => {
                let canon = chem.canonical(smiles, true)?;
                let raw = chem.descriptors(&canon, &self.names)?;
                Ok(chem::scale_min_max(&raw, &self.min, &self.max))
            }
            Some(map) => {
                if let Some(row) = map.get(smiles.trim()) {
                    return Ok(row.clone());
                }
                let canon = chem.canonical(smiles, true)?;
                map.get(&canon).cloned().ok_or(RetenerError::CacheMiss {
                    identity: smiles.trim().to_string(),
                })
            }
        }
    }

    /// Like [`get`](Self::get) with NaN entries replaced by zero.
    ///
    /// # Errors
    /// Same failure modes as [`get`](Self::get).
    pub fn get_no_nans(&self, smiles: &str, chem: &dyn ChemService) -> Result<Vec<f32>> {
        Ok(chem::nans_to_zero(&self.get(smiles, chem)?))
    }

    /// Computes and stores descriptor rows for a set of compounds.
    ///
    /// Compounds are canonicalized (stereo preserved), deduplicated, and
    /// computed in parallel on `pool`; the stored map is identical
    /// regardless of completion order. With `recompute_min_max` the
    /// per-descriptor bounds are refreshed from the raw values (NaNs
    /// ignored; all-NaN descriptors get NaN bounds) before scaling;
    /// otherwise the existing bounds are used and previously cached rows
    /// stay valid, so precomputing in several batches equals one big
    /// batch.
    ///
    /// # Errors
    /// Fails in on-demand mode, and on the first compound whose identity
    /// cannot be resolved.
    pub fn precompute(
        &mut self,
        compounds: &HashSet<String>,
        recompute_min_max: bool,
        chem: &Arc<dyn ChemService>,
        pool: &rayon::ThreadPool,
    ) -> Result<()> {
        if self.precomputed.is_none() {
            return Err(RetenerError::Other(
                "precomputing is disabled for an on-demand descriptor cache".to_string(),
            ));
        }
        let mut canonical: HashSet<String> = HashSet::new();
        for smiles in compounds {
            canonical.insert(chem.canonical(smiles, true)?);
        }
        let canonical: Vec<String> = canonical.into_iter().collect();

        let progress = AtomicUsize::new(0);
        let names = self.names.clone();
        let timeout = self.timeout;
        let computed: Vec<(String, Result<Vec<f32>>)> = pool.install(|| {
            canonical
                .par_iter()
                .map(|smiles| {
                    let i = progress.fetch_add(1, Ordering::Relaxed) + 1;
                    if i % 1000 == 0 {
                        println!("Computing descriptors... {i}");
                    }
                    let row = compute_one(chem, smiles, &names, timeout);
                    (smiles.clone(), row)
                })
                .collect()
        });

        let mut raw = Vec::with_capacity(computed.len());
        for (smiles, row) in computed {
            raw.push((smiles, row?));
        }

        if recompute_min_max {
            let n = self.names.len();
            let mut min = vec![f32::INFINITY; n];
            let mut max = vec![f32::NEG_INFINITY; n];
            for (_, row) in &raw {
                for j in 0..n {
                    if row[j] < min[j] {
                        min[j] = row[j];
                    }
                    if row[j] > max[j] {
                        max[j] = row[j];
                    }
                }
            }
            for j in 0..n {
                if min[j] == f32::INFINITY || max[j] == f32::NEG_INFINITY {
                    min[j] = f32::NAN;
                    max[j] = f32::NAN;
                }
            }
            self.min = min;
            self.max = max;
        }

        let map = self
            .precomputed
            .as_mut()
            .ok_or_else(|| RetenerError::Other("descriptor map vanished".to_string()))?;
        for (smiles, row) in raw {
            map.insert(smiles, chem::scale_min_max(&row, &self.min, &self.max));
        }
        Ok(())
    }

    /// Writes the cache as text: a header line with the descriptor count,
    /// compound count, names, mins, and maxes, then one `SMILES values...`
    /// line per compound. Values are the scaled rows.
    ///
    /// # Errors
    /// Fails in on-demand mode and on I/O errors.
    pub fn save(&self, path: &Path) -> Result<()> {
        let map = self.precomputed.as_ref().ok_or_else(|| {
            RetenerError::Other("only a precomputed descriptor cache can be saved".to_string())
        })?;
        let mut out = BufWriter::new(File::create(path)?);
        write!(out, "{} {}", self.names.len(), map.len())?;
        for name in &self.names {
            write!(out, " {}", name.trim())?;
        }
        for v in &self.min {
            write!(out, " {v}")?;
        }
        for v in &self.max {
            write!(out, " {v}")?;
        }
        writeln!(out)?;
        for (smiles, row) in map {
            write!(out, "{smiles}")?;
            for v in row {
                write!(out, " {v}")?;
            }
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Reads the format written by [`save`](Self::save). A file with zero
    /// compounds loads as an on-demand cache.
    ///
    /// # Errors
    /// Fails on I/O errors or malformed content.
    pub fn load(path: &Path) -> Result<Self> {
        let mut lines = BufReader::new(File::open(path)?).lines();
        let header = lines
            .next()
            .ok_or_else(|| RetenerError::format("empty descriptor cache file"))??;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(RetenerError::format("truncated descriptor cache header"));
        }
        let nd: usize = fields[0]
            .parse()
            .map_err(|_| RetenerError::format("bad descriptor count"))?;
        let ncomp: usize = fields[1]
            .parse()
            .map_err(|_| RetenerError::format("bad compound count"))?;
        if fields.len() != 2 + 3 * nd {
            return Err(RetenerError::format(format!(
                "descriptor cache header: expected {} fields, got {}",
                2 + 3 * nd,
                fields.len()
            )));
        }
        let names: Vec<String> = fields[2..2 + nd].iter().map(|s| s.to_string()).collect();
        let parse_f32 = |s: &str| -> Result<f32> {
            s.parse()
                .map_err(|_| RetenerError::format(format!("bad float {s:?}")))
        };
        let min = fields[2 + nd..2 + 2 * nd]
            .iter()
            .map(|s| parse_f32(s))
            .collect::<Result<Vec<f32>>>()?;
        let max = fields[2 + 2 * nd..]
            .iter()
            .map(|s| parse_f32(s))
            .collect::<Result<Vec<f32>>>()?;

        let mut cache = Self::with_bounds(names, min, max, ncomp != 0)?;
        if ncomp == 0 {
            return Ok(cache);
        }
        let map = match cache.precomputed.as_mut() {
            Some(map) => map,
            None => return Err(RetenerError::format("descriptor map missing")),
        };
        for _ in 0..ncomp {
            let line = lines
                .next()
                .ok_or_else(|| RetenerError::format("missing compound line"))??;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != nd + 1 {
                return Err(RetenerError::format(format!(
                    "compound line: expected {} values, got {}",
                    nd,
                    fields.len().saturating_sub(1)
                )));
            }
            let row = fields[1..]
                .iter()
                .map(|s| parse_f32(s))
                .collect::<Result<Vec<f32>>>()?;
            map.insert(fields[0].to_string(), row);
        }
        Ok(cache)
    }
}

/// One compound's raw descriptors, optionally under a hard wall-clock
/// bound. A timeout yields an all-NaN row immediately, but the worker
/// cannot be cancelled: the abandoned computation keeps occupying its
/// thread until it finishes on its own, and its result is dropped. A
/// backend that hangs forever therefore leaks one thread per timeout.
fn compute_one(
    chem: &Arc<dyn ChemService>,
    smiles: &str,
    names: &[String],
    timeout: Option<Duration>,
) -> Result<Vec<f32>> {
    let Some(timeout) = timeout else {
        return chem.descriptors(smiles, names);
    };
    let (tx, rx) = mpsc::channel();
    let chem = Arc::clone(chem);
    let smiles_owned = smiles.to_string();
    let names_owned = names.to_vec();
    std::thread::spawn(move || {
        let result = chem.descriptors(&smiles_owned, &names_owned);
        let _ = tx.send(result);
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Ok(vec![f32::NAN; names.len()]),
    }
}
