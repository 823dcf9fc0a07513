//! Molecular-weight lookup contract and the caching resolver in front of it.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum WeightLookupError {
    #[error("lookup for {substance} failed: {message}")]
    Backend { substance: String, message: String },
    #[error("failed to parse weight table JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse weight table TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// One compound matched by name in the external directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub molecular_weight: Option<f64>,
    pub molecular_formula: Option<String>,
}

impl CompoundRecord {
    pub fn with_weight(molecular_weight: f64) -> Self {
        Self {
            molecular_weight: Some(molecular_weight),
            molecular_formula: None,
        }
    }

    fn usable_weight(&self) -> Option<f64> {
        self.molecular_weight
            .filter(|weight| weight.is_finite() && *weight > 0.0)
    }
}

pub type LookupAnswer = Result<Vec<CompoundRecord>, WeightLookupError>;

/// A name → compound directory. An empty result means "not found".
pub trait MolecularWeightLookup {
    fn lookup(&self, substance: &str) -> LookupAnswer;

    /// Answers several names in one round trip, one answer per name in order.
    ///
    /// Backends that can batch or parallelise requests override this.
    fn lookup_batch(&self, substances: &[&str]) -> Vec<LookupAnswer> {
        substances
            .iter()
            .map(|substance| self.lookup(substance))
            .collect()
    }
}

impl<T: MolecularWeightLookup + ?Sized> MolecularWeightLookup for &T {
    fn lookup(&self, substance: &str) -> LookupAnswer {
        (**self).lookup(substance)
    }

    fn lookup_batch(&self, substances: &[&str]) -> Vec<LookupAnswer> {
        (**self).lookup_batch(substances)
    }
}

impl<T: MolecularWeightLookup + ?Sized> MolecularWeightLookup for Box<T> {
    fn lookup(&self, substance: &str) -> LookupAnswer {
        (**self).lookup(substance)
    }

    fn lookup_batch(&self, substances: &[&str]) -> Vec<LookupAnswer> {
        (**self).lookup_batch(substances)
    }
}

/// In-memory directory keyed by exact substance name.
#[derive(Debug, Clone, Default)]
pub struct StaticWeightLookup {
    compounds: HashMap<String, Vec<CompoundRecord>>,
}

impl StaticWeightLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut lookup = Self::new();
        for (name, weight) in weights {
            lookup.insert(name, CompoundRecord::with_weight(weight));
        }
        lookup
    }

    /// Parses `{ "Glucose": 180.16, ... }`.
    pub fn from_json_str(content: &str) -> Result<Self, WeightLookupError> {
        let weights: BTreeMap<String, f64> = serde_json::from_str(content)?;
        Ok(Self::from_weights(weights))
    }

    /// Parses a flat table, e.g. `Glucose = 180.16`.
    pub fn from_toml_str(content: &str) -> Result<Self, WeightLookupError> {
        let weights: BTreeMap<String, f64> = toml::from_str(content)?;
        Ok(Self::from_weights(weights))
    }

    pub fn insert(&mut self, name: impl Into<String>, record: CompoundRecord) {
        self.compounds.entry(name.into()).or_default().push(record);
    }
}

impl MolecularWeightLookup for StaticWeightLookup {
    fn lookup(&self, substance: &str) -> LookupAnswer {
        Ok(self.compounds.get(substance).cloned().unwrap_or_default())
    }
}

/// Resolved weights (g/mol) for one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MolecularWeightTable {
    weights: BTreeMap<String, f64>,
}

impl MolecularWeightTable {
    pub fn get(&self, substance: &str) -> Option<f64> {
        self.weights.get(substance).copied()
    }

    pub fn contains(&self, substance: &str) -> bool {
        self.weights.contains_key(substance)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for MolecularWeightTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            weights: iter
                .into_iter()
                .map(|(name, weight)| (name.into(), weight))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupFailure {
    pub substance: String,
    pub attempts: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct WeightResolution {
    pub table: MolecularWeightTable,
    /// Names the directory has no usable weight for.
    pub not_found: Vec<String>,
    /// Names whose lookup kept failing; treated as not found for this pass.
    pub failures: Vec<LookupFailure>,
}

/// Resolves names through a [`MolecularWeightLookup`], caching answers by exact name.
///
/// Names missing from the cache are sent in a single
/// [`MolecularWeightLookup::lookup_batch`] call. Names whose answer is an
/// error are then retried one at a time until `attempts` is used up. Hits and
/// misses stay cached for the resolver's lifetime. Failed lookups are not
/// cached, so a later pass asks again.
pub struct WeightResolver<L> {
    lookup: L,
    attempts: usize,
    cache: HashMap<String, Option<f64>>,
    lookups_issued: usize,
}

impl<L: MolecularWeightLookup> WeightResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            attempts: 1,
            cache: HashMap::new(),
            lookups_issued: 0,
        }
    }

    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Number of per-name requests made against the underlying lookup so far.
    pub fn lookups_issued(&self) -> usize {
        self.lookups_issued
    }

    pub fn resolve<'a, I>(&mut self, names: I) -> WeightResolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolution = WeightResolution::default();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut distinct: Vec<&str> = Vec::new();
        for name in names {
            if !name.trim().is_empty() && seen.insert(name) {
                distinct.push(name);
            }
        }

        let pending: Vec<&str> = distinct
            .iter()
            .copied()
            .filter(|name| !self.cache.contains_key(*name))
            .collect();
        let mut failed: HashSet<&str> = HashSet::new();
        if !pending.is_empty() {
            self.lookups_issued += pending.len();
            let mut answers = self.lookup.lookup_batch(&pending).into_iter();
            for name in &pending {
                let outcome = match answers.next() {
                    Some(Ok(records)) => Ok(first_usable_weight(name, &records)),
                    Some(Err(err)) => {
                        warn!(substance = *name, attempt = 1, "weight lookup failed: {err}");
                        self.retry(name, 1, err)
                    }
                    None => self.fetch(name),
                };
                match outcome {
                    Ok(weight) => {
                        self.cache.insert(name.to_string(), weight);
                    }
                    Err(failure) => {
                        failed.insert(*name);
                        resolution.failures.push(failure);
                    }
                }
            }
        }

        let mut resolved: Vec<(String, f64)> = Vec::new();
        for name in distinct {
            if failed.contains(name) {
                continue;
            }
            match self.cache.get(name).copied().flatten() {
                Some(weight) => resolved.push((name.to_string(), weight)),
                None => resolution.not_found.push(name.to_string()),
            }
        }

        resolution.table = resolved.into_iter().collect();
        resolution
    }

    fn fetch(&mut self, name: &str) -> Result<Option<f64>, LookupFailure> {
        match self.lookup.lookup(name) {
            Ok(records) => Ok(first_usable_weight(name, &records)),
            Err(err) => {
                warn!(substance = name, attempt = 1, "weight lookup failed: {err}");
                self.retry(name, 1, err)
            }
        }
    }

    /// Keeps asking for `name` after `used` failed attempts.
    fn retry(
        &mut self,
        name: &str,
        used: usize,
        mut last_error: WeightLookupError,
    ) -> Result<Option<f64>, LookupFailure> {
        for attempt in (used + 1)..=self.attempts {
            self.lookups_issued += 1;
            match self.lookup.lookup(name) {
                Ok(records) => return Ok(first_usable_weight(name, &records)),
                Err(err) => {
                    warn!(substance = name, attempt, "weight lookup failed: {err}");
                    last_error = err;
                }
            }
        }

        Err(LookupFailure {
            substance: name.to_string(),
            attempts: self.attempts,
            message: last_error.to_string(),
        })
    }
}

fn first_usable_weight(name: &str, records: &[CompoundRecord]) -> Option<f64> {
    let weight = records.iter().find_map(CompoundRecord::usable_weight);
    debug!(substance = name, ?weight, matches = records.len(), "weight lookup");
    weight
}
