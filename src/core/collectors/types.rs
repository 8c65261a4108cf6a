use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use super::error::CollectorError;

/// Result alias used by every extraction rule.
pub type CollectorResult<T> = std::result::Result<T, CollectorError>;

/// Flat metric namespace produced by one poll cycle.
///
/// Keys are `Component/...` names, values are finite numbers. Ordering is by
/// key so two cycles over the same daemon state serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSet {
    samples: BTreeMap<String, f64>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a sample, replacing an earlier one with the same name.
    ///
    /// NaN and infinities are dropped with a warning; returns whether the
    /// sample was stored.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> bool {
        let name = name.into();
        if !value.is_finite() {
            warn!("Dropping non-finite sample {} = {}", name, value);
            return false;
        }
        self.samples.insert(name, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.samples.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.samples.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.samples.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names starting with `prefix`, in key order.
    pub fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.samples
            .keys()
            .filter(move |k| k.starts_with(prefix))
            .map(String::as_str)
    }

    /// Moves every sample of `other` into `self`, last writer wins.
    ///
    /// Returns the names that were already present. The standard query plan
    /// keeps its rules in disjoint namespaces, so a non-empty result points at
    /// a naming bug rather than at daemon data.
    pub fn merge(&mut self, other: MetricSet) -> Vec<String> {
        let mut collisions = Vec::new();
        for (name, value) in other.samples {
            if self.samples.insert(name.clone(), value).is_some() {
                collisions.push(name);
            }
        }
        collisions
    }
}
