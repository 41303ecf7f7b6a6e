//! Read-only lookup of resolved analysis quantities.
//!
//! The dataset is built once per invocation (by the configuration loader or
//! by tests) and then only read. Lookups fail loudly: a comparison that
//! references a missing entry aborts the whole run with an error naming the
//! exact key, rather than silently skipping a table row.

use std::collections::BTreeMap;

use crate::domain::{ChannelKey, Observable, Quantity};
use crate::error::EngineError;

/// Summary counts for the `validate` subcommand and run headers.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub n_keys: usize,
    pub n_yields: usize,
    pub n_efficiencies: usize,
    pub n_luminosities: usize,
    pub n_references: usize,
}

/// All quantities resolved for one invocation.
///
/// Keyed storage is ordered so iteration (summaries, debugging output) is
/// deterministic regardless of configuration file layout.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDataset {
    yields: BTreeMap<(Observable, ChannelKey), Quantity>,
    efficiencies: BTreeMap<(Observable, ChannelKey), Quantity>,
    luminosities: BTreeMap<ChannelKey, Quantity>,
    references: BTreeMap<String, Quantity>,
}

impl ResolvedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_yield(
        &mut self,
        observable: impl Into<Observable>,
        key: ChannelKey,
        quantity: Quantity,
    ) {
        self.yields.insert((observable.into(), key), quantity);
    }

    pub fn insert_efficiency(
        &mut self,
        observable: impl Into<Observable>,
        key: ChannelKey,
        quantity: Quantity,
    ) {
        self.efficiencies.insert((observable.into(), key), quantity);
    }

    pub fn insert_luminosity(&mut self, key: ChannelKey, quantity: Quantity) {
        self.luminosities.insert(key, quantity);
    }

    pub fn insert_reference(&mut self, name: impl Into<String>, quantity: Quantity) {
        self.references.insert(name.into(), quantity);
    }

    /// The yield quantity for an observable at a (channel, era) key.
    pub fn yield_for(
        &self,
        observable: &Observable,
        key: &ChannelKey,
    ) -> Result<Quantity, EngineError> {
        self.yields
            .get(&(observable.clone(), key.clone()))
            .copied()
            .ok_or_else(|| EngineError::UnresolvedKey {
                entry: format!("yield for '{observable}'"),
                key: key.to_string(),
            })
    }

    /// The selection efficiency for an observable at a (channel, era) key.
    pub fn efficiency_for(
        &self,
        observable: &Observable,
        key: &ChannelKey,
    ) -> Result<Quantity, EngineError> {
        self.efficiencies
            .get(&(observable.clone(), key.clone()))
            .copied()
            .ok_or_else(|| EngineError::UnresolvedKey {
                entry: format!("efficiency for '{observable}'"),
                key: key.to_string(),
            })
    }

    /// The integrated luminosity for a (channel, era) key.
    ///
    /// Only rows that request luminosity normalization resolve this; for
    /// them a missing entry is as fatal as a missing yield.
    pub fn luminosity_for(&self, key: &ChannelKey) -> Result<Quantity, EngineError> {
        self.luminosities
            .get(key)
            .copied()
            .ok_or_else(|| EngineError::UnresolvedKey {
                entry: "luminosity".to_string(),
                key: key.to_string(),
            })
    }

    /// A named reference constant (PDG/SM value).
    pub fn reference_for(&self, name: &str) -> Result<Quantity, EngineError> {
        self.references
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UnresolvedReference {
                name: name.to_string(),
            })
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut keys: Vec<&ChannelKey> = self
            .yields
            .keys()
            .chain(self.efficiencies.keys())
            .map(|(_, k)| k)
            .chain(self.luminosities.keys())
            .collect();
        keys.sort();
        keys.dedup();

        DatasetSummary {
            n_keys: keys.len(),
            n_yields: self.yields.len(),
            n_efficiencies: self.efficiencies.len(),
            n_luminosities: self.luminosities.len(),
            n_references: self.references.len(),
        }
    }

    /// Yields in deterministic (observable, key) order.
    pub fn yield_entries(&self) -> impl Iterator<Item = (&Observable, &ChannelKey, Quantity)> {
        self.yields.iter().map(|((o, k), q)| (o, k, *q))
    }

    /// Efficiencies in deterministic (observable, key) order.
    pub fn efficiency_entries(&self) -> impl Iterator<Item = (&Observable, &ChannelKey, Quantity)> {
        self.efficiencies.iter().map(|((o, k), q)| (o, k, *q))
    }

    /// Luminosities in deterministic key order.
    pub fn luminosity_entries(&self) -> impl Iterator<Item = (&ChannelKey, Quantity)> {
        self.luminosities.iter().map(|(k, q)| (k, *q))
    }

    /// Reference constants in name order.
    pub fn reference_entries(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.references.iter().map(|(n, q)| (n.as_str(), *q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Channel;

    #[test]
    fn lookups_return_inserted_quantities() {
        let mut ds = ResolvedDataset::new();
        let key = ChannelKey::new(Channel::Muon, "2022");
        ds.insert_yield("jpsi", key.clone(), Quantity::new(100.0, 10.0));
        ds.insert_efficiency("jpsi", key.clone(), Quantity::new(0.5, 0.01));
        ds.insert_luminosity(key.clone(), Quantity::new(34.0, 0.3));

        let y = ds.yield_for(&"jpsi".into(), &key).unwrap();
        assert!((y.value - 100.0).abs() < 1e-12);
        let e = ds.efficiency_for(&"jpsi".into(), &key).unwrap();
        assert!((e.value - 0.5).abs() < 1e-12);
        let l = ds.luminosity_for(&key).unwrap();
        assert!((l.value - 34.0).abs() < 1e-12);
    }

    #[test]
    fn missing_yield_names_observable_and_key() {
        let ds = ResolvedDataset::new();
        let key = ChannelKey::new(Channel::Electron, "2022");
        let err = ds.yield_for(&"psi2s".into(), &key).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("psi2s"), "message should name the observable: {msg}");
        assert!(msg.contains("ee/2022"), "message should name the key: {msg}");
    }

    #[test]
    fn missing_reference_names_the_constant() {
        let ds = ResolvedDataset::new();
        let err = ds.reference_for("br_b_to_jpsik").unwrap_err();
        assert!(err.to_string().contains("br_b_to_jpsik"));
    }

    #[test]
    fn summary_counts_distinct_keys() {
        let mut ds = ResolvedDataset::new();
        let mu22 = ChannelKey::new(Channel::Muon, "2022");
        let ee22 = ChannelKey::new(Channel::Electron, "2022");
        ds.insert_yield("jpsi", mu22.clone(), Quantity::new(1.0, 0.1));
        ds.insert_efficiency("jpsi", mu22.clone(), Quantity::new(0.5, 0.01));
        ds.insert_yield("jpsi", ee22.clone(), Quantity::new(1.0, 0.1));
        ds.insert_reference("br", Quantity::new(0.05, 0.001));

        let s = ds.summary();
        assert_eq!(s.n_keys, 2);
        assert_eq!(s.n_yields, 2);
        assert_eq!(s.n_efficiencies, 1);
        assert_eq!(s.n_references, 1);
    }
}
