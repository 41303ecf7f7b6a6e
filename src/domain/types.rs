//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the ratio/pull engine
//! - parsed from the YAML analysis configuration
//! - exported to JSON for downstream tooling

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A measured number with a one-standard-deviation symmetric uncertainty.
///
/// Quantities are value types: immutable once constructed, freely copied,
/// no shared state. The uncertainty is absolute and never negative; an
/// uncertainty of exactly 0 denotes an exact constant (e.g., the reference
/// value 1.0).
///
/// External inputs are validated at the configuration boundary; everything
/// the engine constructs preserves non-negativity because uncertainties are
/// produced as `|value| * sqrt(..)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    /// One standard deviation, absolute.
    pub uncertainty: f64,
}

impl Quantity {
    /// Construct a quantity. Callers must supply a non-negative uncertainty.
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self { value, uncertainty }
    }

    /// An exact constant (uncertainty 0).
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            uncertainty: 0.0,
        }
    }

    /// True when this quantity carries no uncertainty at all.
    ///
    /// The comparison is against exactly 0.0: uncertainties are either
    /// supplied as literal zeros or produced as square roots of sums of
    /// squares, so an exact constant keeps `uncertainty == 0.0` bit-for-bit.
    pub fn is_exact(&self) -> bool {
        self.uncertainty == 0.0
    }
}

/// Lepton channel of the analysis.
///
/// Serialized with the configuration's channel keys (`mumu`, `ee`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "mumu")]
    Muon,
    #[serde(rename = "ee")]
    Electron,
}

impl Channel {
    /// The configuration key for this channel.
    pub fn key_name(self) -> &'static str {
        match self {
            Channel::Muon => "mumu",
            Channel::Electron => "ee",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Channel::Muon => "Muons",
            Channel::Electron => "Electrons",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// A labeled data-taking period ("2018", "2022").
///
/// Eras are an open set, so this is a string label rather than a closed
/// enum. Deserialization accepts both string and integer scalars: YAML
/// parses an unquoted mapping key like `2022:` as an integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Era(String);

impl Era {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Era {
    fn from(label: &str) -> Self {
        Era::new(label)
    }
}

impl From<String> for Era {
    fn from(label: String) -> Self {
        Era(label)
    }
}

impl<'de> Deserialize<'de> for Era {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EraVisitor;

        impl Visitor<'_> for EraVisitor {
            type Value = Era;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an era label (string or year number)")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Era, E> {
                Ok(Era::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Era, E> {
                Ok(Era::new(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Era, E> {
                Ok(Era::new(v.to_string()))
            }
        }

        deserializer.deserialize_any(EraVisitor)
    }
}

/// Name of an observed decay mode ("jpsi", "psi2s").
///
/// At most one yield and one efficiency quantity exist per
/// `(Observable, ChannelKey)` pair in a resolved dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observable(String);

impl Observable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Observable {
    fn from(name: &str) -> Self {
        Observable::new(name)
    }
}

/// Addresses one (channel, era) block of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    pub channel: Channel,
    pub era: Era,
}

impl ChannelKey {
    pub fn new(channel: Channel, era: impl Into<Era>) -> Self {
        Self {
            channel,
            era: era.into(),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel, self.era)
    }
}

/// One side of a ratio definition: an observable at a (channel, era) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservableRef {
    pub observable: Observable,
    #[serde(flatten)]
    pub key: ChannelKey,
}

impl ObservableRef {
    pub fn new(observable: impl Into<Observable>, key: ChannelKey) -> Self {
        Self {
            observable: observable.into(),
            key,
        }
    }
}

/// A computed ratio with its caller-supplied label.
///
/// Labels are preserved verbatim for downstream reporting; the engine never
/// synthesizes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioResult {
    pub quantity: Quantity,
    pub label: String,
}

/// The tension between a measured quantity and a reference, in combined
/// standard deviations.
///
/// `deviation_sigma` is signed (measured minus reference); presentation
/// (absolute value, rounding, the "σ" suffix) is the report layer's choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PullResult {
    pub deviation_sigma: f64,
    pub measured: Quantity,
    pub reference: Quantity,
}

/// How a pull reference is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSpec {
    /// The exact constant 1.0 (the Standard-Model expectation for R).
    Unity,
    /// A single named constant from the reference table.
    Constant(String),
    /// A ratio of products of named constants, e.g.
    /// `(br_b_to_psi2sk · br_psi2s_to_mumu) / (br_b_to_jpsik · br_jpsi_to_mumu)`.
    ConstantRatio {
        numerator: Vec<String>,
        denominator: Vec<String>,
    },
}

/// One row of a comparison group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowSpec {
    /// An efficiency-corrected yield ratio between two observable refs.
    Ratio {
        label: String,
        numerator: ObservableRef,
        denominator: ObservableRef,
        /// Divide each yield by its era luminosity before efficiency
        /// correction. Required for cross-channel/era ratios; internal
        /// same-channel ratios leave it off (the luminosity cancels).
        #[serde(default)]
        lumi_normalized: bool,
        #[serde(default)]
        reference: Option<ReferenceSpec>,
    },
    /// A ratio of two ratio rows declared earlier in the same group.
    DoubleRatio {
        label: String,
        numerator: String,
        denominator: String,
        #[serde(default)]
        reference: Option<ReferenceSpec>,
    },
}

impl RowSpec {
    /// The row's display label, preserved verbatim into results.
    pub fn label(&self) -> &str {
        match self {
            RowSpec::Ratio { label, .. } | RowSpec::DoubleRatio { label, .. } => label,
        }
    }
}

/// An ordered, titled list of comparison rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonGroup {
    pub title: String,
    pub rows: Vec<RowSpec>,
}

/// The full declared comparison plan. Group and row order is significant:
/// the output table is read top-to-bottom by analysts and must match the
/// declared order exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSpec {
    pub groups: Vec<ComparisonGroup>,
}

/// One computed row: the ratio, plus the pull when a reference was declared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowResult {
    pub ratio: RatioResult,
    pub pull: Option<PullResult>,
}

/// One computed group, in declared row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResult {
    pub title: String,
    pub rows: Vec<RowResult>,
}

/// The full comparison output, in declared group order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub groups: Vec<GroupResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn era_deserializes_from_string_and_integer_scalars() {
        let from_str: Era = serde_yaml::from_str("\"2022\"").unwrap();
        let from_int: Era = serde_yaml::from_str("2022").unwrap();
        assert_eq!(from_str, from_int);
        assert_eq!(from_int.as_str(), "2022");
    }

    #[test]
    fn era_map_keys_accept_unquoted_years() {
        use std::collections::BTreeMap;
        let parsed: BTreeMap<Era, String> =
            serde_yaml::from_str("2018: a\n\"2022\": b\n").unwrap();
        let keys: Vec<&str> = parsed.keys().map(Era::as_str).collect();
        assert_eq!(keys, vec!["2018", "2022"]);
    }

    #[test]
    fn channel_key_display_matches_config_keys() {
        let key = ChannelKey::new(Channel::Muon, "2022");
        assert_eq!(key.to_string(), "mumu/2022");
        let key = ChannelKey::new(Channel::Electron, "2018");
        assert_eq!(key.to_string(), "ee/2018");
    }

    #[test]
    fn observable_ref_flattens_channel_and_era() {
        let yaml = "observable: jpsi\nchannel: mumu\nera: 2022\n";
        let r: ObservableRef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(r.observable.as_str(), "jpsi");
        assert_eq!(r.key, ChannelKey::new(Channel::Muon, "2022"));
    }

    #[test]
    fn row_spec_is_tagged_by_type() {
        let yaml = "\
type: double_ratio
label: Double Ratio
numerator: \"R(ψ(2S)) [Signal]\"
denominator: \"R(J/ψ) [Control]\"
reference: unity
";
        let row: RowSpec = serde_yaml::from_str(yaml).unwrap();
        match row {
            RowSpec::DoubleRatio {
                label, reference, ..
            } => {
                assert_eq!(label, "Double Ratio");
                assert_eq!(reference, Some(ReferenceSpec::Unity));
            }
            other => panic!("expected a double_ratio row, got {other:?}"),
        }
    }
}
