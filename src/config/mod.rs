//! YAML configuration loading and validation.
//!
//! The analysis configuration supplies everything the engine consumes:
//!
//! - `references:` (alias `pdg:`): named constants with `{value, error}`
//! - `channels:`: per channel (`mumu` / `ee`), per era: optional `lumi`,
//!   `yields:` and `effs:` maps of observable quantities
//! - `comparisons:`: optional explicit comparison plan; when absent, the
//!   standard cross-check plan is generated from the configured eras
//!
//! Observable keys accept the historical `n_` / `eff_` prefixes
//! (`n_jpsi` under `yields:` means observable `jpsi`), so existing
//! configuration files keep working unchanged.
//!
//! Schema problems (unreadable file, bad YAML, negative uncertainties) are
//! reported with exit code 2 and a message naming the offending entry.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::ResolvedDataset;
use crate::domain::{
    Channel, ChannelKey, ComparisonGroup, ComparisonSpec, Era, ObservableRef, Quantity,
    ReferenceSpec, RowSpec,
};
use crate::error::AppError;

const SIGNAL_ERA: &str = "2022";
const PRIOR_ERA: &str = "2018";
const CONTROL_OBSERVABLE: &str = "jpsi";
const SIGNAL_OBSERVABLE: &str = "psi2s";

const LABEL_CONTROL: &str = "R(J/ψ) [Control]";
const LABEL_SIGNAL: &str = "R(ψ(2S)) [Signal]";
const LABEL_DOUBLE: &str = "Double Ratio";

/// A raw `{value, error}` pair as written in the configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueWithError {
    pub value: f64,
    pub error: f64,
}

impl ValueWithError {
    /// Validate and convert to an engine quantity.
    ///
    /// `context` names the configuration entry for error messages.
    fn to_quantity(self, context: &str) -> Result<Quantity, AppError> {
        if !self.value.is_finite() {
            return Err(AppError::new(
                2,
                format!("{context}: value must be finite, got {}", self.value),
            ));
        }
        if !(self.error.is_finite() && self.error >= 0.0) {
            return Err(AppError::new(
                2,
                format!(
                    "{context}: error must be finite and >= 0, got {}",
                    self.error
                ),
            ));
        }
        Ok(Quantity::new(self.value, self.error))
    }
}

/// One (channel, era) block of the configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelBlock {
    #[serde(default)]
    pub lumi: Option<ValueWithError>,
    #[serde(default)]
    pub yields: BTreeMap<String, ValueWithError>,
    #[serde(default)]
    pub effs: BTreeMap<String, ValueWithError>,
}

/// The parsed configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Named reference constants (PDG/SM values).
    #[serde(default, alias = "pdg")]
    pub references: BTreeMap<String, ValueWithError>,

    /// Per-channel, per-era yields, efficiencies, and luminosities.
    pub channels: BTreeMap<Channel, BTreeMap<Era, ChannelBlock>>,

    /// Explicit comparison plan. When absent, the standard plan is built
    /// from the configured eras.
    #[serde(default)]
    pub comparisons: Option<Vec<ComparisonGroup>>,
}

impl AnalysisConfig {
    /// The comparison plan to run: explicit when declared, otherwise the
    /// standard cross-check plan.
    pub fn comparison_spec(&self) -> ComparisonSpec {
        match &self.comparisons {
            Some(groups) => ComparisonSpec {
                groups: groups.clone(),
            },
            None => self.default_spec(),
        }
    }

    /// The standard plan, mirroring the analysis' cross-check note:
    /// the signal-era channel comparison, the mixed-era stability check
    /// (only when the earlier muon era is configured), and the internal
    /// ψ(2S)/J/ψ ratios against their expectation.
    fn default_spec(&self) -> ComparisonSpec {
        let mu_signal = ChannelKey::new(Channel::Muon, SIGNAL_ERA);
        let ee_signal = ChannelKey::new(Channel::Electron, SIGNAL_ERA);

        let mut groups = vec![cross_channel_group(
            format!("{SIGNAL_ERA} Era (Muon + Electron)"),
            mu_signal.clone(),
            ee_signal.clone(),
        )];

        let has_prior_muon = self
            .channels
            .get(&Channel::Muon)
            .is_some_and(|eras| eras.contains_key(&Era::new(PRIOR_ERA)));
        if has_prior_muon {
            groups.push(cross_channel_group(
                format!("Mixed Era ({PRIOR_ERA} Muon + {SIGNAL_ERA} Electron)"),
                ChannelKey::new(Channel::Muon, PRIOR_ERA),
                ee_signal.clone(),
            ));
        }

        groups.push(internal_ratio_group(mu_signal, ee_signal));

        ComparisonSpec { groups }
    }
}

/// Dataset plus plan, ready for the comparator.
#[derive(Debug, Clone)]
pub struct LoadedAnalysis {
    pub dataset: ResolvedDataset,
    pub spec: ComparisonSpec,
}

/// Load and validate a configuration file.
pub fn load(path: &Path) -> Result<LoadedAnalysis, AppError> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to read config '{}': {e}", path.display()),
        )
    })?;
    from_yaml(&content)
}

/// Parse and validate a configuration document.
pub fn from_yaml(content: &str) -> Result<LoadedAnalysis, AppError> {
    let config: AnalysisConfig = serde_yaml::from_str(content)
        .map_err(|e| AppError::new(2, format!("Invalid YAML configuration: {e}")))?;

    let dataset = build_dataset(&config)?;
    let spec = config.comparison_spec();
    Ok(LoadedAnalysis { dataset, spec })
}

fn build_dataset(config: &AnalysisConfig) -> Result<ResolvedDataset, AppError> {
    let mut dataset = ResolvedDataset::new();

    for (name, vwe) in &config.references {
        let q = vwe.to_quantity(&format!("references.{name}"))?;
        dataset.insert_reference(name.clone(), q);
    }

    for (channel, eras) in &config.channels {
        for (era, block) in eras {
            let key = ChannelKey::new(*channel, era.clone());
            let context = format!("channels.{channel}.{era}");

            if let Some(lumi) = &block.lumi {
                let q = lumi.to_quantity(&format!("{context}.lumi"))?;
                dataset.insert_luminosity(key.clone(), q);
            }
            for (raw, vwe) in &block.yields {
                let observable = yield_observable(raw);
                let q = vwe.to_quantity(&format!("{context}.yields.{raw}"))?;
                dataset.insert_yield(observable, key.clone(), q);
            }
            for (raw, vwe) in &block.effs {
                let observable = eff_observable(raw);
                let q = vwe.to_quantity(&format!("{context}.effs.{raw}"))?;
                dataset.insert_efficiency(observable, key.clone(), q);
            }
        }
    }

    Ok(dataset)
}

/// Strip the historical `n_` prefix from yield keys (`n_jpsi` -> `jpsi`).
fn yield_observable(raw: &str) -> &str {
    raw.strip_prefix("n_").unwrap_or(raw)
}

/// Strip the historical `eff_` prefix from efficiency keys.
fn eff_observable(raw: &str) -> &str {
    raw.strip_prefix("eff_").unwrap_or(raw)
}

fn cross_channel_group(title: String, muon: ChannelKey, electron: ChannelKey) -> ComparisonGroup {
    ComparisonGroup {
        title,
        rows: vec![
            RowSpec::Ratio {
                label: LABEL_CONTROL.to_string(),
                numerator: ObservableRef::new(CONTROL_OBSERVABLE, muon.clone()),
                denominator: ObservableRef::new(CONTROL_OBSERVABLE, electron.clone()),
                lumi_normalized: true,
                reference: Some(ReferenceSpec::Unity),
            },
            RowSpec::Ratio {
                label: LABEL_SIGNAL.to_string(),
                numerator: ObservableRef::new(SIGNAL_OBSERVABLE, muon),
                denominator: ObservableRef::new(SIGNAL_OBSERVABLE, electron),
                lumi_normalized: true,
                reference: Some(ReferenceSpec::Unity),
            },
            RowSpec::DoubleRatio {
                label: LABEL_DOUBLE.to_string(),
                numerator: LABEL_SIGNAL.to_string(),
                denominator: LABEL_CONTROL.to_string(),
                reference: Some(ReferenceSpec::Unity),
            },
        ],
    }
}

fn internal_ratio_group(muon: ChannelKey, electron: ChannelKey) -> ComparisonGroup {
    let expectation = |lepton: &str| ReferenceSpec::ConstantRatio {
        numerator: vec![
            "br_b_to_psi2sk".to_string(),
            format!("br_psi2s_to_{lepton}"),
        ],
        denominator: vec![
            "br_b_to_jpsik".to_string(),
            format!("br_jpsi_to_{lepton}"),
        ],
    };

    ComparisonGroup {
        title: "Internal Ratios (ψ(2S) / J/ψ)".to_string(),
        rows: vec![
            RowSpec::Ratio {
                label: format!("{} ({SIGNAL_ERA})", Channel::Muon.display_name()),
                numerator: ObservableRef::new(SIGNAL_OBSERVABLE, muon.clone()),
                denominator: ObservableRef::new(CONTROL_OBSERVABLE, muon),
                lumi_normalized: false,
                reference: Some(expectation("mumu")),
            },
            RowSpec::Ratio {
                label: format!("{} ({SIGNAL_ERA})", Channel::Electron.display_name()),
                numerator: ObservableRef::new(SIGNAL_OBSERVABLE, electron.clone()),
                denominator: ObservableRef::new(CONTROL_OBSERVABLE, electron),
                lumi_normalized: false,
                reference: Some(expectation("ee")),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
pdg:
  br_b_to_jpsik: { value: 1.02e-3, error: 1.9e-5 }
  br_b_to_psi2sk: { value: 6.24e-4, error: 2.1e-5 }
  br_jpsi_to_mumu: { value: 5.961e-2, error: 3.3e-4 }
  br_psi2s_to_mumu: { value: 8.0e-3, error: 6.0e-4 }
  br_jpsi_to_ee: { value: 5.971e-2, error: 3.2e-4 }
  br_psi2s_to_ee: { value: 7.93e-3, error: 1.7e-4 }
channels:
  mumu:
    2018:
      lumi: { value: 59.8, error: 1.5 }
      yields:
        n_jpsi: { value: 3514204.0, error: 1554.0 }
        n_psi2s: { value: 221543.0, error: 512.0 }
      effs:
        eff_jpsi: { value: 0.00412, error: 0.00001 }
        eff_psi2s: { value: 0.00389, error: 0.00001 }
    2022:
      lumi: { value: 34.3, error: 0.9 }
      yields:
        n_jpsi: { value: 3921547.0, error: 1641.0 }
        n_psi2s: { value: 247551.0, error: 543.0 }
      effs:
        eff_jpsi: { value: 0.00453, error: 0.00001 }
        eff_psi2s: { value: 0.00431, error: 0.00001 }
  ee:
    2022:
      lumi: { value: 34.3, error: 0.9 }
      yields:
        n_jpsi: { value: 487231.0, error: 912.0 }
        n_psi2s: { value: 29871.0, error: 254.0 }
      effs:
        eff_jpsi: { value: 0.00058, error: 0.00001 }
        eff_psi2s: { value: 0.00054, error: 0.00001 }
";

    #[test]
    fn sample_config_parses_and_resolves() {
        let loaded = from_yaml(SAMPLE).unwrap();
        let summary = loaded.dataset.summary();
        assert_eq!(summary.n_keys, 3);
        assert_eq!(summary.n_yields, 6);
        assert_eq!(summary.n_efficiencies, 6);
        assert_eq!(summary.n_luminosities, 3);
        assert_eq!(summary.n_references, 6);

        // Prefixes are stripped: `n_jpsi`/`eff_jpsi` resolve as `jpsi`.
        let mu22 = ChannelKey::new(Channel::Muon, "2022");
        let y = loaded.dataset.yield_for(&"jpsi".into(), &mu22).unwrap();
        assert!((y.value - 3_921_547.0).abs() < 1e-6);
        let e = loaded.dataset.efficiency_for(&"jpsi".into(), &mu22).unwrap();
        assert!((e.value - 0.00453).abs() < 1e-12);
    }

    #[test]
    fn default_plan_has_signal_mixed_and_internal_groups() {
        let loaded = from_yaml(SAMPLE).unwrap();
        let titles: Vec<&str> = loaded
            .spec
            .groups
            .iter()
            .map(|g| g.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec![
                "2022 Era (Muon + Electron)",
                "Mixed Era (2018 Muon + 2022 Electron)",
                "Internal Ratios (ψ(2S) / J/ψ)",
            ]
        );

        let era_2022 = &loaded.spec.groups[0];
        let labels: Vec<&str> = era_2022.rows.iter().map(RowSpec::label).collect();
        assert_eq!(
            labels,
            vec!["R(J/ψ) [Control]", "R(ψ(2S)) [Signal]", "Double Ratio"]
        );
    }

    #[test]
    fn mixed_era_group_is_omitted_without_the_prior_muon_era() {
        let trimmed = SAMPLE.replace(
            "  mumu:
    2018:
      lumi: { value: 59.8, error: 1.5 }
      yields:
        n_jpsi: { value: 3514204.0, error: 1554.0 }
        n_psi2s: { value: 221543.0, error: 512.0 }
      effs:
        eff_jpsi: { value: 0.00412, error: 0.00001 }
        eff_psi2s: { value: 0.00389, error: 0.00001 }
    2022:",
            "  mumu:
    2022:",
        );
        let loaded = from_yaml(&trimmed).unwrap();
        assert_eq!(loaded.spec.groups.len(), 2);
        assert!(loaded.spec.groups.iter().all(|g| !g.title.contains("Mixed")));
    }

    #[test]
    fn negative_error_is_rejected_with_the_entry_name() {
        let bad = SAMPLE.replace(
            "n_jpsi: { value: 3921547.0, error: 1641.0 }",
            "n_jpsi: { value: 3921547.0, error: -1.0 }",
        );
        let err = from_yaml(&bad).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let msg = err.to_string();
        assert!(msg.contains("channels.mumu.2022.yields.n_jpsi"), "{msg}");
    }

    #[test]
    fn explicit_comparisons_override_the_default_plan() {
        let explicit = format!(
            "{SAMPLE}
comparisons:
  - title: Just one check
    rows:
      - type: ratio
        label: \"R(J/ψ) [Control]\"
        numerator: {{ observable: jpsi, channel: mumu, era: 2022 }}
        denominator: {{ observable: jpsi, channel: ee, era: 2022 }}
        lumi_normalized: true
        reference: unity
"
        );
        let loaded = from_yaml(&explicit).unwrap();
        assert_eq!(loaded.spec.groups.len(), 1);
        assert_eq!(loaded.spec.groups[0].title, "Just one check");
    }

    #[test]
    fn end_to_end_default_plan_runs_on_the_sample() {
        let loaded = from_yaml(SAMPLE).unwrap();
        let report =
            crate::engine::run_comparisons(&loaded.spec, &loaded.dataset).unwrap();
        assert_eq!(report.groups.len(), 3);

        // Every declared row produced exactly one result row, in order.
        for (group, spec_group) in report.groups.iter().zip(&loaded.spec.groups) {
            assert_eq!(group.rows.len(), spec_group.rows.len());
            for (row, spec_row) in group.rows.iter().zip(&spec_group.rows) {
                assert_eq!(row.ratio.label, spec_row.label());
                assert!(row.pull.is_some());
                assert!(row.ratio.quantity.value.is_finite());
                assert!(row.ratio.quantity.uncertainty >= 0.0);
            }
        }
    }
}
