//! Scenario files.
//!
//! A scenario describes one run: the physical parameters (anything left
//! out keeps its default), the traffic, and the collision domains with
//! their stations.
//!
//! ```toml
//! seed = 42
//! arrival_rate = 1000.0
//!
//! [parameters]
//! slot_duration = "10us"
//! simulation_time = "10ms"
//! bandwidth = "10mbps"
//!
//! [[domains]]
//! access_points = 1
//! transmitters = [{}, { arrivals = [0, 120, 480] }]
//! ```

use anyhow::{Context as _, Result, ensure};
use csma_core::{Parameters, Slot};
use serde::Deserialize;
use std::{fs, path::Path, str::FromStr};

const DEFAULT_ARRIVAL_RATE: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// seed of the backoff draws and of the generated traffic
    #[serde(default)]
    pub seed: Option<u64>,
    /// Poisson arrival rate (frames per second) of every transmitter
    /// without explicit arrivals
    #[serde(default = "default_arrival_rate")]
    pub arrival_rate: f64,
    #[serde(default)]
    pub parameters: ParameterOverrides,
    pub domains: Vec<DomainConfig>,
}

/// Values replacing the [`Parameters::default`] ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterOverrides {
    pub slot_duration: Option<String>,
    pub simulation_time: Option<String>,
    pub bandwidth: Option<String>,
    pub payload_bytes: Option<u64>,
    pub difs: Option<Slot>,
    pub sifs: Option<Slot>,
    pub ack: Option<Slot>,
    pub cw_min: Option<Slot>,
    pub cw_max: Option<Slot>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    #[serde(default)]
    pub transmitters: Vec<TransmitterConfig>,
    #[serde(default = "default_access_points")]
    pub access_points: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransmitterConfig {
    /// explicit arrival slots; generated from a Poisson process otherwise
    pub arrivals: Option<Vec<Slot>>,
    /// per-transmitter override of the scenario's arrival rate
    pub rate: Option<f64>,
}

fn default_arrival_rate() -> f64 {
    DEFAULT_ARRIVAL_RATE
}

fn default_access_points() -> usize {
    1
}

impl Scenario {
    /// Load a scenario from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to load scenario file {}", path.display()))
    }

    /// The defaults with this scenario's overrides applied.
    pub fn parameters(&self) -> Result<Parameters> {
        self.parameters.apply(Parameters::default())
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.domains.is_empty(), "a scenario needs at least one domain");
        ensure!(
            self.arrival_rate.is_finite() && self.arrival_rate >= 0.0,
            "arrival_rate must be a non-negative number, got {}",
            self.arrival_rate
        );
        for (index, domain) in self.domains.iter().enumerate() {
            for tx in &domain.transmitters {
                if let Some(rate) = tx.rate {
                    ensure!(
                        rate.is_finite() && rate >= 0.0,
                        "domain #{index}: transmitter rate must be a non-negative number, got {rate}"
                    );
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scenario: Self = toml::from_str(s).context("Failed to parse scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }
}

impl ParameterOverrides {
    pub fn apply(&self, mut parameters: Parameters) -> Result<Parameters> {
        if let Some(value) = &self.slot_duration {
            parameters.slot_duration = value
                .parse()
                .with_context(|| format!("Invalid slot_duration `{value}'"))?;
        }
        if let Some(value) = &self.simulation_time {
            parameters.simulation_time = value
                .parse()
                .with_context(|| format!("Invalid simulation_time `{value}'"))?;
        }
        if let Some(value) = &self.bandwidth {
            parameters.bandwidth = value
                .parse()
                .with_context(|| format!("Invalid bandwidth `{value}'"))?;
        }

        let slots = [
            (self.payload_bytes, &mut parameters.payload_bytes),
            (self.difs, &mut parameters.difs),
            (self.sifs, &mut parameters.sifs),
            (self.ack, &mut parameters.ack),
            (self.cw_min, &mut parameters.cw_min),
            (self.cw_max, &mut parameters.cw_max),
        ];
        for (value, field) in slots {
            if let Some(value) = value {
                *field = value;
            }
        }

        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csma_core::{Bandwidth, time::Duration};

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario: Scenario = "[[domains]]".parse().unwrap();

        assert_eq!(scenario.seed, None);
        assert_eq!(scenario.arrival_rate, DEFAULT_ARRIVAL_RATE);
        assert_eq!(scenario.domains.len(), 1);
        assert_eq!(scenario.domains[0].access_points, 1);
        assert!(scenario.domains[0].transmitters.is_empty());
        assert_eq!(scenario.parameters().unwrap(), Parameters::default());
    }

    #[test]
    fn overrides_apply() {
        let scenario: Scenario = r#"
            seed = 3
            [parameters]
            slot_duration = "20us"
            simulation_time = "1s"
            bandwidth = "54mbps"
            cw_min = 16

            [[domains]]
            access_points = 2
            transmitters = [{ arrivals = [0, 10] }, { rate = 50.0 }]
        "#
        .parse()
        .unwrap();

        let parameters = scenario.parameters().unwrap();
        assert_eq!(parameters.slot_duration, Duration::from_micros(20));
        assert_eq!(parameters.simulation_time, Duration::from_millis(1_000));
        assert_eq!(parameters.bandwidth, Bandwidth::new(54_000_000));
        assert_eq!(parameters.cw_min, 16);
        assert_eq!(parameters.cw_max, Parameters::default().cw_max);

        let domain = &scenario.domains[0];
        assert_eq!(domain.access_points, 2);
        assert_eq!(domain.transmitters[0].arrivals, Some(vec![0, 10]));
        assert_eq!(domain.transmitters[1].rate, Some(50.0));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!("[[domains]]\nrouters = 2".parse::<Scenario>().is_err());
    }

    #[test]
    fn rejects_missing_domains() {
        assert!("seed = 1".parse::<Scenario>().is_err());
        assert!("domains = []".parse::<Scenario>().is_err());
    }

    #[test]
    fn rejects_negative_rates() {
        assert!("arrival_rate = -1.0\n[[domains]]".parse::<Scenario>().is_err());
    }

    #[test]
    fn invalid_units_are_reported() {
        let scenario: Scenario = "[parameters]\nbandwidth = \"10 furlongs\"\n[[domains]]"
            .parse()
            .unwrap();
        let error = scenario.parameters().unwrap_err();
        assert!(error.to_string().contains("Invalid bandwidth"));
    }
}
