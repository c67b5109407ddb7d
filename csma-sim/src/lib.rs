/*!
Driver for the [`csma_core`] simulator.

Turns a [`Scenario`] (usually loaded from a TOML file) into a
[`Network`], runs it to the end of the slot budget and summarises the
outcome.

```
use csma_sim::{Scenario, run};

let scenario: Scenario = r#"
    [[domains]]
    transmitters = [{ arrivals = [0, 1000] }]
"#
.parse()
.unwrap();

let outcome = run(&scenario, 7).unwrap();
assert_eq!(outcome.report.total_successes(), 1);
```
*/

pub mod config;
pub mod summary;
pub mod timeline;

pub use self::{
    config::{DomainConfig, ParameterOverrides, Scenario, TransmitterConfig},
    summary::{Summary, TransmitterSummary, jain_index},
    timeline::write_timeline,
};

use anyhow::{Context as _, Result};
use csma_core::{Network, Parameters, SimReport, poisson_arrivals};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;
use tracing::{debug, info};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub seed: u64,
    pub parameters: Parameters,
    pub report: SimReport,
    pub summary: Summary,
}

/// Build the network described by `scenario`.
///
/// Backoff draws are seeded with `seed`; the Poisson traffic of the
/// transmitters without explicit arrivals comes from a second generator
/// derived from the same seed.
pub fn build_network(scenario: &Scenario, seed: u64) -> Result<(Network, Parameters)> {
    let parameters = scenario.parameters()?;
    let mut network =
        Network::from_parameters(&parameters).context("Invalid simulation parameters")?;
    network.set_seed(seed);

    let mut traffic = ChaChaRng::seed_from_u64(seed.wrapping_add(1));
    let horizon = network.slot_budget();

    for (index, config) in scenario.domains.iter().enumerate() {
        let domain = network.add_collision_domain();

        for tx in &config.transmitters {
            let arrivals = match &tx.arrivals {
                Some(arrivals) => arrivals.clone(),
                None => poisson_arrivals(
                    &mut traffic,
                    tx.rate.unwrap_or(scenario.arrival_rate),
                    horizon,
                    parameters.slot_duration,
                ),
            };
            let frames = arrivals.len();
            let id = network
                .new_transmitter(arrivals)
                .join(domain)
                .build()
                .with_context(|| format!("Failed to add a transmitter to domain #{index}"))?;
            debug!(node = %id, %domain, frames, "transmitter");
        }

        for _ in 0..config.access_points {
            network
                .new_access_point()
                .join(domain)
                .build()
                .with_context(|| format!("Failed to add an access point to domain #{index}"))?;
        }
    }

    Ok((network, parameters))
}

/// Build and run `scenario` to the end of its slot budget.
pub fn run(scenario: &Scenario, seed: u64) -> Result<Outcome> {
    let (mut network, parameters) = build_network(scenario, seed)?;

    info!(
        seed,
        slots = network.slot_budget(),
        data_slots = network.timing().data,
        "scenario built"
    );
    network.log_structure();
    network.run().context("Simulation aborted")?;

    let report = network.into_sink();
    let summary = Summary::new(&report, &parameters);
    summary.log();

    Ok(Outcome {
        seed,
        parameters,
        report,
        summary,
    })
}
