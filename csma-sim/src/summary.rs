use csma_core::{NodeId, Parameters, SimReport, Slot};
use std::fmt;
use tracing::info;

/// Per-transmitter outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmitterSummary {
    pub id: NodeId,
    pub successes: u64,
    pub collisions: u64,
    /// acknowledged payload over the simulated time
    pub throughput_kbps: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub transmitters: Vec<TransmitterSummary>,
    pub acknowledged: u64,
    pub collisions: u64,
    pub final_slot: Slot,
    /// Jain's index over the transmitters' throughput
    pub fairness: f64,
}

impl Summary {
    pub fn new(report: &SimReport, parameters: &Parameters) -> Self {
        let nanos = parameters.simulation_time.into_duration().as_nanos() as f64;
        let bits = parameters.payload_bits() as f64;

        let transmitters: Vec<_> = report
            .transmitters()
            .map(|node| TransmitterSummary {
                id: node.id,
                successes: node.successes,
                collisions: node.collisions,
                throughput_kbps: if nanos > 0.0 {
                    node.successes as f64 * bits * 1_000_000.0 / nanos
                } else {
                    0.0
                },
            })
            .collect();

        let throughput: Vec<f64> = transmitters.iter().map(|tx| tx.throughput_kbps).collect();

        Self {
            fairness: jain_index(&throughput),
            acknowledged: report.total_successes(),
            collisions: report.total_collisions(),
            final_slot: report.final_slot,
            transmitters,
        }
    }

    pub fn total_throughput_kbps(&self) -> f64 {
        self.transmitters.iter().map(|tx| tx.throughput_kbps).sum()
    }

    pub fn log(&self) {
        for tx in &self.transmitters {
            info!(
                node = %tx.id,
                successes = tx.successes,
                collisions = tx.collisions,
                throughput_kbps = tx.throughput_kbps,
                "transmitter"
            );
        }
        info!(
            acknowledged = self.acknowledged,
            collisions = self.collisions,
            fairness = self.fairness,
            final_slot = self.final_slot,
            "summary"
        );
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>6} {:>10} {:>10} {:>16}",
            "node", "successes", "collisions", "throughput kbps"
        )?;
        for tx in &self.transmitters {
            writeln!(
                f,
                "{:>6} {:>10} {:>10} {:>16.1}",
                tx.id, tx.successes, tx.collisions, tx.throughput_kbps
            )?;
        }
        writeln!(f, "total throughput: {:.1} kbps", self.total_throughput_kbps())?;
        writeln!(f, "collisions: {}", self.collisions)?;
        write!(f, "fairness index: {:.3}", self.fairness)
    }
}

/// Jain's fairness index `(Σx)² / (n·Σx²)`.
///
/// `1.0` when every value is equal (including all zero), down to `1/n`
/// when a single value takes everything. An empty slice is perfectly fair.
pub fn jain_index(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    let squares: f64 = values.iter().map(|x| x * x).sum();

    if values.is_empty() || squares == 0.0 {
        return 1.0;
    }

    sum * sum / (values.len() as f64 * squares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csma_core::{NodeKind, NodeReport, history::History};

    fn node(id: u64, kind: NodeKind, successes: u64, collisions: u64) -> NodeReport {
        NodeReport {
            id: NodeId::new(id),
            kind,
            domains: Vec::new(),
            successes,
            collisions,
            history: History::new(),
        }
    }

    #[test]
    fn jain_bounds() {
        assert_eq!(jain_index(&[]), 1.0);
        assert_eq!(jain_index(&[0.0, 0.0]), 1.0);
        assert_eq!(jain_index(&[3.0, 3.0, 3.0]), 1.0);
        assert_eq!(jain_index(&[5.0, 0.0, 0.0, 0.0]), 0.25);
        assert!((jain_index(&[1.0, 2.0]) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn throughput_in_kbps() {
        let report = SimReport {
            nodes: vec![
                node(1, NodeKind::Transmitter, 10, 2),
                node(2, NodeKind::Transmitter, 5, 2),
                node(3, NodeKind::AccessPoint, 15, 2),
            ],
            final_slot: 1_004,
        };
        // 1500 bytes over 10ms: one frame is 1200 kbps
        let summary = Summary::new(&report, &Parameters::default());

        assert_eq!(summary.transmitters.len(), 2);
        assert_eq!(summary.transmitters[0].throughput_kbps, 12_000.0);
        assert_eq!(summary.transmitters[1].throughput_kbps, 6_000.0);
        assert_eq!(summary.total_throughput_kbps(), 18_000.0);
        assert_eq!(summary.acknowledged, 15);
        assert_eq!(summary.collisions, 4);
        assert_eq!(summary.final_slot, 1_004);
        assert!((summary.fairness - 0.9).abs() < 1e-12);
    }

    #[test]
    fn display_lists_every_transmitter() {
        let report = SimReport {
            nodes: vec![node(1, NodeKind::Transmitter, 1, 0)],
            final_slot: 0,
        };
        let text = Summary::new(&report, &Parameters::default()).to_string();

        assert!(text.contains("1200.0"));
        assert!(text.contains("collisions: 0"));
        assert!(text.ends_with("fairness index: 1.000"));
    }
}
