//! End-of-run reporting.
//!
//! The [`Network`](crate::network::Network) owns one [`ReportSink`] for the
//! lifetime of a run and hands it every station's [`NodeReport`] once the
//! slot budget is used up. [`SimReport`] simply collects them.

use crate::{DomainId, NodeId, NodeKind, Slot, history::History};

/// Final counters and timeline of one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeReport {
    pub id: NodeId,
    pub kind: NodeKind,
    pub domains: Vec<DomainId>,
    /// acknowledged frames (transmitter) or ACKs sent (access point)
    pub successes: u64,
    /// collisions observed by this station
    pub collisions: u64,
    pub history: History,
}

/// Receives the outcome of a run.
pub trait ReportSink {
    fn node(&mut self, report: NodeReport);

    /// Called once after the last [`node`](ReportSink::node) call.
    fn finish(&mut self, _final_slot: Slot) {}
}

/// The default sink: keeps every report in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimReport {
    pub nodes: Vec<NodeReport>,
    pub final_slot: Slot,
}

impl SimReport {
    pub fn get(&self, id: NodeId) -> Option<&NodeReport> {
        self.nodes.iter().find(|report| report.id == id)
    }

    pub fn transmitters(&self) -> impl Iterator<Item = &NodeReport> {
        self.nodes
            .iter()
            .filter(|report| report.kind == NodeKind::Transmitter)
    }

    pub fn access_points(&self) -> impl Iterator<Item = &NodeReport> {
        self.nodes
            .iter()
            .filter(|report| report.kind == NodeKind::AccessPoint)
    }

    /// Frames acknowledged across all transmitters.
    pub fn total_successes(&self) -> u64 {
        self.transmitters().map(|report| report.successes).sum()
    }

    /// Collisions seen by the transmitters.
    pub fn total_collisions(&self) -> u64 {
        self.transmitters().map(|report| report.collisions).sum()
    }
}

impl ReportSink for SimReport {
    fn node(&mut self, report: NodeReport) {
        self.nodes.push(report);
    }

    fn finish(&mut self, final_slot: Slot) {
        self.final_slot = final_slot;
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn node(&mut self, report: NodeReport) {
        (**self).node(report)
    }

    fn finish(&mut self, final_slot: Slot) {
        (**self).finish(final_slot)
    }
}
