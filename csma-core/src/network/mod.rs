mod round;

use crate::{
    ArrivalQueue, Backoff, CollisionDomain, DomainId, Event, Slot, Timing, TimingError,
    node::{AccessPoint, Node, NodeId, NodeKind, ProtocolViolation, Station, Transmitter},
    report::{ReportSink, SimReport},
    timing::Parameters,
    traffic::UnsortedArrivals,
};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, error, info, trace};

pub use self::round::Round;

/// This is the entry point for running a CSMA/CA simulation.
///
/// The [`Network`] owns every station, the slot budget of the run and the
/// current slot. Stations are independent state machines: the network only
/// talks to them through [`Station`], one decision point (a [`Round`]) at a
/// time:
///
/// 1. every station declares its next [`Event`];
/// 2. the events starting at the earliest slot win the medium (more than
///    one winner is a collision on the medium);
/// 3. winners are told they are on the air, then every other station
///    receives each winning event;
/// 4. the clock moves to the end of the winners' reservation (NAV).
///
/// Backoff draws come from `B` (a seeded [`ChaChaRng`] by default) and the
/// final per-station reports go to the [`ReportSink`] `S`.
///
/// ## Example
///
/// ```
/// use csma_core::{network::Network, Timing};
///
/// let mut network = Network::new(Timing::default(), 1_000).unwrap();
/// network.set_seed(42);
/// let domain = network.add_collision_domain();
/// let tx = network.new_transmitter([0, 1_000]).join(domain).build().unwrap();
/// network.new_access_point().join(domain).build().unwrap();
///
/// network.run().unwrap();
/// assert_eq!(network.sink().get(tx).unwrap().successes, 1);
/// ```
pub struct Network<S = SimReport, B = ChaChaRng> {
    timing: Timing,

    slot_budget: Slot,
    current_slot: Slot,
    round: Round,

    nodes: BTreeMap<NodeId, Node>,
    domains: BTreeMap<DomainId, CollisionDomain>,

    /// the events selected by the last round
    on_air: Vec<Event>,

    /// the last assigned ID
    ///
    /// ID 0 is never given
    id: NodeId,

    backoff: B,
    sink: S,
}

/// A run cannot continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error(transparent)]
    ProtocolViolation(#[from] ProtocolViolation),
    /// No station has anything to declare although slots remain.
    #[error("scheduler stalled at slot {slot}: no station has anything to offer before the budget of {budget} slots")]
    SchedulerStall { slot: Slot, budget: Slot },
}

/// Error returned when a station cannot be added to the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Collision domain ({domain}) Not Found: call add_collision_domain first")]
    UnknownDomain { domain: DomainId },
    #[error("a {kind} node must join at least one collision domain")]
    NoDomain { kind: NodeKind },
    #[error("{0}")]
    UnsortedArrivals(#[from] UnsortedArrivals),
}

/// Builder for a transmitter, obtained via [`Network::new_transmitter`].
pub struct TransmitterBuilder<'a, S, B> {
    arrivals: Vec<Slot>,
    domains: BTreeSet<DomainId>,
    network: &'a mut Network<S, B>,
}

/// Builder for an access point, obtained via [`Network::new_access_point`].
pub struct AccessPointBuilder<'a, S, B> {
    domains: BTreeSet<DomainId>,
    network: &'a mut Network<S, B>,
}

impl<S, B> TransmitterBuilder<'_, S, B> {
    /// Add the transmitter to a collision domain. Can be called repeatedly.
    pub fn join(mut self, domain: DomainId) -> Self {
        self.domains.insert(domain);
        self
    }

    /// Register the transmitter and return its [`NodeId`].
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NoDomain`] if no domain was joined;
    /// - [`RegistrationError::UnknownDomain`] if a joined domain was never
    ///   declared with [`Network::add_collision_domain`];
    /// - [`RegistrationError::UnsortedArrivals`] if the arrivals go back
    ///   in time.
    pub fn build(self) -> Result<NodeId, RegistrationError> {
        let Self {
            arrivals,
            domains,
            network,
        } = self;
        network.check_domains(NodeKind::Transmitter, &domains)?;
        let arrivals = ArrivalQueue::new(arrivals)?;
        let timing = network.timing;

        Ok(network.register(NodeKind::Transmitter, domains, |id, domains| {
            Node::Transmitter(Transmitter::new(id, domains, timing, arrivals))
        }))
    }
}

impl<S, B> AccessPointBuilder<'_, S, B> {
    /// Add the access point to a collision domain. Can be called repeatedly.
    pub fn join(mut self, domain: DomainId) -> Self {
        self.domains.insert(domain);
        self
    }

    /// Register the access point and return its [`NodeId`].
    ///
    /// # Errors
    ///
    /// Same domain checks as [`TransmitterBuilder::build`].
    pub fn build(self) -> Result<NodeId, RegistrationError> {
        let Self { domains, network } = self;
        network.check_domains(NodeKind::AccessPoint, &domains)?;
        let timing = network.timing;

        Ok(network.register(NodeKind::AccessPoint, domains, |id, domains| {
            Node::AccessPoint(AccessPoint::new(id, domains, timing))
        }))
    }
}

impl Network {
    /// Create an empty network sharing `timing` between all its stations
    /// and lasting `slot_budget` slots.
    ///
    /// Backoff draws come from a [`ChaChaRng`] seeded with `0`; see
    /// [`Network::set_seed`].
    ///
    /// # Errors
    ///
    /// Fails if `timing` does not pass [`Timing::validate`].
    pub fn new(timing: Timing, slot_budget: Slot) -> Result<Self, TimingError> {
        Self::with_parts(
            timing,
            slot_budget,
            SimReport::default(),
            ChaChaRng::seed_from_u64(0),
        )
    }

    /// Create an empty network from the physical description of a run.
    pub fn from_parameters(parameters: &Parameters) -> Result<Self, TimingError> {
        let (timing, slot_budget) = parameters.resolve()?;
        Self::new(timing, slot_budget)
    }
}

impl<S> Network<S, ChaChaRng> {
    /// Re-seed the backoff random-number generator.
    ///
    /// All backoff draws of every transmitter come from this single
    /// generator, so a given seed reproduces a run exactly.
    pub fn set_seed(&mut self, seed: u64) {
        self.backoff = ChaChaRng::seed_from_u64(seed);
    }
}

impl<S, B> Network<S, B> {
    /// Create an empty network with an explicit report sink and backoff
    /// source.
    ///
    /// # Errors
    ///
    /// Fails if `timing` does not pass [`Timing::validate`].
    pub fn with_parts(
        timing: Timing,
        slot_budget: Slot,
        sink: S,
        backoff: B,
    ) -> Result<Self, TimingError> {
        timing.validate()?;

        Ok(Self {
            timing,
            slot_budget,
            current_slot: 0,
            round: Round::ZERO,
            nodes: BTreeMap::new(),
            domains: BTreeMap::new(),
            on_air: Vec::new(),
            id: NodeId::ZERO,
            backoff,
            sink,
        })
    }

    /// Declare a new collision domain. Identifiers start at `0`.
    pub fn add_collision_domain(&mut self) -> DomainId {
        let id = DomainId::new(self.domains.len() as u64);
        self.domains.insert(id, CollisionDomain::new(id));
        id
    }

    /// Start registering a transmitter that will receive frames at the
    /// given (non-decreasing) slots.
    pub fn new_transmitter(
        &mut self,
        arrivals: impl IntoIterator<Item = Slot>,
    ) -> TransmitterBuilder<'_, S, B> {
        TransmitterBuilder {
            arrivals: arrivals.into_iter().collect(),
            domains: BTreeSet::new(),
            network: self,
        }
    }

    /// Start registering an access point.
    pub fn new_access_point(&mut self) -> AccessPointBuilder<'_, S, B> {
        AccessPointBuilder {
            domains: BTreeSet::new(),
            network: self,
        }
    }

    fn check_domains(
        &self,
        kind: NodeKind,
        domains: &BTreeSet<DomainId>,
    ) -> Result<(), RegistrationError> {
        if domains.is_empty() {
            return Err(RegistrationError::NoDomain { kind });
        }
        if let Some(&domain) = domains.iter().find(|d| !self.domains.contains_key(d)) {
            return Err(RegistrationError::UnknownDomain { domain });
        }
        Ok(())
    }

    fn register<F>(&mut self, kind: NodeKind, domains: BTreeSet<DomainId>, make: F) -> NodeId
    where
        F: FnOnce(NodeId, BTreeSet<DomainId>) -> Node,
    {
        self.id = self.id.next();
        let id = self.id;

        for domain in &domains {
            if let Some(registry) = self.domains.get_mut(domain) {
                registry.add(id, kind);
            }
        }
        self.nodes.insert(id, make(id, domains));
        debug!(node = %id, %kind, "registered");

        id
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn slot_budget(&self) -> Slot {
        self.slot_budget
    }

    pub fn current_slot(&self) -> Slot {
        self.current_slot
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The events that won the medium in the last round.
    pub fn on_air(&self) -> &[Event] {
        &self.on_air
    }

    pub fn collision_domains(&self) -> impl Iterator<Item = &CollisionDomain> {
        self.domains.values()
    }

    /// Log which stations belong to which collision domain.
    pub fn log_structure(&self) {
        info!(domains = self.domains.len(), "network structure");
        for domain in self.domains.values() {
            info!("  {domain}");
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S, B> Network<S, B>
where
    S: ReportSink,
    B: Backoff,
{
    /// Run one decision point.
    ///
    /// # Errors
    ///
    /// - [`SimError::SchedulerStall`] if no station declares anything;
    /// - [`SimError::ProtocolViolation`] if a transmitter waiting for its
    ///   acknowledgement sees the medium move past the expected slot.
    pub fn step(&mut self) -> Result<(), SimError> {
        let now = self.current_slot;
        let backoff = &mut self.backoff;

        let declared: Vec<Event> = self
            .nodes
            .values_mut()
            .filter_map(|node| node.declare_event(now, backoff))
            .collect();

        let Some(earliest) = declared
            .iter()
            .min_by(|a, b| a.cmp_timestamp(b))
            .map(|event| event.timestamp)
        else {
            let stall = SimError::SchedulerStall {
                slot: now,
                budget: self.slot_budget,
            };
            error!(slot = now, round = %self.round, "{stall}");
            return Err(stall);
        };

        let winners: Vec<Event> = declared
            .into_iter()
            .filter(|event| event.timestamp == earliest)
            .collect();
        if winners.len() > 1 {
            debug!(slot = earliest, contenders = winners.len(), "simultaneous access");
        }

        for event in &winners {
            trace!(round = %self.round, %event, "on air");
            if let Some(node) = self.nodes.get_mut(&event.node_id) {
                node.inform_broadcasting();
            }
        }

        for (id, node) in self.nodes.iter_mut() {
            if winners.iter().any(|event| event.node_id == *id) {
                continue;
            }
            for event in &winners {
                node.receive_event(event, &mut self.backoff)?;
            }
        }

        let nav = winners.iter().map(|event| event.nav).max().unwrap_or(now);
        self.current_slot = self.current_slot.max(nav);
        self.round = self.round.next();
        self.on_air = winners;

        Ok(())
    }

    /// Run until the slot budget is used up, then hand every station's
    /// report to the sink.
    pub fn run(&mut self) -> Result<(), SimError> {
        info!(
            budget = self.slot_budget,
            nodes = self.nodes.len(),
            domains = self.domains.len(),
            "starting simulation"
        );

        while self.current_slot < self.slot_budget {
            self.step()?;
        }

        for node in self.nodes.values() {
            self.sink.node(node.report());
        }
        self.sink.finish(self.current_slot);

        info!(
            slot = self.current_slot,
            rounds = self.round.into_u64(),
            "simulation complete"
        );
        Ok(())
    }
}
