mod access_point;
mod id;
mod transmitter;

pub use self::{
    access_point::AccessPoint,
    id::{DomainId, NodeId},
    transmitter::{ProtocolViolation, Transmitter, TxState},
};
use crate::{Backoff, Event, Slot, report::NodeReport};
use std::{collections::BTreeSet, fmt};

/// The capabilities the [`Network`] drives every station through.
///
/// The scheduler never looks at what kind of station it is talking to:
/// it asks for the next [`Event`], tells the selected stations they are on
/// the air, and forwards the selected events to everyone else.
///
/// [`Network`]: crate::network::Network
pub trait Station {
    fn id(&self) -> NodeId;

    fn domains(&self) -> &BTreeSet<DomainId>;

    /// Offer the next event this station wants on the medium at or after
    /// `now`. Calling it again without any notification in between returns
    /// the same event.
    fn declare_event<B>(&mut self, now: Slot, backoff: &mut B) -> Option<Event>
    where
        B: Backoff + ?Sized;

    /// Someone else's selected event.
    fn receive_event<B>(&mut self, event: &Event, backoff: &mut B) -> Result<(), ProtocolViolation>
    where
        B: Backoff + ?Sized;

    /// This station's declared event was selected.
    fn inform_broadcasting(&mut self);

    /// Counters and timeline accumulated so far.
    fn report(&self) -> NodeReport;
}

/// The two station kinds a network is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Transmitter,
    AccessPoint,
}

/// A station registered with the [`Network`](crate::network::Network).
#[derive(Debug, Clone)]
pub enum Node {
    Transmitter(Transmitter),
    AccessPoint(AccessPoint),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Transmitter(_) => NodeKind::Transmitter,
            Self::AccessPoint(_) => NodeKind::AccessPoint,
        }
    }

    pub fn as_transmitter(&self) -> Option<&Transmitter> {
        match self {
            Self::Transmitter(tx) => Some(tx),
            Self::AccessPoint(_) => None,
        }
    }

    pub fn as_access_point(&self) -> Option<&AccessPoint> {
        match self {
            Self::AccessPoint(ap) => Some(ap),
            Self::Transmitter(_) => None,
        }
    }
}

impl Station for Node {
    fn id(&self) -> NodeId {
        match self {
            Self::Transmitter(tx) => tx.id(),
            Self::AccessPoint(ap) => ap.id(),
        }
    }

    fn domains(&self) -> &BTreeSet<DomainId> {
        match self {
            Self::Transmitter(tx) => tx.domains(),
            Self::AccessPoint(ap) => ap.domains(),
        }
    }

    fn declare_event<B>(&mut self, now: Slot, backoff: &mut B) -> Option<Event>
    where
        B: Backoff + ?Sized,
    {
        match self {
            Self::Transmitter(tx) => tx.declare_event(now, backoff),
            Self::AccessPoint(ap) => ap.declare_event(),
        }
    }

    fn receive_event<B>(&mut self, event: &Event, backoff: &mut B) -> Result<(), ProtocolViolation>
    where
        B: Backoff + ?Sized,
    {
        match self {
            Self::Transmitter(tx) => tx.receive_event(event, backoff),
            Self::AccessPoint(ap) => {
                ap.receive_event(event);
                Ok(())
            }
        }
    }

    fn inform_broadcasting(&mut self) {
        match self {
            Self::Transmitter(tx) => tx.inform_broadcasting(),
            Self::AccessPoint(ap) => ap.inform_broadcasting(),
        }
    }

    fn report(&self) -> NodeReport {
        let (successes, collisions, history) = match self {
            Self::Transmitter(tx) => (tx.successes(), tx.collisions(), tx.history()),
            Self::AccessPoint(ap) => (ap.acknowledged(), ap.collisions(), ap.history()),
        };
        NodeReport {
            id: self.id(),
            kind: self.kind(),
            domains: self.domains().iter().copied().collect(),
            successes,
            collisions,
            history: history.clone(),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transmitter => f.write_str("tx"),
            Self::AccessPoint => f.write_str("ap"),
        }
    }
}
