use crate::{NodeId, Slot};
use std::{cmp::Ordering, fmt};

/// What a declared [`Event`] puts on the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A transmitter starts sending a data frame.
    Transmit,
    /// An access point acknowledges a data frame.
    AccessPointAck,
    /// An access point signals that the frames it received collided.
    Collision,
}

/// A station's declared intent (or response) on the shared medium.
///
/// Events are value objects: a station builds a fresh one whenever its
/// plan changes and the scheduler only ever compares and forwards them.
/// For scheduling purposes events are ordered by [`timestamp`] alone.
///
/// [`timestamp`]: Event::timestamp
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    pub kind: EventKind,
    pub node_id: NodeId,
    /// slot at which the on-air activity begins
    pub timestamp: Slot,
    /// slots of on-air occupancy
    pub duration: Slot,
    /// slot at which the medium is free again
    pub nav: Slot,
}

impl Event {
    pub fn new(kind: EventKind, node_id: NodeId, timestamp: Slot, duration: Slot, nav: Slot) -> Self {
        Self {
            kind,
            node_id,
            timestamp,
            duration,
            nav,
        }
    }

    /// Slot right after the on-air activity ends.
    #[inline]
    pub fn end(&self) -> Slot {
        self.timestamp.saturating_add(self.duration)
    }

    /// Same event, re-tagged as a collision marker.
    #[must_use = "function does not modify the current value"]
    pub fn into_collision(self) -> Self {
        Self {
            kind: EventKind::Collision,
            ..self
        }
    }

    /// Order two events by the slot they start at.
    pub fn cmp_timestamp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transmit => f.write_str("TX"),
            Self::AccessPointAck => f.write_str("AP"),
            Self::Collision => f.write_str("COLLISION"),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} from {} for {} (nav {})",
            self.kind, self.timestamp, self.node_id, self.duration, self.nav
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_collision_keeps_timing() {
        let event = Event::new(EventKind::AccessPointAck, NodeId::ONE, 8, 2, 10);
        let collision = event.clone().into_collision();

        assert_eq!(collision.kind, EventKind::Collision);
        assert_eq!(collision.timestamp, event.timestamp);
        assert_eq!(collision.nav, event.nav);
        assert_eq!(collision.end(), 10);
    }

    #[test]
    fn ordered_by_timestamp_only() {
        let early = Event::new(EventKind::Transmit, NodeId::new(9), 3, 100, 200);
        let late = Event::new(EventKind::Transmit, NodeId::ONE, 4, 1, 5);
        assert_eq!(early.cmp_timestamp(&late), Ordering::Less);
        assert_eq!(late.cmp_timestamp(&late.clone()), Ordering::Equal);
    }

    #[test]
    fn end_saturates() {
        let event = Event::new(EventKind::Transmit, NodeId::ONE, Slot::MAX - 1, 5, Slot::MAX);
        assert_eq!(event.end(), Slot::MAX);
    }

    #[test]
    fn display() {
        let event = Event::new(EventKind::Transmit, NodeId::new(2), 6, 5, 14);
        assert_eq!(event.to_string(), "TX@6 from 2 for 5 (nav 14)");
    }
}
