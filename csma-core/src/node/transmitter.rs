use crate::{
    ArrivalQueue, Backoff, DomainId, Event, EventKind, NodeId, Slot, Timing,
    history::{History, Label},
};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, error, trace};

/// Signalling state of a [`Transmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxState {
    /// Waiting out DIFS and backoff, or ready to attempt.
    Contending,
    /// Has sent a data frame and waits for the acknowledgement.
    AwaitingAck,
}

/// An acknowledgement did not arrive by the slot the transmitter expected it.
///
/// The run cannot continue: the medium timeline is no longer consistent
/// with the exchange the transmitter believes is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "node {node} expected an acknowledgement at slot {expected_ack} but the medium moved on to {observed} at slot {observed_slot}"
)]
pub struct ProtocolViolation {
    pub node: NodeId,
    pub expected_ack: Slot,
    pub observed: EventKind,
    pub observed_slot: Slot,
}

/// A station with frames to deliver.
///
/// The transmitter pops its next arrival only when it has nothing in
/// flight, plans the whole DIFS/backoff/DATA/SIFS/ACK chain for it and
/// offers the resulting [`Event`] to the scheduler until it is either
/// selected or pushed back by someone else's transmission.
#[derive(Debug, Clone)]
pub struct Transmitter {
    id: NodeId,
    domains: BTreeSet<DomainId>,
    timing: Timing,

    state: TxState,

    /// backoff slots still to wait before the attempt
    backoff: Slot,
    backoff_window_start: Slot,
    /// consecutive collisions of the frame in flight
    retries: u32,
    expected_ack: Slot,
    nav: Slot,

    pending: Option<Event>,
    arrivals: ArrivalQueue,

    successes: u64,
    collisions: u64,
    history: History,
}

impl Transmitter {
    pub(crate) fn new(
        id: NodeId,
        domains: BTreeSet<DomainId>,
        timing: Timing,
        arrivals: ArrivalQueue,
    ) -> Self {
        Self {
            id,
            domains,
            timing,
            state: TxState::Contending,
            backoff: 0,
            backoff_window_start: 0,
            retries: 0,
            expected_ack: 0,
            nav: 0,
            pending: None,
            arrivals,
            successes: 0,
            collisions: 0,
            history: History::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn domains(&self) -> &BTreeSet<DomainId> {
        &self.domains
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// The attempt currently offered to the scheduler, if any.
    pub fn pending(&self) -> Option<&Event> {
        self.pending.as_ref()
    }

    /// Backoff slots the current attempt still has to wait.
    pub fn backoff(&self) -> Slot {
        self.backoff
    }

    /// Consecutive collisions of the frame in flight (drives the window).
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn expected_ack(&self) -> Slot {
        self.expected_ack
    }

    pub fn nav(&self) -> Slot {
        self.nav
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    pub fn arrivals_left(&self) -> usize {
        self.arrivals.len()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn declare_event<B>(&mut self, now: Slot, backoff: &mut B) -> Option<Event>
    where
        B: Backoff + ?Sized,
    {
        if self.state == TxState::AwaitingAck {
            return None;
        }
        if let Some(pending) = &self.pending {
            return Some(pending.clone());
        }

        let arrival = self.arrivals.pop()?;
        let start = arrival.max(now);
        self.draw_backoff(backoff);
        trace!(node = %self.id, arrival, start, backoff = self.backoff, "new frame");

        Some(self.determine_timestamps(start))
    }

    pub(crate) fn inform_broadcasting(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        let (start, end) = (pending.timestamp, pending.end());

        self.state = TxState::AwaitingAck;
        self.history.record(start, Label::Data, self.timing.data);
        self.history.record(end, Label::Sifs, self.timing.sifs);
        debug!(node = %self.id, slot = start, expected_ack = self.expected_ack, "broadcasting");
    }

    pub(crate) fn receive_event<B>(
        &mut self,
        event: &Event,
        backoff: &mut B,
    ) -> Result<(), ProtocolViolation>
    where
        B: Backoff + ?Sized,
    {
        let Some(pending) = &self.pending else {
            return Ok(());
        };
        let pending_start = pending.timestamp;

        match self.state {
            TxState::AwaitingAck => {
                if event.timestamp > self.expected_ack {
                    let violation = ProtocolViolation {
                        node: self.id,
                        expected_ack: self.expected_ack,
                        observed: event.kind,
                        observed_slot: event.timestamp,
                    };
                    error!(node = %self.id, %event, "{violation}");
                    return Err(violation);
                }

                if event.kind == EventKind::Collision || event.timestamp != self.expected_ack {
                    self.on_collision(backoff);
                } else {
                    self.on_success(event.timestamp);
                }
            }
            TxState::Contending => {
                if event.kind == EventKind::Collision || pending_start > event.nav {
                    return Ok(());
                }

                // the medium went busy at `event.timestamp`: keep what was
                // already counted down and resume once it frees again
                let waited = event
                    .timestamp
                    .saturating_sub(self.backoff_window_start)
                    .min(self.backoff);
                self.backoff -= waited;
                trace!(
                    node = %self.id,
                    busy_from = event.timestamp,
                    busy_until = event.nav,
                    waited,
                    remaining = self.backoff,
                    "medium busy, deferring",
                );
                self.determine_timestamps(event.nav);
            }
        }

        Ok(())
    }

    fn on_success(&mut self, slot: Slot) {
        self.successes += 1;
        self.retries = 0;
        self.pending = None;
        self.state = TxState::Contending;
        debug!(node = %self.id, slot, successes = self.successes, "acknowledged");
    }

    fn on_collision<B>(&mut self, backoff: &mut B)
    where
        B: Backoff + ?Sized,
    {
        self.collisions += 1;
        self.retries = self.retries.saturating_add(1);
        self.state = TxState::Contending;
        self.draw_backoff(backoff);
        debug!(
            node = %self.id,
            slot = self.expected_ack,
            retries = self.retries,
            backoff = self.backoff,
            "collision, retrying",
        );
        self.determine_timestamps(self.nav);
    }

    fn draw_backoff<B>(&mut self, backoff: &mut B)
    where
        B: Backoff + ?Sized,
    {
        let window = self.timing.contention_window(self.retries);
        self.backoff = backoff.draw(window);
    }

    /// Plan the full exchange for an attempt sensing the medium from `start`.
    fn determine_timestamps(&mut self, start: Slot) -> Event {
        let Timing {
            difs,
            sifs,
            ack,
            data,
            ..
        } = self.timing;

        self.history.record(start, Label::Difs, difs);
        self.backoff_window_start = start.saturating_add(difs);
        if self.backoff > 0 {
            self.history
                .record(self.backoff_window_start, Label::Backoff, self.backoff);
        }

        // saturates at the end of time rather than wrapping around
        let transmit = self.backoff_window_start.saturating_add(self.backoff);
        self.expected_ack = transmit.saturating_add(data).saturating_add(sifs);
        self.nav = self.expected_ack.saturating_add(ack);

        let event = Event::new(EventKind::Transmit, self.id, transmit, data, self.nav);
        self.pending = Some(event.clone());
        event
    }
}
