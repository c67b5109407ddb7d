use crate::{
    DomainId, Event, EventKind, NodeId, Timing,
    history::{History, Label},
};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, trace};

/// A coordinating station that answers every data frame it hears.
///
/// Each received frame is queued together with the response it will get
/// one SIFS after the frame ends. A second frame arriving while a response
/// is still queued means the frames overlapped on the medium: every queued
/// response is replaced by a collision marker and the new frame gets one too.
#[derive(Debug, Clone)]
pub struct AccessPoint {
    id: NodeId,
    domains: BTreeSet<DomainId>,
    timing: Timing,

    /// (received frame, response) pairs, served front first
    responses: VecDeque<(Event, Event)>,

    acknowledged: u64,
    collisions: u64,
    history: History,
}

impl AccessPoint {
    pub(crate) fn new(id: NodeId, domains: BTreeSet<DomainId>, timing: Timing) -> Self {
        Self {
            id,
            domains,
            timing,
            responses: VecDeque::new(),
            acknowledged: 0,
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

    /// Responses not sent yet, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = &Event> {
        self.responses.iter().map(|(_, response)| response)
    }

    pub fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn declare_event(&self) -> Option<Event> {
        self.responses.front().map(|(_, response)| response.clone())
    }

    pub(crate) fn inform_broadcasting(&mut self) {
        let Some((frame, response)) = self.responses.pop_front() else {
            return;
        };
        let label = match response.kind {
            EventKind::Collision => Label::Collision,
            _ => {
                self.acknowledged += 1;
                Label::Ack
            }
        };
        self.history
            .record(response.timestamp, label, response.duration);
        trace!(node = %self.id, slot = response.timestamp, to = %frame.node_id, %label, "responding");
    }

    pub(crate) fn receive_event(&mut self, event: &Event) {
        // responses of other access points are not frames to answer
        if event.kind != EventKind::Transmit {
            return;
        }

        let timestamp = event.end().saturating_add(self.timing.sifs);
        let nav = timestamp.saturating_add(self.timing.ack);

        if self.responses.is_empty() {
            let response = Event::new(
                EventKind::AccessPointAck,
                self.id,
                timestamp,
                self.timing.ack,
                nav,
            );
            self.responses.push_back((event.clone(), response));
            return;
        }

        self.collisions += 1;
        self.responses = std::mem::take(&mut self.responses)
            .into_iter()
            .map(|(frame, response)| (frame, response.into_collision()))
            .collect();
        let response = Event::new(EventKind::Collision, self.id, timestamp, self.timing.ack, nav);
        self.responses.push_back((event.clone(), response));

        debug!(
            node = %self.id,
            slot = event.timestamp,
            from = %event.node_id,
            queued = self.responses.len(),
            "collision",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access_point() -> AccessPoint {
        let timing = Timing {
            difs: 2,
            sifs: 1,
            ack: 2,
            cw_min: 2,
            cw_max: 16,
            data: 5,
        };
        AccessPoint::new(NodeId::new(10), BTreeSet::from([DomainId::new(0)]), timing)
    }

    fn frame(from: u64, timestamp: u64) -> Event {
        Event::new(EventKind::Transmit, NodeId::new(from), timestamp, 5, timestamp + 8)
    }

    #[test]
    fn idle_declares_nothing() {
        assert_eq!(access_point().declare_event(), None);
    }

    #[test]
    fn acknowledges_one_sifs_after_the_frame() {
        let mut ap = access_point();
        ap.receive_event(&frame(1, 2));

        let response = ap.declare_event().unwrap();
        assert_eq!(response.kind, EventKind::AccessPointAck);
        assert_eq!(response.node_id, NodeId::new(10));
        assert_eq!(response.timestamp, 2 + 5 + 1);
        assert_eq!(response.duration, 2);
        assert_eq!(response.nav, 10);

        ap.inform_broadcasting();
        assert_eq!(ap.declare_event(), None);
        assert_eq!(ap.acknowledged(), 1);
        assert_eq!(ap.history().with_label(Label::Ack).count(), 1);
    }

    #[test]
    fn second_frame_turns_queue_into_collisions() {
        let mut ap = access_point();
        ap.receive_event(&frame(1, 2));
        ap.receive_event(&frame(2, 2));

        assert_eq!(ap.collisions(), 1);
        let kinds: Vec<_> = ap.queued().map(|r| r.kind).collect();
        assert_eq!(kinds, [EventKind::Collision, EventKind::Collision]);

        ap.inform_broadcasting();
        ap.inform_broadcasting();
        assert_eq!(ap.acknowledged(), 0);
        assert_eq!(ap.history().with_label(Label::Collision).count(), 2);
    }

    #[test]
    fn only_the_head_is_offered() {
        let mut ap = access_point();
        ap.receive_event(&frame(1, 2));
        ap.receive_event(&frame(2, 2));
        ap.receive_event(&frame(3, 2));

        let head = ap.declare_event().unwrap();
        assert_eq!(Some(&head), ap.queued().next());
        assert_eq!(ap.queued().count(), 3);
        assert_eq!(ap.collisions(), 2);
    }

    #[test]
    fn ignores_other_access_points() {
        let mut ap = access_point();
        let other = Event::new(EventKind::AccessPointAck, NodeId::new(11), 8, 2, 10);
        ap.receive_event(&other);
        ap.receive_event(&other.clone().into_collision());
        assert_eq!(ap.declare_event(), None);
    }
}
