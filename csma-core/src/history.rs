use crate::Slot;
use std::fmt;

/// What a station was doing during a [`HistoryEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Difs,
    Backoff,
    Data,
    Sifs,
    Ack,
    Collision,
}

/// One `(slot, label, duration)` record of a station's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryEntry {
    pub slot: Slot,
    pub label: Label,
    pub duration: Slot,
}

/// Append-only timeline of a station.
///
/// The core only ever writes to it; reporting reads it back after the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History(Vec<HistoryEntry>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, slot: Slot, label: Label, duration: Slot) {
        self.0.push(HistoryEntry {
            slot,
            label,
            duration,
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.0.iter()
    }

    /// Entries carrying the given label.
    pub fn with_label(&self, label: Label) -> impl Iterator<Item = &HistoryEntry> {
        self.0.iter().filter(move |entry| entry.label == label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Difs => "DIFS",
            Self::Backoff => "BACKOFF",
            Self::Data => "DATA",
            Self::Sifs => "SIFS",
            Self::Ack => "ACK",
            Self::Collision => "COLLISION",
        };
        f.write_str(label)
    }
}
