use log::trace;

use crate::errors::SuretyResult;
use crate::ledger::events::{EventKind, LoggedEvent, SuretyEvent};
use crate::ledger::interface::LedgerInterface;

/// Append-only event log. Offsets start at 0 and are never reused.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset the next appended event will receive
    pub fn next_offset(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn get(&self, offset: u64) -> Option<&LoggedEvent> {
        self.entries.get(offset as usize)
    }

    /// Appends `events` in order and returns them with their offsets.
    pub fn append(&mut self, events: Vec<SuretyEvent>) -> Vec<LoggedEvent> {
        let mut appended = Vec::with_capacity(events.len());
        for event in events {
            let logged = LoggedEvent {
                offset: self.next_offset(),
                event,
            };
            trace!("Appended {:?} at offset {}", logged.event.kind(), logged.offset);
            self.entries.push(logged.clone());
            appended.push(logged);
        }
        appended
    }

    /// Events at or after `offset`, optionally restricted to one kind.
    pub fn read_from(&self, offset: u64, kind: Option<EventKind>) -> Vec<LoggedEvent> {
        let start = (offset as usize).min(self.entries.len());
        self.entries[start..]
            .iter()
            .filter(|logged| kind.map_or(true, |k| logged.event.kind() == k))
            .cloned()
            .collect()
    }
}

/// A consumer's position in the event stream.
///
/// Delivery is at-least-once: after a `rewind` every event is delivered
/// again, so handlers must tolerate repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    kind: Option<EventKind>,
    next_offset: u64,
}

impl Subscription {
    pub fn new(kind: Option<EventKind>, from_offset: u64) -> Self {
        Subscription {
            kind,
            next_offset: from_offset,
        }
    }

    /// Subscription to one event kind from genesis
    pub fn from_genesis(kind: EventKind) -> Self {
        Subscription::new(Some(kind), 0)
    }

    pub fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Fetches events past the current position and advances it.
    pub fn poll<L: LedgerInterface + ?Sized>(&mut self, ledger: &L) -> SuretyResult<Vec<LoggedEvent>> {
        let events = ledger.subscribe(self.kind, self.next_offset)?;
        if let Some(last) = events.last() {
            self.next_offset = last.offset + 1;
        }
        Ok(events)
    }

    /// Start over from offset 0.
    pub fn rewind(&mut self) {
        self.next_offset = 0;
    }
}
