//! Append-only event log.
//!
//! Every committed registry mutation appends exactly one event per
//! observable signal. Entries are never removed or rewritten; the sequence
//! number of an entry equals its index.

use chrono::Utc;
use fixedswap_types::{EventKind, ExchangeId, RegistryEvent};

/// Ordered audit trail of registry events.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<RegistryEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, stamping it with the next sequence number.
    pub fn push(&mut self, kind: EventKind) -> &RegistryEvent {
        let sequence = self.events.len() as u64;
        self.events.push(RegistryEvent {
            sequence,
            emitted_at: Utc::now(),
            kind,
        });
        &self.events[self.events.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEvent> {
        self.events.iter()
    }

    /// Events with `sequence >= from`. Lets a consumer resume tailing.
    #[must_use]
    pub fn since(&self, from: u64) -> &[RegistryEvent] {
        let start = usize::try_from(from).map_or(self.events.len(), |i| i.min(self.events.len()));
        &self.events[start..]
    }

    /// Events concerning a single exchange, in log order.
    pub fn for_exchange(&self, id: ExchangeId) -> impl Iterator<Item = &RegistryEvent> {
        self.events.iter().filter(move |e| e.kind.exchange_id() == id)
    }
}
