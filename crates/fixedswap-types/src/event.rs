//! Observable registry events.
//!
//! Events form the append-only audit trail consumed by indexers. Each one
//! carries a gap-free `sequence` (the ordering marker) and a wall-clock
//! timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, AssetId, ExchangeId, Identity, Rate};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    ExchangeCreated {
        exchange_id: ExchangeId,
        owner: Identity,
        quote_asset: AssetId,
        base_asset: AssetId,
        rate: Rate,
    },
    ExchangeActivated {
        exchange_id: ExchangeId,
        by: Identity,
    },
    ExchangeDeactivated {
        exchange_id: ExchangeId,
        by: Identity,
    },
    ExchangeRateChanged {
        exchange_id: ExchangeId,
        by: Identity,
        new_rate: Rate,
    },
    Swapped {
        exchange_id: ExchangeId,
        by: Identity,
        quote_amount: Amount,
        base_amount: Amount,
    },
}

impl EventKind {
    /// The exchange this event concerns.
    #[must_use]
    pub fn exchange_id(&self) -> ExchangeId {
        match self {
            Self::ExchangeCreated { exchange_id, .. }
            | Self::ExchangeActivated { exchange_id, .. }
            | Self::ExchangeDeactivated { exchange_id, .. }
            | Self::ExchangeRateChanged { exchange_id, .. }
            | Self::Swapped { exchange_id, .. } => *exchange_id,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExchangeCreated { .. } => write!(f, "EXCHANGE_CREATED"),
            Self::ExchangeActivated { .. } => write!(f, "EXCHANGE_ACTIVATED"),
            Self::ExchangeDeactivated { .. } => write!(f, "EXCHANGE_DEACTIVATED"),
            Self::ExchangeRateChanged { .. } => write!(f, "EXCHANGE_RATE_CHANGED"),
            Self::Swapped { .. } => write!(f, "SWAPPED"),
        }
    }
}

/// A sequenced, timestamped event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEvent {
    /// Position in the audit log, starting at 0.
    pub sequence: u64,
    pub emitted_at: DateTime<Utc>,
    pub kind: EventKind,
}
