//! Exchange record types.
//!
//! An [`ExchangeRecord`] is one registered pair. Records are created once,
//! never deleted, and change only through rate updates and the
//! active/inactive toggle.
//!
//! ```text
//!   create ──▶ ┌────────┐  deactivate  ┌──────────┐
//!              │ ACTIVE ├─────────────▶│ INACTIVE │
//!              └────────┘◀─────────────┴──────────┘
//!                            activate
//! ```

use serde::{Deserialize, Serialize};

use crate::{Amount, AssetId, ExchangeId, Identity, Rate};

/// One registered conversion rule between two assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Creator of the pair; sole authority over rate and activation.
    pub owner: Identity,
    /// Asset the swap caller pays in.
    pub quote_asset: AssetId,
    /// Asset the swap caller receives.
    pub base_asset: AssetId,
    /// Quote per base, 18-decimal fixed point. Never zero on a live record.
    pub rate: Rate,
    /// Swaps are only accepted while this is set.
    pub active: bool,
}

impl ExchangeRecord {
    #[must_use]
    pub fn new(owner: Identity, quote_asset: AssetId, base_asset: AssetId, rate: Rate) -> Self {
        Self {
            owner,
            quote_asset,
            base_asset,
            rate,
            active: true,
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, who: Identity) -> bool {
        self.owner == who
    }
}

/// A record as reported by `describe`: the stored fields plus the
/// currently redeemable supply (zero while inactive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeDetails {
    pub id: ExchangeId,
    pub owner: Identity,
    pub quote_asset: AssetId,
    pub base_asset: AssetId,
    pub rate: Rate,
    pub active: bool,
    /// `min(owner balance, owner allowance to the registry)` of the base
    /// asset at query time. Advisory only.
    pub supply: Amount,
}

impl ExchangeDetails {
    #[must_use]
    pub fn from_record(id: ExchangeId, record: &ExchangeRecord, supply: Amount) -> Self {
        Self {
            id,
            owner: record.owner,
            quote_asset: record.quote_asset,
            base_asset: record.base_asset,
            rate: record.rate,
            active: record.active,
            supply,
        }
    }
}
