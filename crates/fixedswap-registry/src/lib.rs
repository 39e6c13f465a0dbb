//! # fixedswap-registry
//!
//! **Exchange registry**: owner-controlled fixed-rate pairs and atomic
//! two-leg swaps between them.
//!
//! ## Architecture
//!
//! 1. **AssetLedger**: the transfer capability (`transfer_from`,
//!    `balance_of`, `allowance`, `rollback`); `InMemoryLedger` is the
//!    reference implementation
//! 2. **ExchangeRegistry**: record table, creation index, rate and
//!    activation state machine, swap execution
//! 3. **EventLog**: append-only, sequenced audit trail
//! 4. **SharedRegistry**: mutex-guarded handle for multi-threaded hosts
//!
//! ## Swap Flow
//!
//! ```text
//! caller → ExchangeRegistry.swap() → preflight both legs
//!     → ledger.transfer_from(quote: caller → owner)
//!     → ledger.transfer_from(base: owner → caller)   (rollback quote leg on failure)
//!     → EventLog.push(Swapped)
//! ```
//!
//! The registry never takes custody: both legs move funds directly between
//! the two counterparties.

pub mod asset_ledger;
pub mod event_log;
pub mod registry;
pub mod shared;

pub use asset_ledger::{AssetLedger, InMemoryLedger, TransferReceipt, TransferRejection};
pub use event_log::EventLog;
pub use registry::{ExchangeRegistry, SwapOutcome};
pub use shared::SharedRegistry;
