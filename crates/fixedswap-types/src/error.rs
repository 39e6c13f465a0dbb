//! Error types for the FixedSwap registry.
//!
//! All errors use the `FS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Registry errors (lifecycle, authorization, validation)
//! - 2xx: Transfer errors
//! - 3xx: Arithmetic errors
//! - 9xx: General / internal errors
//!
//! Every variant is a clean rejection: the registry is left exactly as it
//! was before the failing call.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ExchangeId, Identity};

/// Which of the two swap transfers failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferLeg {
    /// Quote asset, caller → owner.
    QuoteIn,
    /// Base asset, owner → caller.
    BaseOut,
}

impl fmt::Display for TransferLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuoteIn => write!(f, "QUOTE_IN"),
            Self::BaseOut => write!(f, "BASE_OUT"),
        }
    }
}

/// Central error enum for all FixedSwap operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedSwapError {
    // =================================================================
    // Registry Errors (1xx)
    // =================================================================
    /// A record already occupies this `(quote, base, owner)` slot.
    #[error("FS_ERR_100: Exchange already exists: {0}")]
    AlreadyExists(ExchangeId),

    /// Null asset identity, or quote and base are the same asset.
    #[error("FS_ERR_101: Invalid asset: {reason}")]
    InvalidAsset { reason: String },

    /// A rate of zero was supplied.
    #[error("FS_ERR_102: Invalid rate: must be greater than zero")]
    InvalidRate,

    /// No record at this id, or the record is not active.
    #[error("FS_ERR_103: No such exchange: {0}")]
    NoSuchExchange(ExchangeId),

    /// Caller is not the owner of the exchange.
    #[error("FS_ERR_104: Unauthorized: {caller} does not own exchange {exchange_id}")]
    Unauthorized {
        caller: Identity,
        exchange_id: ExchangeId,
    },

    #[error("FS_ERR_105: Exchange already active: {0}")]
    AlreadyActive(ExchangeId),

    #[error("FS_ERR_106: Exchange already inactive: {0}")]
    AlreadyInactive(ExchangeId),

    // =================================================================
    // Transfer Errors (2xx)
    // =================================================================
    /// One swap leg was rejected by the asset ledger; nothing was moved.
    #[error("FS_ERR_200: Transfer failed on {leg} leg: {reason}")]
    TransferFailed { leg: TransferLeg, reason: String },

    // =================================================================
    // Arithmetic Errors (3xx)
    // =================================================================
    /// An amount computation does not fit the amount type.
    #[error("FS_ERR_300: Arithmetic overflow")]
    ArithmeticOverflow,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    #[error("FS_ERR_900: Internal error: {0}")]
    Internal(String),

    #[error("FS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    #[error("FS_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, FixedSwapError>;

impl From<serde_json::Error> for FixedSwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
