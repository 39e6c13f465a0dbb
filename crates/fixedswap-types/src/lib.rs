//! # fixedswap-types
//!
//! Shared types, errors, and configuration for the **FixedSwap** exchange
//! registry.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Identity`], [`AssetId`], [`ExchangeId`], [`Amount`]
//! - **Fixed-point**: [`Rate`], [`quote_amount_for`]
//! - **Exchange model**: [`ExchangeRecord`], [`ExchangeDetails`]
//! - **Events**: [`RegistryEvent`], [`EventKind`]
//! - **Configuration**: [`RegistryConfig`]
//! - **Errors**: [`FixedSwapError`] with `FS_ERR_` prefix codes
//! - **Constants**: rate precision and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod exchange;
pub mod fixed_point;
pub mod ids;

pub use config::*;
pub use error::*;
pub use event::*;
pub use exchange::*;
pub use fixed_point::*;
pub use ids::*;

// Constants are accessed via `fixedswap_types::constants::FOO`.
