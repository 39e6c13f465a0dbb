//! Identifiers used throughout FixedSwap.
//!
//! Account and asset identities are 20-byte values rendered as `0x`-prefixed
//! hex. Exchange identifiers are SHA-256 digests of the pair and its owner,
//! so the same `(quote, base, owner)` triple always maps to the same id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{FixedSwapError, Result};

/// Raw integer amount of an asset, in its smallest unit.
pub type Amount = u128;

/// Parse a `0x`-prefixed (or bare) hex string into exactly `N` bytes.
fn parse_hex<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits)
        .map_err(|e| FixedSwapError::Serialization(format!("{what} {s:?}: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        FixedSwapError::Serialization(format!(
            "{what} {s:?}: expected {N} bytes, got {}",
            b.len()
        ))
    })
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An account identity: exchange owners, swap callers, and the registry's
/// own spender identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(pub [u8; 20]);

impl Identity {
    /// The null identity. Never a valid owner or asset holder.
    pub const NULL: Self = Self([0u8; 20]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// First four bytes as hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// A random non-null identity.
    #[cfg(feature = "test-helpers")]
    #[must_use]
    pub fn random() -> Self {
        loop {
            let id = Self(rand::random());
            if !id.is_null() {
                return id;
            }
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = FixedSwapError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex(s, "identity").map(Self)
    }
}

impl TryFrom<String> for Identity {
    type Error = FixedSwapError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Identity of a fungible asset (the asset contract's address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(pub [u8; 20]);

impl AssetId {
    pub const NULL: Self = Self([0u8; 20]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }

    #[cfg(feature = "test-helpers")]
    #[must_use]
    pub fn random() -> Self {
        loop {
            let id = Self(rand::random());
            if !id.is_null() {
                return id;
            }
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AssetId {
    type Err = FixedSwapError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex(s, "asset id").map(Self)
    }
}

impl TryFrom<String> for AssetId {
    type Error = FixedSwapError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// ExchangeId
// ---------------------------------------------------------------------------

/// Key of an exchange record. Deterministic digest of
/// `(quote_asset, base_asset, owner)`; never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExchangeId(pub [u8; 32]);

impl ExchangeId {
    /// Derive the id for a pair owned by `owner`.
    ///
    /// Every caller computes the **same** id for the same triple, so the id
    /// can be predicted off-registry before `create` is called.
    #[must_use]
    pub fn derive(quote_asset: AssetId, base_asset: AssetId, owner: Identity) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"fixedswap:exchange_id:v1:");
        hasher.update(quote_asset.as_bytes());
        hasher.update(base_asset.as_bytes());
        hasher.update(owner.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ExchangeId {
    type Err = FixedSwapError;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex(s, "exchange id").map(Self)
    }
}

impl TryFrom<String> for ExchangeId {
    type Error = FixedSwapError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ExchangeId> for String {
    fn from(id: ExchangeId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
