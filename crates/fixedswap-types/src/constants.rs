//! System-wide constants for the FixedSwap registry.

/// Decimal places carried by an exchange rate.
pub const RATE_DECIMALS: u32 = 18;

/// Fixed-point representation of a rate of exactly 1 (`10^RATE_DECIMALS`).
pub const RATE_ONE: u128 = 1_000_000_000_000_000_000;

/// Default identity the registry uses as transfer spender when no
/// configuration is supplied.
pub const DEFAULT_SPENDER: [u8; 20] = [
    0xf1, 0x5e, 0xd5, 0x3a, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x01,
];

/// Default deployment label used in log output.
pub const DEFAULT_LABEL: &str = "fixedswap";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
