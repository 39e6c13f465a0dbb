//! 18-decimal fixed-point rates and the quote-amount rule.
//!
//! ```text
//! quote_amount = floor(base_amount * rate / 10^18)
//! ```
//!
//! Both operands are `u128`, so the product can need up to 256 bits. The
//! multiply runs on a `BigUint` and only the final quotient is narrowed
//! back; a quotient that does not fit is [`FixedSwapError::ArithmeticOverflow`].

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::constants::{RATE_DECIMALS, RATE_ONE};
use crate::{Amount, FixedSwapError, Result};

/// Price of one unit of base asset in units of quote asset, scaled by 10^18.
///
/// A zero rate is reserved to mean "no exchange here" and is never stored
/// on a live record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Rate(pub u128);

impl Rate {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(RATE_ONE);

    #[must_use]
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// A whole-number rate, e.g. `from_whole(2)` is 2 quote per base.
    pub fn from_whole(units: u128) -> Result<Self> {
        units
            .checked_mul(RATE_ONE)
            .map(Self)
            .ok_or(FixedSwapError::ArithmeticOverflow)
    }

    #[must_use]
    pub fn raw(&self) -> u128 {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / RATE_ONE;
        let frac = self.0 % RATE_ONE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0width$}", width = RATE_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// Quote amount owed for `base_amount` at `rate`, rounded down.
pub fn quote_amount_for(base_amount: Amount, rate: Rate) -> Result<Amount> {
    let product = BigUint::from(base_amount) * BigUint::from(rate.0);
    let quotient = product / BigUint::from(RATE_ONE);
    u128::try_from(quotient).map_err(|_| FixedSwapError::ArithmeticOverflow)
}
