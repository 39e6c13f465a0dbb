//! The asset transfer capability the registry consumes.
//!
//! The registry never holds custody. Every swap leg is a pull from one
//! counterparty's account straight into the other's, spending an allowance
//! that the payer granted to the registry's spender identity beforehand.
//!
//! [`InMemoryLedger`] is a reference implementation with ERC-20-style
//! balance/allowance accounting. Each call is atomic: either the full
//! transfer happens or nothing changes.

use std::collections::HashMap;
use std::fmt;

use fixedswap_types::{Amount, AssetId, Identity};

/// Why the ledger refused a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRejection {
    InsufficientBalance { needed: Amount, available: Amount },
    InsufficientAllowance { needed: Amount, approved: Amount },
    /// The receipt does not describe a transfer this ledger can undo.
    NotReversible,
    Other(String),
}

impl fmt::Display for TransferRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance { needed, available } => {
                write!(f, "insufficient balance: need {needed}, have {available}")
            }
            Self::InsufficientAllowance { needed, approved } => {
                write!(f, "insufficient allowance: need {needed}, approved {approved}")
            }
            Self::NotReversible => write!(f, "transfer cannot be reversed"),
            Self::Other(reason) => write!(f, "{reason}"),
        }
    }
}

/// Proof of a completed `transfer_from`, used to reverse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub spender: Identity,
    pub asset: AssetId,
    pub from: Identity,
    pub to: Identity,
    pub amount: Amount,
}

/// Transfer capability for fungible assets.
///
/// Implementations must make `transfer_from` all-or-nothing and must be able
/// to `rollback` any receipt they issued as long as the recipient still
/// holds the funds.
pub trait AssetLedger {
    fn balance_of(&self, asset: AssetId, holder: Identity) -> Amount;

    fn allowance(&self, asset: AssetId, owner: Identity, spender: Identity) -> Amount;

    /// Move `amount` of `asset` from `from` to `to`, spending `from`'s
    /// allowance to `spender`.
    fn transfer_from(
        &mut self,
        spender: Identity,
        asset: AssetId,
        from: Identity,
        to: Identity,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferRejection>;

    /// Reverse a previous transfer: funds go back and the spent allowance is
    /// restored.
    fn rollback(&mut self, receipt: &TransferReceipt) -> Result<(), TransferRejection>;
}

/// In-process ledger tracking per-(holder, asset) balances and
/// per-(asset, owner, spender) allowances.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(Identity, AssetId), Amount>,
    allowances: HashMap<(AssetId, Identity, Identity), Amount>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new units of `asset` in `holder`'s account.
    pub fn mint(&mut self, asset: AssetId, holder: Identity, amount: Amount) {
        let entry = self.balances.entry((holder, asset)).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Set (not add to) the allowance `owner` grants `spender` on `asset`.
    pub fn approve(&mut self, asset: AssetId, owner: Identity, spender: Identity, amount: Amount) {
        self.allowances.insert((asset, owner, spender), amount);
    }

    /// Sum of every holder's balance of `asset`.
    #[must_use]
    pub fn total_supply(&self, asset: AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((_, a), _)| *a == asset)
            .fold(0, |acc, (_, amount)| acc.saturating_add(*amount))
    }

    fn move_balance(
        &mut self,
        asset: AssetId,
        from: Identity,
        to: Identity,
        amount: Amount,
    ) -> Result<(), TransferRejection> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(TransferRejection::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or_else(|| TransferRejection::Other("recipient balance overflow".into()))?;

        // Self-transfers leave the balance as it was.
        if from == to {
            return Ok(());
        }
        self.balances.insert((from, asset), available - amount);
        self.balances.insert((to, asset), credited);
        Ok(())
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, asset: AssetId, holder: Identity) -> Amount {
        self.balances.get(&(holder, asset)).copied().unwrap_or(0)
    }

    fn allowance(&self, asset: AssetId, owner: Identity, spender: Identity) -> Amount {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer_from(
        &mut self,
        spender: Identity,
        asset: AssetId,
        from: Identity,
        to: Identity,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferRejection> {
        let approved = self.allowance(asset, from, spender);
        if approved < amount {
            return Err(TransferRejection::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }

        self.move_balance(asset, from, to, amount)?;
        self.allowances
            .insert((asset, from, spender), approved - amount);

        Ok(TransferReceipt {
            spender,
            asset,
            from,
            to,
            amount,
        })
    }

    fn rollback(&mut self, receipt: &TransferReceipt) -> Result<(), TransferRejection> {
        let restored = self
            .allowance(receipt.asset, receipt.from, receipt.spender)
            .checked_add(receipt.amount)
            .ok_or(TransferRejection::NotReversible)?;

        self.move_balance(receipt.asset, receipt.to, receipt.from, receipt.amount)
            .map_err(|_| TransferRejection::NotReversible)?;
        self.allowances
            .insert((receipt.asset, receipt.from, receipt.spender), restored);
        Ok(())
    }
}
