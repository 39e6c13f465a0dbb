//! The exchange registry.
//!
//! Holds every exchange record keyed by [`ExchangeId`], an append-only
//! creation index, and the event log. All mutations are total-or-nothing:
//! every check runs before the first write, so a rejected call leaves the
//! table, the index, and the log exactly as they were.
//!
//! ## Swap flow
//!
//! ```text
//! lookup (active?) → quote = floor(base × rate / 10^18)
//!     → preflight QUOTE_IN (caller → owner) and BASE_OUT (owner → caller)
//!     → transfer QUOTE_IN → transfer BASE_OUT ──fail──▶ rollback QUOTE_IN
//!     → append SWAPPED
//! ```

use std::collections::HashMap;

use fixedswap_types::{
    Amount, AssetId, EventKind, ExchangeDetails, ExchangeId, ExchangeRecord, FixedSwapError,
    Identity, Rate, RegistryConfig, RegistryEvent, Result, TransferLeg, quote_amount_for,
};

use crate::asset_ledger::AssetLedger;
use crate::event_log::EventLog;

/// Amounts moved by a successful swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Quote asset paid by the caller to the owner.
    pub quote_amount: Amount,
    /// Base asset paid by the owner to the caller.
    pub base_amount: Amount,
}

/// Registry of fixed-rate exchange pairs.
///
/// Callers identify themselves explicitly on every mutating call; the
/// registry itself acts as `config.spender` towards the asset ledger.
#[derive(Debug)]
pub struct ExchangeRegistry {
    config: RegistryConfig,
    exchanges: HashMap<ExchangeId, ExchangeRecord>,
    /// Creation order. Never shrinks, never reorders.
    index: Vec<ExchangeId>,
    events: EventLog,
}

impl ExchangeRegistry {
    /// Create an empty registry from a validated configuration.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            exchanges: HashMap::new(),
            index: Vec::new(),
            events: EventLog::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The identity owners and callers must approve for transfers.
    #[must_use]
    pub fn spender(&self) -> Identity {
        self.config.spender
    }

    /// The id `create` would assign for this triple.
    #[must_use]
    pub fn exchange_id_for(quote_asset: AssetId, base_asset: AssetId, owner: Identity) -> ExchangeId {
        ExchangeId::derive(quote_asset, base_asset, owner)
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Register a new pair owned by `caller`. The record starts active.
    ///
    /// # Errors
    /// - `AlreadyExists` if `caller` already registered this pair
    /// - `InvalidAsset` on a null asset or `quote_asset == base_asset`
    /// - `InvalidRate` if `rate` is zero
    pub fn create(
        &mut self,
        caller: Identity,
        quote_asset: AssetId,
        base_asset: AssetId,
        rate: Rate,
    ) -> Result<ExchangeId> {
        let id = ExchangeId::derive(quote_asset, base_asset, caller);

        if self.exchanges.get(&id).is_some_and(|r| !r.rate.is_zero()) {
            return Err(FixedSwapError::AlreadyExists(id));
        }
        if quote_asset.is_null() || base_asset.is_null() {
            return Err(FixedSwapError::InvalidAsset {
                reason: "asset must not be the null identity".into(),
            });
        }
        if quote_asset == base_asset {
            return Err(FixedSwapError::InvalidAsset {
                reason: format!("quote and base asset are both {quote_asset}"),
            });
        }
        if rate.is_zero() {
            return Err(FixedSwapError::InvalidRate);
        }

        self.exchanges
            .insert(id, ExchangeRecord::new(caller, quote_asset, base_asset, rate));
        self.index.push(id);

        self.events.push(EventKind::ExchangeCreated {
            exchange_id: id,
            owner: caller,
            quote_asset,
            base_asset,
            rate,
        });
        self.events.push(EventKind::ExchangeActivated {
            exchange_id: id,
            by: caller,
        });

        tracing::info!(
            registry = %self.config.label,
            exchange_id = %id.short(),
            owner = %caller.short(),
            %rate,
            count = self.index.len(),
            "Exchange created"
        );
        Ok(id)
    }

    /// Swap `base_amount` of the exchange's base asset for the matching
    /// quote amount. Both transfers happen or neither does.
    ///
    /// # Errors
    /// - `NoSuchExchange` if the record is missing or inactive
    /// - `ArithmeticOverflow` if the quote amount is unrepresentable
    /// - `TransferFailed { leg }` if either leg is rejected
    /// - `Internal` if a failed swap could not be compensated
    pub fn swap<L: AssetLedger>(
        &mut self,
        ledger: &mut L,
        caller: Identity,
        id: ExchangeId,
        base_amount: Amount,
    ) -> Result<SwapOutcome> {
        let record = self.active_record(id)?;
        let quote_amount = quote_amount_for(base_amount, record.rate)?;
        let (owner, quote_asset, base_asset) = (record.owner, record.quote_asset, record.base_asset);
        let spender = self.config.spender;

        // Preflight both legs before moving anything.
        Self::check_leg(ledger, spender, TransferLeg::QuoteIn, quote_asset, caller, quote_amount)
            .inspect_err(|e| Self::log_rejected_swap(id, caller, e))?;
        Self::check_leg(ledger, spender, TransferLeg::BaseOut, base_asset, owner, base_amount)
            .inspect_err(|e| Self::log_rejected_swap(id, caller, e))?;

        let quote_receipt = ledger
            .transfer_from(spender, quote_asset, caller, owner, quote_amount)
            .map_err(|r| FixedSwapError::TransferFailed {
                leg: TransferLeg::QuoteIn,
                reason: r.to_string(),
            })
            .inspect_err(|e| Self::log_rejected_swap(id, caller, e))?;

        if let Err(rejection) = ledger.transfer_from(spender, base_asset, owner, caller, base_amount) {
            tracing::warn!(
                exchange_id = %id.short(),
                caller = %caller.short(),
                %rejection,
                "Base leg failed after quote leg committed, rolling back"
            );
            if let Err(rollback_err) = ledger.rollback(&quote_receipt) {
                tracing::error!(
                    exchange_id = %id.short(),
                    caller = %caller.short(),
                    %rollback_err,
                    quote_amount,
                    "Quote leg rollback failed"
                );
                return Err(FixedSwapError::Internal(format!(
                    "swap on {id} left quote leg committed: base leg failed ({rejection}), \
                     rollback failed ({rollback_err})"
                )));
            }
            return Err(FixedSwapError::TransferFailed {
                leg: TransferLeg::BaseOut,
                reason: rejection.to_string(),
            });
        }

        self.events.push(EventKind::Swapped {
            exchange_id: id,
            by: caller,
            quote_amount,
            base_amount,
        });
        tracing::info!(
            registry = %self.config.label,
            exchange_id = %id.short(),
            caller = %caller.short(),
            quote_amount,
            base_amount,
            "Swapped"
        );

        Ok(SwapOutcome {
            quote_amount,
            base_amount,
        })
    }

    /// Change the rate of an exchange. Owner only; allowed while inactive.
    ///
    /// # Errors
    /// - `NoSuchExchange` if no record exists at `id`
    /// - `Unauthorized` if `caller` is not the owner
    /// - `InvalidRate` if `new_rate` is zero
    pub fn set_rate(&mut self, caller: Identity, id: ExchangeId, new_rate: Rate) -> Result<()> {
        let record = self.owned_record_mut(caller, id)?;
        if new_rate.is_zero() {
            return Err(FixedSwapError::InvalidRate);
        }
        let old_rate = record.rate;
        record.rate = new_rate;

        self.events.push(EventKind::ExchangeRateChanged {
            exchange_id: id,
            by: caller,
            new_rate,
        });
        tracing::info!(
            exchange_id = %id.short(),
            %old_rate,
            %new_rate,
            "Exchange rate changed"
        );
        Ok(())
    }

    /// Re-enable swaps. Owner only.
    ///
    /// # Errors
    /// `NoSuchExchange`, `Unauthorized`, or `AlreadyActive`.
    pub fn activate(&mut self, caller: Identity, id: ExchangeId) -> Result<()> {
        let record = self.owned_record_mut(caller, id)?;
        if record.active {
            return Err(FixedSwapError::AlreadyActive(id));
        }
        record.active = true;

        let seq = self
            .events
            .push(EventKind::ExchangeActivated {
                exchange_id: id,
                by: caller,
            })
            .sequence;
        tracing::info!(exchange_id = %id.short(), seq, "Exchange activated");
        Ok(())
    }

    /// Disable swaps. Owner only.
    ///
    /// # Errors
    /// `NoSuchExchange`, `Unauthorized`, or `AlreadyInactive`.
    pub fn deactivate(&mut self, caller: Identity, id: ExchangeId) -> Result<()> {
        let record = self.owned_record_mut(caller, id)?;
        if !record.active {
            return Err(FixedSwapError::AlreadyInactive(id));
        }
        record.active = false;

        let seq = self
            .events
            .push(EventKind::ExchangeDeactivated {
                exchange_id: id,
                by: caller,
            })
            .sequence;
        tracing::info!(exchange_id = %id.short(), seq, "Exchange deactivated");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Quote amount a swap of `base_amount` would cost right now.
    ///
    /// # Errors
    /// `NoSuchExchange` if missing or inactive, `ArithmeticOverflow` on
    /// unrepresentable results.
    pub fn quote_amount_for(&self, id: ExchangeId, base_amount: Amount) -> Result<Amount> {
        let record = self.active_record(id)?;
        quote_amount_for(base_amount, record.rate)
    }

    /// Base asset the owner can actually deliver: the lesser of the owner's
    /// balance and its allowance to the registry. Zero for missing or
    /// inactive exchanges.
    ///
    /// Advisory only; it can go stale before a swap executes.
    pub fn available_supply<L: AssetLedger>(&self, ledger: &L, id: ExchangeId) -> Amount {
        match self.exchanges.get(&id) {
            Some(record) if record.active => self.owner_capacity(ledger, record),
            _ => 0,
        }
    }

    /// Full record plus computed supply, or `None` if nothing is registered
    /// at `id`.
    pub fn describe<L: AssetLedger>(&self, ledger: &L, id: ExchangeId) -> Option<ExchangeDetails> {
        let record = self.exchanges.get(&id)?;
        let supply = self.available_supply(ledger, id);
        Some(ExchangeDetails::from_record(id, record, supply))
    }

    /// Read-only view of a stored record.
    #[must_use]
    pub fn record(&self, id: ExchangeId) -> Option<&ExchangeRecord> {
        self.exchanges.get(&id)
    }

    /// Every exchange id ever created, in creation order.
    #[must_use]
    pub fn list(&self) -> &[ExchangeId] {
        &self.index
    }

    /// Active exchanges delivering `base_asset` with non-zero supply, in
    /// creation order.
    pub fn list_for_asset<L: AssetLedger>(&self, ledger: &L, base_asset: AssetId) -> Vec<ExchangeId> {
        self.index
            .iter()
            .copied()
            .filter(|id| {
                self.exchanges
                    .get(id)
                    .is_some_and(|r| r.active && r.base_asset == base_asset)
            })
            .filter(|id| self.available_supply(ledger, *id) > 0)
            .collect()
    }

    /// Exchanges created by `owner`, in creation order.
    #[must_use]
    pub fn list_for_owner(&self, owner: Identity) -> Vec<ExchangeId> {
        self.index
            .iter()
            .copied()
            .filter(|id| self.exchanges.get(id).is_some_and(|r| r.owner == owner))
            .collect()
    }

    /// Number of exchanges ever created.
    #[must_use]
    pub fn count(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_active(&self, id: ExchangeId) -> bool {
        self.exchanges.get(&id).is_some_and(|r| r.active)
    }

    pub fn events(&self) -> impl Iterator<Item = &RegistryEvent> {
        self.events.iter()
    }

    #[must_use]
    pub fn events_since(&self, sequence: u64) -> &[RegistryEvent] {
        self.events.since(sequence)
    }

    pub fn events_for(&self, id: ExchangeId) -> impl Iterator<Item = &RegistryEvent> {
        self.events.for_exchange(id)
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn active_record(&self, id: ExchangeId) -> Result<&ExchangeRecord> {
        self.exchanges
            .get(&id)
            .filter(|r| r.active && !r.rate.is_zero())
            .ok_or(FixedSwapError::NoSuchExchange(id))
    }

    fn owned_record_mut(&mut self, caller: Identity, id: ExchangeId) -> Result<&mut ExchangeRecord> {
        let record = self
            .exchanges
            .get_mut(&id)
            .ok_or(FixedSwapError::NoSuchExchange(id))?;
        if !record.is_owned_by(caller) {
            return Err(FixedSwapError::Unauthorized {
                caller,
                exchange_id: id,
            });
        }
        Ok(record)
    }

    fn owner_capacity<L: AssetLedger>(&self, ledger: &L, record: &ExchangeRecord) -> Amount {
        let balance = ledger.balance_of(record.base_asset, record.owner);
        let approved = ledger.allowance(record.base_asset, record.owner, self.config.spender);
        balance.min(approved)
    }

    fn check_leg<L: AssetLedger>(
        ledger: &L,
        spender: Identity,
        leg: TransferLeg,
        asset: AssetId,
        from: Identity,
        amount: Amount,
    ) -> Result<()> {
        let approved = ledger.allowance(asset, from, spender);
        if approved < amount {
            return Err(FixedSwapError::TransferFailed {
                leg,
                reason: format!("insufficient allowance: need {amount}, approved {approved}"),
            });
        }
        let balance = ledger.balance_of(asset, from);
        if balance < amount {
            return Err(FixedSwapError::TransferFailed {
                leg,
                reason: format!("insufficient balance: need {amount}, have {balance}"),
            });
        }
        Ok(())
    }

    fn log_rejected_swap(id: ExchangeId, caller: Identity, err: &FixedSwapError) {
        tracing::warn!(
            exchange_id = %id.short(),
            caller = %caller.short(),
            error = %err,
            "Swap rejected"
        );
    }
}
