//! Thread-safe handle over a registry and its asset ledger.
//!
//! One mutex guards the registry *and* the ledger together, so each
//! operation (including both swap transfers) runs as a single critical
//! section. That gives every mutation one total order across threads, and
//! no caller ever gets a mutable reference to a record.

use std::sync::{Arc, Mutex, MutexGuard};

use fixedswap_types::{
    Amount, AssetId, ExchangeDetails, ExchangeId, FixedSwapError, Identity, Rate, RegistryConfig,
    RegistryEvent, Result,
};

use crate::asset_ledger::AssetLedger;
use crate::registry::{ExchangeRegistry, SwapOutcome};

#[derive(Debug)]
struct Inner<L> {
    registry: ExchangeRegistry,
    ledger: L,
}

/// Cloneable, `Send + Sync` registry handle.
#[derive(Debug)]
pub struct SharedRegistry<L> {
    inner: Arc<Mutex<Inner<L>>>,
}

impl<L> Clone for SharedRegistry<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: AssetLedger> SharedRegistry<L> {
    pub fn new(config: RegistryConfig, ledger: L) -> Result<Self> {
        Ok(Self::from_parts(ExchangeRegistry::new(config)?, ledger))
    }

    #[must_use]
    pub fn from_parts(registry: ExchangeRegistry, ledger: L) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { registry, ledger })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<L>>> {
        self.inner
            .lock()
            .map_err(|_| FixedSwapError::Internal("registry lock poisoned".into()))
    }

    pub fn create(
        &self,
        caller: Identity,
        quote_asset: AssetId,
        base_asset: AssetId,
        rate: Rate,
    ) -> Result<ExchangeId> {
        self.lock()?.registry.create(caller, quote_asset, base_asset, rate)
    }

    pub fn swap(&self, caller: Identity, id: ExchangeId, base_amount: Amount) -> Result<SwapOutcome> {
        let mut guard = self.lock()?;
        let Inner { registry, ledger } = &mut *guard;
        registry.swap(ledger, caller, id, base_amount)
    }

    pub fn set_rate(&self, caller: Identity, id: ExchangeId, new_rate: Rate) -> Result<()> {
        self.lock()?.registry.set_rate(caller, id, new_rate)
    }

    pub fn activate(&self, caller: Identity, id: ExchangeId) -> Result<()> {
        self.lock()?.registry.activate(caller, id)
    }

    pub fn deactivate(&self, caller: Identity, id: ExchangeId) -> Result<()> {
        self.lock()?.registry.deactivate(caller, id)
    }

    pub fn quote_amount_for(&self, id: ExchangeId, base_amount: Amount) -> Result<Amount> {
        self.lock()?.registry.quote_amount_for(id, base_amount)
    }

    pub fn available_supply(&self, id: ExchangeId) -> Result<Amount> {
        let guard = self.lock()?;
        Ok(guard.registry.available_supply(&guard.ledger, id))
    }

    pub fn describe(&self, id: ExchangeId) -> Result<Option<ExchangeDetails>> {
        let guard = self.lock()?;
        Ok(guard.registry.describe(&guard.ledger, id))
    }

    /// Snapshot of all exchange ids in creation order.
    pub fn list(&self) -> Result<Vec<ExchangeId>> {
        Ok(self.lock()?.registry.list().to_vec())
    }

    pub fn list_for_asset(&self, base_asset: AssetId) -> Result<Vec<ExchangeId>> {
        let guard = self.lock()?;
        Ok(guard.registry.list_for_asset(&guard.ledger, base_asset))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.lock()?.registry.count())
    }

    pub fn is_active(&self, id: ExchangeId) -> Result<bool> {
        Ok(self.lock()?.registry.is_active(id))
    }

    /// Copy of the event log from `sequence` onwards.
    pub fn events_since(&self, sequence: u64) -> Result<Vec<RegistryEvent>> {
        Ok(self.lock()?.registry.events_since(sequence).to_vec())
    }

    /// Run `f` with shared access to the ledger, e.g. to read balances.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&L) -> R) -> Result<R> {
        Ok(f(&self.lock()?.ledger))
    }

    /// Run `f` with exclusive access to the ledger, e.g. to fund accounts.
    pub fn with_ledger_mut<R>(&self, f: impl FnOnce(&mut L) -> R) -> Result<R> {
        Ok(f(&mut self.lock()?.ledger))
    }
}
