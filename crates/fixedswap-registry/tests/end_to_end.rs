//! End-to-end registry scenarios.
//!
//! These tests drive the registry against a real ledger the way external
//! parties would: owners fund and approve, callers approve and swap, and
//! indexers tail the event log. They check that the balances, the record
//! table, and the audit trail agree after every step, including the paths
//! where a swap is rejected halfway.

use fixedswap_registry::{
    AssetLedger, ExchangeRegistry, InMemoryLedger, SharedRegistry, TransferReceipt,
    TransferRejection,
};
use fixedswap_types::constants::RATE_ONE;
use fixedswap_types::{
    Amount, AssetId, EventKind, FixedSwapError, Identity, Rate, RegistryConfig, RegistryEvent,
    TransferLeg,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Registry, ledger, and a funded seller/buyer pair.
struct Market {
    registry: ExchangeRegistry,
    ledger: InMemoryLedger,
    spender: Identity,
    seller: Identity,
    buyer: Identity,
    quote: AssetId,
    base: AssetId,
}

impl Market {
    fn new() -> Self {
        init_tracing();
        let spender = Identity::random();
        Self {
            registry: ExchangeRegistry::new(RegistryConfig::with_spender(spender)).unwrap(),
            ledger: InMemoryLedger::new(),
            spender,
            seller: Identity::random(),
            buyer: Identity::random(),
            quote: AssetId::random(),
            base: AssetId::random(),
        }
    }

    fn fund(&mut self, asset: AssetId, holder: Identity, amount: Amount, approve: Amount) {
        self.ledger.mint(asset, holder, amount);
        self.ledger.approve(asset, holder, self.spender, approve);
    }

    fn balances(&self) -> [Amount; 4] {
        [
            self.ledger.balance_of(self.quote, self.buyer),
            self.ledger.balance_of(self.quote, self.seller),
            self.ledger.balance_of(self.base, self.buyer),
            self.ledger.balance_of(self.base, self.seller),
        ]
    }
}

/// Ledger wrapper that rejects the N-th `transfer_from` call.
struct FaultyLedger {
    inner: InMemoryLedger,
    fail_on_call: usize,
    calls: usize,
    rollbacks: usize,
    break_rollback: bool,
}

impl FaultyLedger {
    fn new(inner: InMemoryLedger, fail_on_call: usize) -> Self {
        Self {
            inner,
            fail_on_call,
            calls: 0,
            rollbacks: 0,
            break_rollback: false,
        }
    }
}

impl AssetLedger for FaultyLedger {
    fn balance_of(&self, asset: AssetId, holder: Identity) -> Amount {
        self.inner.balance_of(asset, holder)
    }

    fn allowance(&self, asset: AssetId, owner: Identity, spender: Identity) -> Amount {
        self.inner.allowance(asset, owner, spender)
    }

    fn transfer_from(
        &mut self,
        spender: Identity,
        asset: AssetId,
        from: Identity,
        to: Identity,
        amount: Amount,
    ) -> Result<TransferReceipt, TransferRejection> {
        self.calls += 1;
        if self.calls == self.fail_on_call {
            return Err(TransferRejection::Other("asset contract paused".into()));
        }
        self.inner.transfer_from(spender, asset, from, to, amount)
    }

    fn rollback(&mut self, receipt: &TransferReceipt) -> Result<(), TransferRejection> {
        self.rollbacks += 1;
        if self.break_rollback {
            return Err(TransferRejection::NotReversible);
        }
        self.inner.rollback(receipt)
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn e2e_create_swap_reprice_and_toggle() {
    let mut m = Market::new();
    m.fund(m.base, m.seller, 100 * RATE_ONE, 100 * RATE_ONE);
    m.fund(m.quote, m.buyer, 1_000 * RATE_ONE, 1_000 * RATE_ONE);

    let id = m
        .registry
        .create(m.seller, m.quote, m.base, Rate::from_whole(2).unwrap())
        .unwrap();
    assert_eq!(m.registry.available_supply(&m.ledger, id), 100 * RATE_ONE);

    let out = m
        .registry
        .swap(&mut m.ledger, m.buyer, id, 5 * RATE_ONE)
        .unwrap();
    assert_eq!(out.quote_amount, 10 * RATE_ONE);
    assert_eq!(
        m.balances(),
        [990 * RATE_ONE, 10 * RATE_ONE, 5 * RATE_ONE, 95 * RATE_ONE]
    );
    assert_eq!(m.registry.available_supply(&m.ledger, id), 95 * RATE_ONE);

    // Owner halves the price.
    m.registry.set_rate(m.seller, id, Rate::ONE).unwrap();
    let out = m
        .registry
        .swap(&mut m.ledger, m.buyer, id, 5 * RATE_ONE)
        .unwrap();
    assert_eq!(out.quote_amount, 5 * RATE_ONE);

    // Paused exchange rejects swaps; resuming restores them.
    m.registry.deactivate(m.seller, id).unwrap();
    let before = m.balances();
    assert_eq!(
        m.registry
            .swap(&mut m.ledger, m.buyer, id, RATE_ONE)
            .unwrap_err(),
        FixedSwapError::NoSuchExchange(id)
    );
    assert_eq!(m.balances(), before);

    m.registry.activate(m.seller, id).unwrap();
    m.registry
        .swap(&mut m.ledger, m.buyer, id, RATE_ONE)
        .unwrap();

    let kinds: Vec<String> = m
        .registry
        .events_for(id)
        .map(|e| e.kind.to_string())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "EXCHANGE_CREATED",
            "EXCHANGE_ACTIVATED",
            "SWAPPED",
            "EXCHANGE_RATE_CHANGED",
            "SWAPPED",
            "EXCHANGE_DEACTIVATED",
            "EXCHANGE_ACTIVATED",
            "SWAPPED",
        ]
    );

    // Supply of both assets is conserved: swaps only move funds.
    assert_eq!(m.ledger.total_supply(m.quote), 1_000 * RATE_ONE);
    assert_eq!(m.ledger.total_supply(m.base), 100 * RATE_ONE);
}

#[test]
fn e2e_list_count_and_index_agree() {
    let mut m = Market::new();
    let mut created = Vec::new();
    for _ in 0..5 {
        let owner = Identity::random();
        created.push(
            m.registry
                .create(owner, m.quote, m.base, Rate::ONE)
                .unwrap(),
        );
    }
    // A rejected create does not touch the index.
    let dup_owner = m.registry.record(created[0]).unwrap().owner;
    assert!(m.registry.create(dup_owner, m.quote, m.base, Rate::ONE).is_err());

    assert_eq!(m.registry.list(), created.as_slice());
    assert_eq!(m.registry.count(), created.len());
    // Listing is restartable.
    assert_eq!(m.registry.list(), m.registry.list());
}

// =============================================================================
// All-or-nothing swaps
// =============================================================================

#[test]
fn e2e_quote_leg_rejected_by_ledger_moves_nothing() {
    let mut m = Market::new();
    m.fund(m.base, m.seller, 50, 50);
    m.fund(m.quote, m.buyer, 500, 500);
    let id = m
        .registry
        .create(m.seller, m.quote, m.base, Rate::from_whole(3).unwrap())
        .unwrap();
    let events_before = m.registry.event_count();
    let before = m.balances();

    let mut ledger = FaultyLedger::new(std::mem::take(&mut m.ledger), 1);
    let err = m.registry.swap(&mut ledger, m.buyer, id, 10).unwrap_err();
    assert!(matches!(
        err,
        FixedSwapError::TransferFailed {
            leg: TransferLeg::QuoteIn,
            ..
        }
    ));
    assert_eq!(ledger.rollbacks, 0);

    m.ledger = ledger.inner;
    assert_eq!(m.balances(), before);
    assert_eq!(m.registry.event_count(), events_before);
}

#[test]
fn e2e_base_leg_failure_rolls_back_quote_leg() {
    let mut m = Market::new();
    m.fund(m.base, m.seller, 50, 50);
    m.fund(m.quote, m.buyer, 500, 500);
    let id = m
        .registry
        .create(m.seller, m.quote, m.base, Rate::from_whole(3).unwrap())
        .unwrap();
    let before = m.balances();

    let mut ledger = FaultyLedger::new(std::mem::take(&mut m.ledger), 2);
    let err = m.registry.swap(&mut ledger, m.buyer, id, 10).unwrap_err();
    assert!(matches!(
        err,
        FixedSwapError::TransferFailed {
            leg: TransferLeg::BaseOut,
            ..
        }
    ));
    assert_eq!(ledger.rollbacks, 1);

    m.ledger = ledger.inner;
    assert_eq!(m.balances(), before);
    assert_eq!(m.ledger.allowance(m.quote, m.buyer, m.spender), 500);
    assert!(m.registry.events().all(|e| !matches!(e.kind, EventKind::Swapped { .. })));
}

#[test]
fn e2e_failed_compensation_is_internal_error() {
    let mut m = Market::new();
    m.fund(m.base, m.seller, 50, 50);
    m.fund(m.quote, m.buyer, 500, 500);
    let id = m
        .registry
        .create(m.seller, m.quote, m.base, Rate::ONE)
        .unwrap();

    let mut ledger = FaultyLedger::new(std::mem::take(&mut m.ledger), 2);
    ledger.break_rollback = true;
    let err = m.registry.swap(&mut ledger, m.buyer, id, 10).unwrap_err();
    assert!(matches!(err, FixedSwapError::Internal(_)), "got {err:?}");
    assert_eq!(m.registry.event_count(), 2);
}

#[test]
fn e2e_insufficient_owner_approval_caps_supply() {
    let mut m = Market::new();
    m.fund(m.base, m.seller, 100, 40);
    m.fund(m.quote, m.buyer, 1_000, 1_000);
    let id = m
        .registry
        .create(m.seller, m.quote, m.base, Rate::ONE)
        .unwrap();

    assert_eq!(m.registry.available_supply(&m.ledger, id), 40);
    let err = m
        .registry
        .swap(&mut m.ledger, m.buyer, id, 41)
        .unwrap_err();
    assert!(matches!(
        err,
        FixedSwapError::TransferFailed {
            leg: TransferLeg::BaseOut,
            ..
        }
    ));
    m.registry.swap(&mut m.ledger, m.buyer, id, 40).unwrap();
    assert_eq!(m.registry.available_supply(&m.ledger, id), 0);
    assert!(m.registry.list_for_asset(&m.ledger, m.base).is_empty());
}

// =============================================================================
// Indexer view
// =============================================================================

#[test]
fn e2e_events_serialize_for_indexers() {
    let mut m = Market::new();
    m.fund(m.base, m.seller, 10, 10);
    m.fund(m.quote, m.buyer, 10, 10);
    let id = m
        .registry
        .create(m.seller, m.quote, m.base, Rate::ONE)
        .unwrap();
    m.registry.swap(&mut m.ledger, m.buyer, id, 3).unwrap();

    let tail = m.registry.events_since(2);
    assert_eq!(tail.len(), 1);
    let json = serde_json::to_string(&tail[0]).unwrap();
    let back: RegistryEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tail[0]);
    assert_eq!(back.sequence, 2);

    let details = m.registry.describe(&m.ledger, id).unwrap();
    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["active"], true);
}

// =============================================================================
// Multi-threaded host
// =============================================================================

#[test]
fn e2e_concurrent_swaps_never_oversell() {
    init_tracing();
    let spender = Identity::random();
    let seller = Identity::random();
    let quote = AssetId::random();
    let base = AssetId::random();

    let shared =
        SharedRegistry::new(RegistryConfig::with_spender(spender), InMemoryLedger::new()).unwrap();
    let id = shared.create(seller, quote, base, Rate::ONE).unwrap();

    let buyers: Vec<Identity> = (0..8).map(|_| Identity::random()).collect();
    shared
        .with_ledger_mut(|l| {
            l.mint(base, seller, 50);
            l.approve(base, seller, spender, 50);
            for b in &buyers {
                l.mint(quote, *b, 100);
                l.approve(quote, *b, spender, 100);
            }
        })
        .unwrap();

    // 8 buyers × 10 swaps × 1 unit = 80 requested, 50 available.
    let filled: usize = std::thread::scope(|s| {
        let handles: Vec<_> = buyers
            .iter()
            .map(|b| {
                let shared = shared.clone();
                let b = *b;
                s.spawn(move || (0..10).filter(|_| shared.swap(b, id, 1).is_ok()).count())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(filled, 50);
    assert_eq!(shared.available_supply(id).unwrap(), 0);
    let (seller_quote, seller_base) = shared
        .with_ledger(|l| (l.balance_of(quote, seller), l.balance_of(base, seller)))
        .unwrap();
    assert_eq!(seller_quote, 50);
    assert_eq!(seller_base, 0);

    let swaps = shared
        .events_since(0)
        .unwrap()
        .into_iter()
        .filter(|e| matches!(e.kind, EventKind::Swapped { .. }))
        .count();
    assert_eq!(swaps, 50);
}
