//! Entity stores keyed by address.
//!
//! An address must be tracked (have an entry) before any fetch for it is
//! issued. Entries are created empty, populated asynchronously through the
//! commit operations, and never deleted within a session.

use std::sync::RwLock;

use chrono::Utc;
use rustc_hash::FxHashMap;

use crate::cache::FetchSlot;
use crate::types::{ChartDayData, ProtocolData, Transaction};

/// The independently-fetched pieces of data an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Snapshot,
    Chart,
    Transactions,
}

/// Cached analytics for one entity address.
#[derive(Debug, Clone)]
pub struct CacheEntry<D> {
    pub snapshot: FetchSlot<D>,
    pub chart: FetchSlot<Vec<ChartDayData>>,
    pub transactions: FetchSlot<Vec<Transaction>>,
    /// Wall-clock time of the last snapshot commit.
    pub last_updated: Option<i64>,
}

impl<D> Default for CacheEntry<D> {
    fn default() -> Self {
        Self {
            snapshot: FetchSlot::Empty,
            chart: FetchSlot::Empty,
            transactions: FetchSlot::Empty,
            last_updated: None,
        }
    }
}

impl<D> CacheEntry<D> {
    fn slot_mut(&mut self, kind: DataKind) -> &mut dyn Claimable {
        match kind {
            DataKind::Snapshot => &mut self.snapshot,
            DataKind::Chart => &mut self.chart,
            DataKind::Transactions => &mut self.transactions,
        }
    }
}

/// Object-safe view of a slot for kind-dispatched claim/fail operations.
trait Claimable {
    fn begin(&mut self) -> bool;
    fn fail(&mut self);
}

impl<T> Claimable for FetchSlot<T> {
    fn begin(&mut self) -> bool {
        FetchSlot::begin(self)
    }

    fn fail(&mut self) {
        FetchSlot::fail(self)
    }
}

/// Address-keyed store for one entity kind (pools or tokens).
#[derive(Debug, Default)]
pub struct EntityStore<D> {
    entries: RwLock<FxHashMap<String, CacheEntry<D>>>,
}

impl<D: Clone> EntityStore<D> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Creates empty entries for addresses not yet tracked. Idempotent.
    pub fn track(&self, addresses: &[String]) {
        let mut entries = self.write();
        for address in addresses {
            entries.entry(address.clone()).or_default();
        }
    }

    /// The subset of `addresses` without an entry yet.
    pub fn untracked(&self, addresses: &[String]) -> Vec<String> {
        let entries = self.read();
        addresses
            .iter()
            .filter(|address| !entries.contains_key(*address))
            .cloned()
            .collect()
    }

    /// Every tracked address.
    pub fn tracked(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Tracked addresses whose snapshot is absent or has never been stamped.
    pub fn stale_or_missing(&self) -> Vec<String> {
        let entries = self.read();
        entries
            .iter()
            .filter(|(_, entry)| !entry.snapshot.is_ready() || entry.last_updated.is_none())
            .map(|(address, _)| address.clone())
            .collect()
    }

    /// Claims the fetch slot for `(address, kind)`, tracking the address if
    /// needed. Returns true for exactly one caller per session; losers must
    /// not issue a network fetch.
    pub fn begin_fetch(&self, address: &str, kind: DataKind) -> bool {
        let mut entries = self.write();
        entries
            .entry(address.to_string())
            .or_default()
            .slot_mut(kind)
            .begin()
    }

    /// Marks an in-flight fetch as failed. No automatic retry follows.
    pub fn fail(&self, address: &str, kind: DataKind) {
        let mut entries = self.write();
        if let Some(entry) = entries.get_mut(address) {
            entry.slot_mut(kind).fail();
        }
    }

    /// Replaces snapshots wholesale and stamps `last_updated`.
    /// Last-write-wins; partial fields are never merged.
    pub fn commit_snapshots(&self, snapshots: Vec<(String, D)>) {
        let now = Utc::now().timestamp();
        let mut entries = self.write();
        for (address, snapshot) in snapshots {
            let entry = entries.entry(address).or_default();
            entry.snapshot.fulfill(snapshot);
            entry.last_updated = Some(now);
        }
    }

    /// Replaces the chart series wholesale.
    pub fn commit_chart(&self, address: &str, series: Vec<ChartDayData>) {
        let mut entries = self.write();
        entries
            .entry(address.to_string())
            .or_default()
            .chart
            .fulfill(series);
    }

    /// Replaces the transaction list wholesale.
    pub fn commit_transactions(&self, address: &str, transactions: Vec<Transaction>) {
        let mut entries = self.write();
        entries
            .entry(address.to_string())
            .or_default()
            .transactions
            .fulfill(transactions);
    }

    pub fn get(&self, address: &str) -> Option<CacheEntry<D>> {
        self.read().get(address).cloned()
    }

    pub fn snapshot_of(&self, address: &str) -> Option<D> {
        self.read()
            .get(address)
            .and_then(|entry| entry.snapshot.value().cloned())
    }

    pub fn chart_of(&self, address: &str) -> Option<Vec<ChartDayData>> {
        self.read()
            .get(address)
            .and_then(|entry| entry.chart.value().cloned())
    }

    pub fn transactions_of(&self, address: &str) -> Option<Vec<Transaction>> {
        self.read()
            .get(address)
            .and_then(|entry| entry.transactions.value().cloned())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, FxHashMap<String, CacheEntry<D>>> {
        self.entries.read().expect("entity store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, FxHashMap<String, CacheEntry<D>>> {
        self.entries.write().expect("entity store lock poisoned")
    }
}

/// Singleton store for protocol-level aggregates; same lifecycle as one
/// [`EntityStore`] entry.
#[derive(Debug, Default)]
pub struct ProtocolStore {
    entry: RwLock<CacheEntry<ProtocolData>>,
}

impl ProtocolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&self, kind: DataKind) -> bool {
        self.write().slot_mut(kind).begin()
    }

    pub fn fail(&self, kind: DataKind) {
        self.write().slot_mut(kind).fail();
    }

    pub fn commit_data(&self, data: ProtocolData) {
        let mut entry = self.write();
        entry.snapshot.fulfill(data);
        entry.last_updated = Some(Utc::now().timestamp());
    }

    pub fn commit_chart(&self, series: Vec<ChartDayData>) {
        self.write().chart.fulfill(series);
    }

    pub fn commit_transactions(&self, transactions: Vec<Transaction>) {
        self.write().transactions.fulfill(transactions);
    }

    pub fn get(&self) -> CacheEntry<ProtocolData> {
        self.read().clone()
    }

    pub fn data(&self) -> Option<ProtocolData> {
        self.read().snapshot.value().cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheEntry<ProtocolData>> {
        self.entry.read().expect("protocol store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CacheEntry<ProtocolData>> {
        self.entry.write().expect("protocol store lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn track_is_idempotent() {
        let store: EntityStore<u32> = EntityStore::new();
        store.track(&addresses(&["0xA", "0xB"]));
        store.track(&addresses(&["0xA"]));

        assert_eq!(store.len(), 2);
        let entry = store.get("0xA").unwrap();
        assert!(entry.snapshot.should_fetch());
        assert!(entry.last_updated.is_none());
    }

    #[test]
    fn untracked_returns_only_unknown_addresses() {
        let store: EntityStore<u32> = EntityStore::new();
        store.track(&addresses(&["0xA", "0xB"]));

        assert_eq!(
            store.untracked(&addresses(&["0xA", "0xC"])),
            addresses(&["0xC"])
        );
    }

    #[test]
    fn stale_or_missing_clears_after_commit() {
        let store: EntityStore<u32> = EntityStore::new();
        store.track(&addresses(&["0xA", "0xB"]));
        assert_eq!(store.stale_or_missing().len(), 2);

        store.commit_snapshots(vec![("0xA".to_string(), 7)]);
        assert_eq!(store.stale_or_missing(), addresses(&["0xB"]));
    }

    #[test]
    fn snapshot_commit_is_idempotent_except_timestamp() {
        let store: EntityStore<u32> = EntityStore::new();
        store.commit_snapshots(vec![("0xA".to_string(), 7)]);
        let first = store.get("0xA").unwrap();

        store.commit_snapshots(vec![("0xA".to_string(), 7)]);
        let second = store.get("0xA").unwrap();

        assert_eq!(first.snapshot.value(), second.snapshot.value());
        assert!(second.last_updated.is_some());
    }

    #[test]
    fn begin_fetch_dedupes_per_kind() {
        let store: EntityStore<u32> = EntityStore::new();
        assert!(store.begin_fetch("0xA", DataKind::Chart));
        assert!(!store.begin_fetch("0xA", DataKind::Chart));
        // Other kinds are independent slots.
        assert!(store.begin_fetch("0xA", DataKind::Transactions));
    }

    #[test]
    fn failed_fetch_is_not_reissued() {
        let store: EntityStore<u32> = EntityStore::new();
        assert!(store.begin_fetch("0xA", DataKind::Snapshot));
        store.fail("0xA", DataKind::Snapshot);
        assert!(!store.begin_fetch("0xA", DataKind::Snapshot));
    }
}
