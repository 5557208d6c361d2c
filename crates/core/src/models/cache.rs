use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use super::budget::{Budget, MonthSnapshot, PocketsSnapshot};
use super::expense::Expense;
use super::income::AdditionalIncome;
use super::month::MonthKey;

/// Lifecycle of one month's cached snapshot.
///
/// `Idle → Fetching → Fresh → (mutation) → Stale → Fetching`. A failed fetch
/// lands in `Failed`, which the next read treats like `Stale`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthState {
    /// Never requested this session
    #[default]
    Idle,
    /// A request is in flight
    Fetching,
    /// Holds the latest confirmed snapshot
    Fresh,
    /// Invalidated; must be refetched before it can be trusted
    Stale,
    /// Last fetch failed; nothing was committed
    Failed,
}

impl std::fmt::Display for MonthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthState::Idle => write!(f, "Idle"),
            MonthState::Fetching => write!(f, "Fetching"),
            MonthState::Fresh => write!(f, "Fresh"),
            MonthState::Stale => write!(f, "Stale"),
            MonthState::Failed => write!(f, "Failed"),
        }
    }
}

/// Which field of a snapshot a partial update replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheField {
    Budget,
    Expenses,
    AdditionalIncomes,
}

/// A single-field replacement for a cached snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheUpdate {
    Budget(Option<Budget>),
    Expenses(Vec<Expense>),
    AdditionalIncomes(Vec<AdditionalIncome>),
}

impl CacheUpdate {
    #[must_use]
    pub fn field(&self) -> CacheField {
        match self {
            CacheUpdate::Budget(_) => CacheField::Budget,
            CacheUpdate::Expenses(_) => CacheField::Expenses,
            CacheUpdate::AdditionalIncomes(_) => CacheField::AdditionalIncomes,
        }
    }
}

/// An entry that lives in a month's list and is owned by the month of its
/// `date`.
pub trait CachedEntry: Clone {
    fn entry_id(&self) -> &str;

    /// The raw date string as stored by the backend.
    fn raw_date(&self) -> &str;

    /// Wrap a full list of these entries as a cache update.
    fn cache_update(list: Vec<Self>) -> CacheUpdate;
}

impl CachedEntry for Expense {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn raw_date(&self) -> &str {
        &self.date
    }

    fn cache_update(list: Vec<Self>) -> CacheUpdate {
        CacheUpdate::Expenses(list)
    }
}

impl CachedEntry for AdditionalIncome {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn raw_date(&self) -> &str {
        &self.date
    }

    fn cache_update(list: Vec<Self>) -> CacheUpdate {
        CacheUpdate::AdditionalIncomes(list)
    }
}

/// Session-scoped store of the last known authoritative snapshot per month.
///
/// - Entries never expire by time, only by [`MonthCache::invalidate`].
/// - Invalidating a month always drops the following month too: its
///   carry-over is a function of this month's ending balances.
/// - Invalidation is an idempotent delete, so racing callers (realtime push,
///   local mutation) can never conflict.
#[derive(Debug, Clone, Default)]
pub struct MonthCache {
    entries: HashMap<MonthKey, MonthSnapshot>,
    pockets: HashMap<MonthKey, PocketsSnapshot>,
    states: HashMap<MonthKey, MonthState>,
}

impl MonthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot for a month, if any.
    pub fn get(&self, key: MonthKey) -> Option<&MonthSnapshot> {
        self.entries.get(&key)
    }

    /// Store a full snapshot, replacing whatever was there.
    pub fn set(&mut self, key: MonthKey, snapshot: MonthSnapshot) {
        self.entries.insert(key, snapshot);
        self.states.insert(key, MonthState::Fresh);
        trace!(month = %key, "month snapshot stored");
    }

    /// Cached pockets/balances for a month, if any.
    pub fn get_pockets(&self, key: MonthKey) -> Option<&PocketsSnapshot> {
        self.pockets.get(&key)
    }

    pub fn set_pockets(&mut self, key: MonthKey, snapshot: PocketsSnapshot) {
        self.pockets.insert(key, snapshot);
    }

    /// Drop the cached data for `key` and for the month after it.
    ///
    /// Returns how many slots were actually removed; calling it again right
    /// away removes nothing and leaves the cache unchanged.
    pub fn invalidate(&mut self, key: MonthKey) -> usize {
        let next = key.next();
        let mut removed = 0;
        for month in [key, next] {
            if self.entries.remove(&month).is_some() {
                removed += 1;
            }
            if self.pockets.remove(&month).is_some() {
                removed += 1;
            }
            if let Some(state) = self.states.get_mut(&month) {
                if *state != MonthState::Idle {
                    *state = MonthState::Stale;
                }
            }
        }
        debug!(month = %key, next = %next, removed, "month cache invalidated");
        removed
    }

    /// Replace one field of a month's snapshot, leaving the others alone.
    /// Starts from an empty snapshot when the month isn't cached yet.
    pub fn update_partial(&mut self, key: MonthKey, update: CacheUpdate) {
        let field = update.field();
        let snapshot = self.entries.entry(key).or_default();
        match update {
            CacheUpdate::Budget(budget) => snapshot.budget = budget,
            CacheUpdate::Expenses(expenses) => snapshot.expenses = expenses,
            CacheUpdate::AdditionalIncomes(incomes) => snapshot.additional_incomes = incomes,
        }
        trace!(month = %key, ?field, "month snapshot partially updated");
    }

    /// Current lifecycle state of a month.
    pub fn state(&self, key: MonthKey) -> MonthState {
        self.states.get(&key).copied().unwrap_or_default()
    }

    /// Whether the cached snapshot for a month can be shown as-is. Slots
    /// built only from partial updates, or kept after a failed fetch, are not.
    pub fn is_fresh(&self, key: MonthKey) -> bool {
        self.state(key) == MonthState::Fresh && self.entries.contains_key(&key)
    }

    /// Mark a month as having a request in flight.
    pub fn begin_fetch(&mut self, key: MonthKey) {
        self.states.insert(key, MonthState::Fetching);
    }

    /// Commit a fetched snapshot to its own month, whichever month is on
    /// screen by the time it arrives.
    pub fn complete_fetch(&mut self, key: MonthKey, snapshot: MonthSnapshot) {
        self.set(key, snapshot);
    }

    /// Record a failed fetch. The previous entry (if any) is left intact.
    pub fn fail_fetch(&mut self, key: MonthKey) {
        self.states.insert(key, MonthState::Failed);
    }

    /// Months that currently hold a snapshot, oldest first.
    pub fn cached_months(&self) -> Vec<MonthKey> {
        let mut months: Vec<MonthKey> = self.entries.keys().copied().collect();
        months.sort();
        months
    }

    /// Number of cached month snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear everything (end of session).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pockets.clear();
        self.states.clear();
    }
}
