use chrono::NaiveDate;
use tracing::debug;

use crate::models::cache::{CachedEntry, MonthCache};
use crate::models::month::MonthKey;

/// What to do with the selected month's in-memory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAction {
    Append,
    Replace,
    Remove,
    /// The entry lives elsewhere; leave the list alone.
    Keep,
}

/// Outcome of routing one confirmed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Month on screen when the write was made
    pub selected: MonthKey,
    /// Month the entry belongs to, from its own date
    pub entry_month: MonthKey,
    pub local: LocalAction,
    /// Months to invalidate (each also drops its following month)
    pub invalidate: Vec<MonthKey>,
    /// Set when the view should follow the entry to its month
    pub navigate_to: Option<MonthKey>,
}

impl RoutingDecision {
    #[must_use]
    pub fn is_cross_month(&self) -> bool {
        self.entry_month != self.selected
    }

    /// User-facing notice for an auto-navigation.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        self.navigate_to
            .map(|month| format!("Entry moved to {month}; now showing that month"))
    }
}

/// A confirmed write together with how it was routed.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome<T> {
    pub entry: T,
    pub decision: RoutingDecision,
}

/// Decides where a confirmed create/edit/delete lands.
///
/// Ownership always comes from the entry's date, not from the month being
/// viewed. The router only runs on confirmed server responses; a failed write
/// never reaches it, so local state and cache stay as they were.
pub struct MutationRouter;

impl MutationRouter {
    pub fn new() -> Self {
        Self
    }

    /// Created entry: append locally if it belongs to the selected month,
    /// otherwise leave local state alone and invalidate its own month. The
    /// selected month is invalidated either way.
    pub fn route_create(&self, selected: MonthKey, entry_date: NaiveDate) -> RoutingDecision {
        let entry_month = MonthKey::from_date(entry_date);
        let decision = if entry_month == selected {
            RoutingDecision {
                selected,
                entry_month,
                local: LocalAction::Append,
                invalidate: vec![selected],
                navigate_to: None,
            }
        } else {
            RoutingDecision {
                selected,
                entry_month,
                local: LocalAction::Keep,
                invalidate: vec![entry_month, selected],
                navigate_to: None,
            }
        };
        debug!(selected = %selected, entry_month = %entry_month, local = ?decision.local, "routed create");
        decision
    }

    /// Edited entry: compares the *new* date with the selected month. On a
    /// move, the entry leaves the local list, its new month is invalidated and
    /// the view follows it.
    pub fn route_update(&self, selected: MonthKey, new_date: NaiveDate) -> RoutingDecision {
        let entry_month = MonthKey::from_date(new_date);
        let decision = if entry_month == selected {
            RoutingDecision {
                selected,
                entry_month,
                local: LocalAction::Replace,
                invalidate: vec![selected],
                navigate_to: None,
            }
        } else {
            // The selected month lost an entry, so it is stale as well.
            RoutingDecision {
                selected,
                entry_month,
                local: LocalAction::Remove,
                invalidate: vec![entry_month, selected],
                navigate_to: Some(entry_month),
            }
        };
        debug!(selected = %selected, entry_month = %entry_month, local = ?decision.local, "routed update");
        decision
    }

    /// Deleted entry: `stored_date` is the entry's date looked up before
    /// removal. Its month is invalidated whether or not it is on screen.
    pub fn route_delete(&self, selected: MonthKey, stored_date: NaiveDate) -> RoutingDecision {
        let entry_month = MonthKey::from_date(stored_date);
        let local = if entry_month == selected {
            LocalAction::Remove
        } else {
            LocalAction::Keep
        };
        debug!(selected = %selected, entry_month = %entry_month, ?local, "routed delete");
        RoutingDecision {
            selected,
            entry_month,
            local,
            invalidate: vec![entry_month],
            navigate_to: None,
        }
    }

    /// Apply a decision to the selected month's list and the cache.
    ///
    /// `entry` is the confirmed entry for appends and replaces; `id`
    /// identifies the entry for replaces and removals.
    pub fn apply<T: CachedEntry>(
        &self,
        decision: &RoutingDecision,
        cache: &mut MonthCache,
        list: &mut Vec<T>,
        id: &str,
        entry: Option<T>,
    ) {
        let changed = match (decision.local, entry) {
            (LocalAction::Append, Some(entry)) => {
                list.push(entry);
                true
            }
            (LocalAction::Replace, Some(entry)) => {
                match list.iter_mut().find(|e| e.entry_id() == id) {
                    Some(existing) => *existing = entry,
                    None => list.push(entry),
                }
                true
            }
            (LocalAction::Remove, _) => {
                let before = list.len();
                list.retain(|e| e.entry_id() != id);
                list.len() != before
            }
            _ => false,
        };

        if changed {
            cache.update_partial(decision.selected, T::cache_update(list.clone()));
        }
        for month in &decision.invalidate {
            cache.invalidate(*month);
        }
    }
}

impl Default for MutationRouter {
    fn default() -> Self {
        Self::new()
    }
}
