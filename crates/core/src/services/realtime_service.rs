use tracing::{debug, info};

use crate::models::cache::MonthCache;
use crate::models::month::MonthKey;
use crate::models::realtime::{ChangeCategory, ChangeEvent, RealtimeFilter, RefetchPlan};

const BUDGET_MARKERS: [&str; 3] = ["budget_", "expense", "income"];
const POCKET_MARKERS: [&str; 2] = ["pockets_", "transfer"];

/// Turns pushed backend changes into invalidations and refetches.
///
/// Shares the cache's invalidation primitive with local mutations, so a push
/// racing a local edit just deletes the same slot twice.
pub struct RealtimeService;

impl RealtimeService {
    pub fn new() -> Self {
        Self
    }

    /// Classify a changed key by substring.
    pub fn classify(&self, key: &str) -> ChangeCategory {
        let budget = BUDGET_MARKERS.iter().any(|m| key.contains(m));
        let pockets = POCKET_MARKERS.iter().any(|m| key.contains(m));
        match (budget, pockets) {
            (true, true) => ChangeCategory::Both,
            (true, false) => ChangeCategory::BudgetData,
            (false, true) => ChangeCategory::PocketData,
            (false, false) => ChangeCategory::Unknown,
        }
    }

    /// Which refetches an event requires. Errs toward over-fetching:
    /// deletes always refetch budget data, and an unrecognized key refetches
    /// everything.
    pub fn plan(&self, event: &ChangeEvent) -> RefetchPlan {
        let category = self.classify(&event.key);
        let mut plan = match category {
            ChangeCategory::BudgetData => RefetchPlan { budget: true, pockets: false },
            ChangeCategory::PocketData => RefetchPlan { budget: false, pockets: true },
            ChangeCategory::Both | ChangeCategory::Unknown => {
                RefetchPlan { budget: true, pockets: true }
            }
        };
        if event.is_delete() {
            plan.budget = true;
        }
        plan
    }

    /// Handle one event for the month on screen.
    ///
    /// Returns `None` when the event is outside the month's filter. Otherwise
    /// the month (and so the next one) is invalidated and the refetch plan is
    /// returned.
    pub fn reconcile(
        &self,
        cache: &mut MonthCache,
        current: MonthKey,
        event: &ChangeEvent,
    ) -> Option<RefetchPlan> {
        if !RealtimeFilter::for_month(current).matches(event) {
            debug!(key = %event.key, month = %current, "change ignored, outside current month");
            return None;
        }

        cache.invalidate(current);
        let plan = self.plan(event);
        info!(
            event = %event.event_type,
            key = %event.key,
            budget = plan.budget,
            pockets = plan.pockets,
            "realtime change reconciled"
        );
        Some(plan)
    }
}

impl Default for RealtimeService {
    fn default() -> Self {
        Self::new()
    }
}
