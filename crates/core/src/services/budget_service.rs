use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use crate::backend::traits::LedgerBackend;
use crate::errors::CoreError;
use crate::models::budget::{MonthSnapshot, PocketsSnapshot};
use crate::models::cache::{CacheUpdate, MonthCache};
use crate::models::month::MonthKey;
use crate::models::pocket::PocketBalance;
use crate::services::ledger_service::LedgerService;

/// Cache-first access to month data.
///
/// Read strategy:
/// - **Fresh month**: served immediately, no round-trip. Entries never
///   expire by age; only invalidation removes them.
/// - **Anything else** (missing, stale, failed, or only partially filled):
///   fetched from the backend, then stored.
/// - **Failed fetch**: nothing is committed; the error goes back to the caller.
pub struct BudgetService {
    backend: Box<dyn LedgerBackend>,
}

impl BudgetService {
    pub fn new(backend: Box<dyn LedgerBackend>) -> Self {
        Self { backend }
    }

    /// The backend writes go through.
    pub fn backend(&self) -> &dyn LedgerBackend {
        self.backend.as_ref()
    }

    /// Budget, expenses and incomes for a month.
    #[instrument(skip_all, fields(month = %month))]
    pub async fn get_month(
        &self,
        cache: &mut MonthCache,
        month: MonthKey,
    ) -> Result<MonthSnapshot, CoreError> {
        if cache.is_fresh(month) {
            if let Some(snapshot) = cache.get(month) {
                debug!("month cache hit");
                return Ok(snapshot.clone());
            }
        }

        debug!(backend = self.backend.name(), "month cache miss, fetching");
        cache.begin_fetch(month);
        match self.backend.fetch_budget(month).await {
            Ok(snapshot) => {
                cache.complete_fetch(month, snapshot.clone());
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "month fetch failed");
                cache.fail_fetch(month);
                Err(e)
            }
        }
    }

    /// Pockets and balances for a month.
    #[instrument(skip_all, fields(month = %month))]
    pub async fn get_pockets(
        &self,
        cache: &mut MonthCache,
        month: MonthKey,
    ) -> Result<PocketsSnapshot, CoreError> {
        if let Some(snapshot) = cache.get_pockets(month) {
            debug!("pockets cache hit");
            return Ok(snapshot.clone());
        }

        let snapshot = self.backend.fetch_pockets(month).await?;
        cache.set_pockets(month, snapshot.clone());
        Ok(snapshot)
    }

    /// Ending balances of the month before `month`, or `None` when there is
    /// no usable prior data.
    ///
    /// A first month of use (nothing there, or a 404) is a normal state. A
    /// failed fetch is logged and also reads as "no data", so carry-over falls
    /// back to zero instead of failing the whole view.
    pub async fn previous_balances(
        &self,
        cache: &mut MonthCache,
        ledger: &LedgerService,
        month: MonthKey,
    ) -> Option<HashMap<String, PocketBalance>> {
        let prev = month.previous();
        match self.get_pockets(cache, prev).await {
            Ok(snapshot) if snapshot.pockets.is_empty() && snapshot.balances.is_empty() => None,
            Ok(snapshot) => Some(ledger.resolve_balances(&snapshot)),
            Err(CoreError::NotFound(_)) => {
                debug!(month = %prev, "no previous month data");
                None
            }
            Err(e) => {
                warn!(month = %prev, error = %e, "previous month unavailable, carry-over treated as zero");
                None
            }
        }
    }

    /// Drop `month` and the month after it.
    pub fn invalidate(&self, cache: &mut MonthCache, month: MonthKey) -> usize {
        cache.invalidate(month)
    }

    /// Replace one field of a month's cached snapshot.
    pub fn update_partial(&self, cache: &mut MonthCache, month: MonthKey, update: CacheUpdate) {
        cache.update_partial(month, update);
    }
}
