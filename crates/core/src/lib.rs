pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use backend::http::HttpLedgerBackend;
use backend::traits::{ChangeFeed, LedgerBackend};
use config::ClientConfig;
use errors::CoreError;
use models::{
    budget::{Budget, MonthSnapshot, PocketsSnapshot},
    cache::{CacheUpdate, MonthCache, MonthState},
    expense::{Expense, NewExpense},
    income::{AdditionalIncome, NewIncome},
    money::{self, Amount},
    month::MonthKey,
    pocket::{Pocket, PocketBalance},
    realtime::{ChangeEvent, RealtimeFilter, RefetchPlan},
    summary::{BudgetSummary, CarryOver},
    transfer::{NewTransfer, Transfer},
};
use services::{
    budget_service::BudgetService,
    carry_over_service::CarryOverService,
    ledger_service::LedgerService,
    mutation_router::{MutationOutcome, MutationRouter, RoutingDecision},
    pocket_service::PocketService,
    realtime_service::RealtimeService,
};

/// What the selected month currently shows.
#[derive(Debug, Clone)]
struct MonthView {
    month: MonthKey,
    snapshot: MonthSnapshot,
    pockets: Option<PocketsSnapshot>,
    balances: HashMap<String, PocketBalance>,
    carry_over: CarryOver,
    loaded: bool,
}

impl MonthView {
    fn empty(month: MonthKey) -> Self {
        Self {
            month,
            snapshot: MonthSnapshot::default(),
            pockets: None,
            balances: HashMap::new(),
            carry_over: CarryOver::zero(),
            loaded: false,
        }
    }
}

/// Main entry point for the Pocket Ledger core library.
///
/// Owns the session's month cache and the state of the month on screen, and
/// routes every read, write and pushed change through the services. One
/// instance per session: the cache lives exactly as long as it does.
#[must_use]
pub struct BudgetTracker {
    config: ClientConfig,
    cache: MonthCache,
    budget_service: BudgetService,
    ledger_service: LedgerService,
    carry_over_service: CarryOverService,
    pocket_service: PocketService,
    mutation_router: MutationRouter,
    realtime_service: RealtimeService,
    feed: Option<Box<dyn ChangeFeed>>,
    view: MonthView,
}

impl std::fmt::Debug for BudgetTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetTracker")
            .field("selected_month", &self.view.month)
            .field("loaded", &self.view.loaded)
            .field("expenses", &self.view.snapshot.expenses.len())
            .field("incomes", &self.view.snapshot.additional_incomes.len())
            .field("cached_months", &self.cache.len())
            .field("realtime", &self.feed.is_some())
            .finish()
    }
}

impl BudgetTracker {
    /// Connect to the HTTP backend described by `config`, viewing `month`.
    pub fn connect(config: ClientConfig, month: MonthKey) -> Result<Self, CoreError> {
        let backend = HttpLedgerBackend::new(&config)?;
        Ok(Self::with_backend(config, Box::new(backend), month))
    }

    /// Build on any backend implementation.
    pub fn with_backend(
        config: ClientConfig,
        backend: Box<dyn LedgerBackend>,
        month: MonthKey,
    ) -> Self {
        Self {
            config,
            cache: MonthCache::new(),
            budget_service: BudgetService::new(backend),
            ledger_service: LedgerService::new(),
            carry_over_service: CarryOverService::new(),
            pocket_service: PocketService::new(),
            mutation_router: MutationRouter::new(),
            realtime_service: RealtimeService::new(),
            feed: None,
            view: MonthView::empty(month),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// The month currently on screen.
    #[must_use]
    pub fn selected_month(&self) -> MonthKey {
        self.view.month
    }

    /// Switch the view to another month. Local lists are reset (call
    /// [`BudgetTracker::load_month`] to populate them) and the realtime
    /// subscription is moved to the new month.
    pub fn select_month(&mut self, month: MonthKey) {
        info!(from = %self.view.month, to = %month, "month selected");
        self.view = MonthView::empty(month);
        if let Some(feed) = self.feed.as_mut() {
            feed.subscribe(RealtimeFilter::for_month(month));
        }
    }

    /// Load everything the selected month needs: budget data, pockets and the
    /// previous month's carry-over. Cached data is served without a request.
    pub async fn load_month(&mut self) -> Result<BudgetSummary, CoreError> {
        let month = self.view.month;
        self.fetch_budget_data(month).await?;
        self.fetch_pockets(month).await?;
        Ok(self.summary())
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Budget, expenses and incomes for `month`, cache first.
    ///
    /// For the selected month the view and its carry-over are refreshed too.
    /// A response for any other month (e.g. one arriving after the user moved
    /// on) only fills that month's cache slot.
    pub async fn fetch_budget_data(&mut self, month: MonthKey) -> Result<MonthSnapshot, CoreError> {
        let snapshot = self.budget_service.get_month(&mut self.cache, month).await?;

        if month == self.view.month {
            let previous = self
                .budget_service
                .previous_balances(&mut self.cache, &self.ledger_service, month)
                .await;
            self.view.carry_over = self.carry_over_service.carry_over(previous.as_ref());
            self.view.snapshot = snapshot.clone();
            self.view.loaded = true;
        }
        Ok(snapshot)
    }

    /// Pockets and balances for `month`, cache first. Balances are recomputed
    /// from raw entries whenever the backend provides them.
    pub async fn fetch_pockets(&mut self, month: MonthKey) -> Result<PocketsSnapshot, CoreError> {
        let snapshot = self.budget_service.get_pockets(&mut self.cache, month).await?;

        if month == self.view.month {
            self.view.balances = self.ledger_service.resolve_balances(&snapshot);
            self.view.pockets = Some(snapshot.clone());
        }
        Ok(snapshot)
    }

    // ── Cache ───────────────────────────────────────────────────────

    /// Drop `month` and the month after it from the cache.
    pub fn invalidate_cache(&mut self, month: MonthKey) -> usize {
        self.budget_service.invalidate(&mut self.cache, month)
    }

    /// Replace one field of a month's cached snapshot. When `month` is on
    /// screen the view picks up the new value as well.
    pub fn update_cache_partial(&mut self, month: MonthKey, update: CacheUpdate) {
        if month == self.view.month {
            match &update {
                CacheUpdate::Budget(budget) => self.view.snapshot.budget = budget.clone(),
                CacheUpdate::Expenses(expenses) => self.view.snapshot.expenses = expenses.clone(),
                CacheUpdate::AdditionalIncomes(incomes) => {
                    self.view.snapshot.additional_incomes = incomes.clone();
                }
            }
        }
        self.budget_service
            .update_partial(&mut self.cache, month, update);
    }

    /// Read-only access to the session cache.
    #[must_use]
    pub fn cache(&self) -> &MonthCache {
        &self.cache
    }

    /// Lifecycle state of a month's cached snapshot.
    #[must_use]
    pub fn month_state(&self, month: MonthKey) -> MonthState {
        self.cache.state(month)
    }

    /// Whether the selected month's data has been loaded at least once since
    /// it was selected.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.view.loaded
    }

    // ── Derived values ──────────────────────────────────────────────

    /// All month totals, recomputed from the current view.
    #[must_use]
    pub fn summary(&self) -> BudgetSummary {
        self.carry_over_service
            .summarize(&self.view.snapshot, self.view.carry_over)
    }

    #[must_use]
    pub fn total_income(&self) -> Amount {
        self.summary().total_income
    }

    #[must_use]
    pub fn total_expenses(&self) -> Amount {
        self.summary().total_expenses
    }

    #[must_use]
    pub fn remaining_budget(&self) -> Amount {
        self.summary().remaining_budget
    }

    #[must_use]
    pub fn carry_over_assets(&self) -> Amount {
        self.view.carry_over.assets
    }

    #[must_use]
    pub fn carry_over_liabilities(&self) -> Amount {
        self.view.carry_over.liabilities
    }

    // ── View accessors ──────────────────────────────────────────────

    #[must_use]
    pub fn budget(&self) -> Option<&Budget> {
        self.view.snapshot.budget.as_ref()
    }

    #[must_use]
    pub fn expenses(&self) -> &[Expense] {
        &self.view.snapshot.expenses
    }

    #[must_use]
    pub fn additional_incomes(&self) -> &[AdditionalIncome] {
        &self.view.snapshot.additional_incomes
    }

    #[must_use]
    pub fn previous_month_remaining(&self) -> Option<Amount> {
        self.view.snapshot.previous_month_remaining
    }

    /// Active pockets of the selected month, in display order.
    #[must_use]
    pub fn pockets(&self) -> Vec<&Pocket> {
        self.view
            .pockets
            .as_ref()
            .map(|s| self.pocket_service.active_pockets(s))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn pocket_balances(&self) -> &HashMap<String, PocketBalance> {
        &self.view.balances
    }

    /// Available balance of one pocket in the selected month (zero if unknown).
    #[must_use]
    pub fn pocket_balance(&self, pocket_id: &str) -> Amount {
        self.ledger_service
            .available_balance(&self.view.balances, pocket_id)
    }

    /// Format an amount in the configured currency.
    #[must_use]
    pub fn format_amount(&self, amount: Amount) -> String {
        money::format_amount(amount, &self.config.currency)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Expenses ────────────────────────────────────────────────────

    /// Create an expense. It is routed by the date the backend confirms, so a
    /// backdated expense lands in its own month, not the one on screen.
    pub async fn create_expense(
        &mut self,
        draft: NewExpense,
    ) -> Result<MutationOutcome<Expense>, CoreError> {
        draft.validate()?;
        let selected = self.view.month;
        let created = match self.budget_service.backend().create_expense(selected, &draft).await {
            Ok(expense) => expense,
            Err(e) => {
                warn!(month = %selected, error = %e, "expense create failed, nothing changed");
                return Err(e);
            }
        };

        let date = self.confirmed_date(&created.date)?;
        let decision = self.mutation_router.route_create(selected, date);
        self.mutation_router.apply(
            &decision,
            &mut self.cache,
            &mut self.view.snapshot.expenses,
            &created.id,
            Some(created.clone()),
        );
        Ok(MutationOutcome { entry: created, decision })
    }

    /// Update an expense. If its new date moves it to another month, it
    /// leaves the current list and the view follows it there.
    pub async fn update_expense(
        &mut self,
        id: &str,
        draft: NewExpense,
    ) -> Result<MutationOutcome<Expense>, CoreError> {
        draft.validate()?;
        let selected = self.view.month;
        let updated = match self
            .budget_service
            .backend()
            .update_expense(selected, id, &draft)
            .await
        {
            Ok(expense) => expense,
            Err(e) => {
                warn!(month = %selected, id, error = %e, "expense update failed, nothing changed");
                return Err(e);
            }
        };

        let date = self.confirmed_date(&updated.date)?;
        let decision = self.mutation_router.route_update(selected, date);
        self.mutation_router.apply(
            &decision,
            &mut self.cache,
            &mut self.view.snapshot.expenses,
            id,
            Some(updated.clone()),
        );
        self.follow(&decision);
        Ok(MutationOutcome { entry: updated, decision })
    }

    /// Delete an expense of the selected month.
    pub async fn delete_expense(&mut self, id: &str) -> Result<RoutingDecision, CoreError> {
        let selected = self.view.month;
        let stored_date = {
            let stored = self
                .view
                .snapshot
                .expenses
                .iter()
                .find(|e| e.id == id)
                .ok_or_else(|| CoreError::NotFound(format!("expense {id}")))?;
            self.entry_date(&stored.date)?
        };

        if let Err(e) = self.budget_service.backend().delete_expense(selected, id).await {
            warn!(month = %selected, id, error = %e, "expense delete failed, nothing changed");
            return Err(e);
        }

        let decision = self.mutation_router.route_delete(selected, stored_date);
        self.mutation_router.apply::<Expense>(
            &decision,
            &mut self.cache,
            &mut self.view.snapshot.expenses,
            id,
            None,
        );
        Ok(decision)
    }

    // ── Additional income ───────────────────────────────────────────

    /// Create an additional income, routed by its confirmed date.
    pub async fn create_income(
        &mut self,
        draft: NewIncome,
    ) -> Result<MutationOutcome<AdditionalIncome>, CoreError> {
        draft.validate()?;
        let selected = self.view.month;
        let created = match self.budget_service.backend().create_income(selected, &draft).await {
            Ok(income) => income,
            Err(e) => {
                warn!(month = %selected, error = %e, "income create failed, nothing changed");
                return Err(e);
            }
        };

        let date = self.confirmed_date(&created.date)?;
        let decision = self.mutation_router.route_create(selected, date);
        self.mutation_router.apply(
            &decision,
            &mut self.cache,
            &mut self.view.snapshot.additional_incomes,
            &created.id,
            Some(created.clone()),
        );
        Ok(MutationOutcome { entry: created, decision })
    }

    /// Update an additional income; follows it if it moved months.
    pub async fn update_income(
        &mut self,
        id: &str,
        draft: NewIncome,
    ) -> Result<MutationOutcome<AdditionalIncome>, CoreError> {
        draft.validate()?;
        let selected = self.view.month;
        let updated = match self
            .budget_service
            .backend()
            .update_income(selected, id, &draft)
            .await
        {
            Ok(income) => income,
            Err(e) => {
                warn!(month = %selected, id, error = %e, "income update failed, nothing changed");
                return Err(e);
            }
        };

        let date = self.confirmed_date(&updated.date)?;
        let decision = self.mutation_router.route_update(selected, date);
        self.mutation_router.apply(
            &decision,
            &mut self.cache,
            &mut self.view.snapshot.additional_incomes,
            id,
            Some(updated.clone()),
        );
        self.follow(&decision);
        Ok(MutationOutcome { entry: updated, decision })
    }

    /// Delete an additional income of the selected month.
    pub async fn delete_income(&mut self, id: &str) -> Result<RoutingDecision, CoreError> {
        let selected = self.view.month;
        let stored_date = {
            let stored = self
                .view
                .snapshot
                .additional_incomes
                .iter()
                .find(|i| i.id == id)
                .ok_or_else(|| CoreError::NotFound(format!("income {id}")))?;
            self.entry_date(&stored.date)?
        };

        if let Err(e) = self.budget_service.backend().delete_income(selected, id).await {
            warn!(month = %selected, id, error = %e, "income delete failed, nothing changed");
            return Err(e);
        }

        let decision = self.mutation_router.route_delete(selected, stored_date);
        self.mutation_router.apply::<AdditionalIncome>(
            &decision,
            &mut self.cache,
            &mut self.view.snapshot.additional_incomes,
            id,
            None,
        );
        Ok(decision)
    }

    // ── Pockets & transfers ─────────────────────────────────────────

    /// Move funds between two pockets. The transfer's own month (and the
    /// selected one) are invalidated; if it lands in the selected month the
    /// pockets are refetched right away.
    pub async fn create_transfer(&mut self, draft: NewTransfer) -> Result<Transfer, CoreError> {
        match &self.view.pockets {
            Some(pockets) => self.pocket_service.validate_transfer(pockets, &draft)?,
            None => draft.validate()?,
        }

        let selected = self.view.month;
        let transfer = match self.budget_service.backend().create_transfer(selected, &draft).await {
            Ok(transfer) => transfer,
            Err(e) => {
                warn!(month = %selected, error = %e, "transfer failed, nothing changed");
                return Err(e);
            }
        };

        let month = MonthKey::from_date(self.confirmed_date(&transfer.date)?);
        self.cache.invalidate(month);
        if month != selected {
            self.cache.invalidate(selected);
        } else if let Err(e) = self.fetch_pockets(selected).await {
            warn!(month = %selected, error = %e, "pockets refetch after transfer failed");
        }
        Ok(transfer)
    }

    /// Archive (soft-delete) a custom pocket. Rejected locally, without an
    /// archive request, unless the pocket's balance is exactly zero.
    ///
    /// Any write or pushed change drops the month's pockets slot, so when the
    /// slot is gone the balances are refetched before they are checked.
    pub async fn archive_pocket(&mut self, pocket_id: &str) -> Result<(), CoreError> {
        let selected = self.view.month;
        if self.view.pockets.is_none() || self.cache.get_pockets(selected).is_none() {
            debug!(month = %selected, pocket_id, "pockets slot missing, refetching before archive");
            self.fetch_pockets(selected).await?;
        }
        let pockets = self.view.pockets.as_ref().ok_or_else(|| {
            CoreError::Validation(format!("Pockets for {selected} are not loaded"))
        })?;
        self.pocket_service
            .validate_archive(pockets, &self.view.balances, pocket_id)?;

        if let Err(e) = self.budget_service.backend().archive_pocket(pocket_id).await {
            warn!(pocket_id, error = %e, "pocket archival failed, nothing changed");
            return Err(e);
        }

        if let Some(pockets) = self.view.pockets.as_mut() {
            if let Some(pocket) = pockets.pockets.iter_mut().find(|p| p.id == pocket_id) {
                pocket.archived = true;
            }
        }
        self.cache.invalidate(selected);
        Ok(())
    }

    // ── Realtime ────────────────────────────────────────────────────

    /// Attach a change feed; it is subscribed to the selected month and
    /// re-subscribed on every month switch.
    pub fn attach_feed(&mut self, mut feed: Box<dyn ChangeFeed>) {
        feed.subscribe(RealtimeFilter::for_month(self.view.month));
        self.feed = Some(feed);
    }

    /// Reconcile one pushed change: invalidate the selected month (and its
    /// successor) and refetch what the change touched. Returns `None` when the
    /// change concerns another month.
    pub async fn handle_change_event(
        &mut self,
        event: &ChangeEvent,
    ) -> Result<Option<RefetchPlan>, CoreError> {
        let selected = self.view.month;
        let Some(plan) = self
            .realtime_service
            .reconcile(&mut self.cache, selected, event)
        else {
            return Ok(None);
        };

        if plan.budget {
            self.fetch_budget_data(selected).await?;
        }
        if plan.pockets {
            self.fetch_pockets(selected).await?;
        }
        Ok(Some(plan))
    }

    /// Wait for the next change on the attached feed and reconcile it.
    pub async fn poll_realtime(&mut self) -> Result<Option<RefetchPlan>, CoreError> {
        let feed = self.feed.as_mut().ok_or(CoreError::FeedClosed)?;
        let event = feed.next_event().await.ok_or(CoreError::FeedClosed)?;
        self.handle_change_event(&event).await
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Drop all cached data and the realtime subscription.
    pub fn end_session(&mut self) {
        info!(cached_months = self.cache.len(), "session ended, cache cleared");
        self.cache.clear();
        self.feed = None;
        self.view = MonthView::empty(self.view.month);
    }

    // ── Internal ────────────────────────────────────────────────────

    fn entry_date(&self, raw: &str) -> Result<NaiveDate, CoreError> {
        money::parse_entry_date(raw, self.config.utc_offset_minutes)
    }

    /// Date of an entry the backend has already accepted. If it cannot be
    /// read, the selected month is invalidated so the next read refetches.
    fn confirmed_date(&mut self, raw: &str) -> Result<NaiveDate, CoreError> {
        match self.entry_date(raw) {
            Ok(date) => Ok(date),
            Err(e) => {
                warn!(raw, error = %e, "confirmed entry has an unreadable date");
                self.cache.invalidate(self.view.month);
                Err(e)
            }
        }
    }

    fn follow(&mut self, decision: &RoutingDecision) {
        if let Some(target) = decision.navigate_to {
            if let Some(notice) = decision.notice() {
                info!(%notice, "following moved entry");
            }
            self.select_month(target);
        }
    }
}
