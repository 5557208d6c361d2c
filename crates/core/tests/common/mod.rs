// ═══════════════════════════════════════════════════════════════════
// Shared test helpers — in-memory ledger backend with call recording
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use pocket_ledger_core::backend::traits::LedgerBackend;
use pocket_ledger_core::config::ClientConfig;
use pocket_ledger_core::errors::CoreError;
use pocket_ledger_core::models::budget::{Budget, MonthSnapshot, PocketsSnapshot};
use pocket_ledger_core::models::expense::{Expense, NewExpense};
use pocket_ledger_core::models::income::{AdditionalIncome, NewIncome};
use pocket_ledger_core::models::money::{to_iso_date, Amount};
use pocket_ledger_core::models::month::MonthKey;
use pocket_ledger_core::models::pocket::PocketBalance;
use pocket_ledger_core::models::transfer::{NewTransfer, Transfer};
use pocket_ledger_core::BudgetTracker;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn mk(y: i32, m: u32) -> MonthKey {
    MonthKey::new(y, m).unwrap()
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn expense(id: &str, amount: Amount, date: &str) -> Expense {
    Expense {
        id: id.into(),
        name: format!("Expense {id}"),
        amount,
        date: date.into(),
        items: Vec::new(),
        pocket_id: "main".into(),
        category: None,
        from_income: false,
    }
}

pub fn income(id: &str, amount: Amount, deduction: Amount, date: &str) -> AdditionalIncome {
    AdditionalIncome {
        id: id.into(),
        name: format!("Income {id}"),
        amount_idr: amount,
        deduction,
        date: date.into(),
        pocket_id: "main".into(),
    }
}

pub fn budget(initial: Amount) -> Budget {
    Budget {
        initial_budget: initial,
        income_deduction: 0,
        notes: String::new(),
    }
}

pub fn balance(pocket_id: &str, available: Amount) -> PocketBalance {
    PocketBalance {
        available_balance: available,
        ..PocketBalance::empty(pocket_id)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mock backend
// ═══════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct MockState {
    pub budgets: HashMap<MonthKey, MonthSnapshot>,
    pub pockets: HashMap<MonthKey, PocketsSnapshot>,
    pub calls: Vec<String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    /// Date the backend assigns to the next write, overriding the draft's
    pub date_override: Option<String>,
    next_id: u32,
}

/// In-memory ledger store. Clones share state, so a test can keep a handle
/// after boxing one into a tracker.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn with_month(self, month: MonthKey, snapshot: MonthSnapshot) -> Self {
        self.state().budgets.insert(month, snapshot);
        self
    }

    pub fn with_pockets(self, month: MonthKey, snapshot: PocketsSnapshot) -> Self {
        self.state().pockets.insert(month, snapshot);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    pub fn tracker(&self, month: MonthKey) -> BudgetTracker {
        BudgetTracker::with_backend(ClientConfig::default(), Box::new(self.clone()), month)
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }

    fn check_write(&self) -> Result<(), CoreError> {
        if self.state().fail_writes {
            return Err(CoreError::Server {
                status: 500,
                message: "simulated write failure".into(),
            });
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state();
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }

    fn confirmed_date(&self, requested: NaiveDate) -> String {
        self.state()
            .date_override
            .take()
            .unwrap_or_else(|| to_iso_date(requested))
    }

    fn remove_expense(&self, id: &str) {
        for snapshot in self.state().budgets.values_mut() {
            snapshot.expenses.retain(|e| e.id != id);
        }
    }

    fn remove_income(&self, id: &str) {
        for snapshot in self.state().budgets.values_mut() {
            snapshot.additional_incomes.retain(|i| i.id != id);
        }
    }
}

/// Month a stored date belongs to, by its `YYYY-MM-DD` prefix. Unreadable
/// dates fall back to the month the request was made for.
fn month_of(date: &str, fallback: MonthKey) -> MonthKey {
    date.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(MonthKey::from_date)
        .unwrap_or(fallback)
}

#[async_trait]
impl LedgerBackend for MockBackend {
    fn name(&self) -> &str {
        "MockBackend"
    }

    async fn fetch_budget(&self, month: MonthKey) -> Result<MonthSnapshot, CoreError> {
        self.record(format!("GET budget {month}"));
        let state = self.state();
        if state.fail_reads {
            return Err(CoreError::Network("simulated network failure".into()));
        }
        Ok(state.budgets.get(&month).cloned().unwrap_or_default())
    }

    async fn fetch_pockets(&self, month: MonthKey) -> Result<PocketsSnapshot, CoreError> {
        self.record(format!("GET pockets {month}"));
        let state = self.state();
        if state.fail_reads {
            return Err(CoreError::Network("simulated network failure".into()));
        }
        state
            .pockets
            .get(&month)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("/pockets/{}/{}", month.year(), month.month())))
    }

    async fn create_expense(
        &self,
        month: MonthKey,
        draft: &NewExpense,
    ) -> Result<Expense, CoreError> {
        self.record(format!("POST expense {month}"));
        self.check_write()?;
        let created = Expense {
            id: self.next_id("exp"),
            name: draft.name.clone(),
            amount: draft.amount,
            date: self.confirmed_date(draft.date),
            items: draft.items.clone(),
            pocket_id: draft.pocket_id.clone(),
            category: draft.category.clone(),
            from_income: draft.from_income,
        };
        self.state()
            .budgets
            .entry(month_of(&created.date, month))
            .or_default()
            .expenses
            .push(created.clone());
        Ok(created)
    }

    async fn update_expense(
        &self,
        month: MonthKey,
        id: &str,
        draft: &NewExpense,
    ) -> Result<Expense, CoreError> {
        self.record(format!("PUT expense {month} {id}"));
        self.check_write()?;
        let updated = Expense {
            id: id.to_string(),
            name: draft.name.clone(),
            amount: draft.amount,
            date: self.confirmed_date(draft.date),
            items: draft.items.clone(),
            pocket_id: draft.pocket_id.clone(),
            category: draft.category.clone(),
            from_income: draft.from_income,
        };
        self.remove_expense(id);
        self.state()
            .budgets
            .entry(month_of(&updated.date, month))
            .or_default()
            .expenses
            .push(updated.clone());
        Ok(updated)
    }

    async fn delete_expense(&self, month: MonthKey, id: &str) -> Result<(), CoreError> {
        self.record(format!("DELETE expense {month} {id}"));
        self.check_write()?;
        self.remove_expense(id);
        Ok(())
    }

    async fn create_income(
        &self,
        month: MonthKey,
        draft: &NewIncome,
    ) -> Result<AdditionalIncome, CoreError> {
        self.record(format!("POST income {month}"));
        self.check_write()?;
        let created = AdditionalIncome {
            id: self.next_id("inc"),
            name: draft.name.clone(),
            amount_idr: draft.amount_idr,
            deduction: draft.deduction,
            date: self.confirmed_date(draft.date),
            pocket_id: draft.pocket_id.clone(),
        };
        self.state()
            .budgets
            .entry(month_of(&created.date, month))
            .or_default()
            .additional_incomes
            .push(created.clone());
        Ok(created)
    }

    async fn update_income(
        &self,
        month: MonthKey,
        id: &str,
        draft: &NewIncome,
    ) -> Result<AdditionalIncome, CoreError> {
        self.record(format!("PUT income {month} {id}"));
        self.check_write()?;
        let updated = AdditionalIncome {
            id: id.to_string(),
            name: draft.name.clone(),
            amount_idr: draft.amount_idr,
            deduction: draft.deduction,
            date: self.confirmed_date(draft.date),
            pocket_id: draft.pocket_id.clone(),
        };
        self.remove_income(id);
        self.state()
            .budgets
            .entry(month_of(&updated.date, month))
            .or_default()
            .additional_incomes
            .push(updated.clone());
        Ok(updated)
    }

    async fn delete_income(&self, month: MonthKey, id: &str) -> Result<(), CoreError> {
        self.record(format!("DELETE income {month} {id}"));
        self.check_write()?;
        self.remove_income(id);
        Ok(())
    }

    async fn create_transfer(
        &self,
        month: MonthKey,
        draft: &NewTransfer,
    ) -> Result<Transfer, CoreError> {
        self.record(format!("POST transfer {month}"));
        self.check_write()?;
        Ok(Transfer {
            id: self.next_id("trf"),
            from_pocket_id: draft.from_pocket_id.clone(),
            to_pocket_id: draft.to_pocket_id.clone(),
            amount: draft.amount,
            date: self.confirmed_date(draft.date),
            note: draft.note.clone(),
        })
    }

    async fn archive_pocket(&self, pocket_id: &str) -> Result<(), CoreError> {
        self.record(format!("ARCHIVE pocket {pocket_id}"));
        self.check_write()?;
        for snapshot in self.state().pockets.values_mut() {
            if let Some(p) = snapshot.pockets.iter_mut().find(|p| p.id == pocket_id) {
                p.archived = true;
            }
        }
        Ok(())
    }
}
