use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::budget::{MonthSnapshot, PocketsSnapshot};
use crate::models::expense::{Expense, NewExpense};
use crate::models::income::{AdditionalIncome, NewIncome};
use crate::models::month::MonthKey;
use crate::models::realtime::{ChangeEvent, RealtimeFilter};
use crate::models::transfer::{NewTransfer, Transfer};

/// The authoritative ledger store, as seen by the client.
///
/// The HTTP backend implements this against the REST endpoints; tests plug
/// in their own. Every write returns the canonical entry with its
/// authoritative `date`, which is what month routing is based on.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait LedgerBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// `GET /budget/{y}/{m}`
    async fn fetch_budget(&self, month: MonthKey) -> Result<MonthSnapshot, CoreError>;

    /// `GET /pockets/{y}/{m}`
    async fn fetch_pockets(&self, month: MonthKey) -> Result<PocketsSnapshot, CoreError>;

    /// `POST /expenses/{y}/{m}`, where `month` is the month being viewed.
    async fn create_expense(
        &self,
        month: MonthKey,
        expense: &NewExpense,
    ) -> Result<Expense, CoreError>;

    /// `PUT /expenses/{y}/{m}/{id}`
    async fn update_expense(
        &self,
        month: MonthKey,
        id: &str,
        expense: &NewExpense,
    ) -> Result<Expense, CoreError>;

    /// `DELETE /expenses/{y}/{m}/{id}`
    async fn delete_expense(&self, month: MonthKey, id: &str) -> Result<(), CoreError>;

    /// `POST /additional-income/{y}/{m}`
    async fn create_income(
        &self,
        month: MonthKey,
        income: &NewIncome,
    ) -> Result<AdditionalIncome, CoreError>;

    /// `PUT /additional-income/{y}/{m}/{id}`
    async fn update_income(
        &self,
        month: MonthKey,
        id: &str,
        income: &NewIncome,
    ) -> Result<AdditionalIncome, CoreError>;

    /// `DELETE /additional-income/{y}/{m}/{id}`
    async fn delete_income(&self, month: MonthKey, id: &str) -> Result<(), CoreError>;

    /// `POST /transfers/{y}/{m}`
    async fn create_transfer(
        &self,
        month: MonthKey,
        transfer: &NewTransfer,
    ) -> Result<Transfer, CoreError>;

    /// `POST /pockets/{id}/archive`
    async fn archive_pocket(&self, pocket_id: &str) -> Result<(), CoreError>;
}

/// Push channel of backend change notifications.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ChangeFeed: Send {
    /// Replace the active filter. Only events matching it are delivered.
    fn subscribe(&mut self, filter: RealtimeFilter);

    /// Wait for the next matching event. `None` once the channel is closed.
    async fn next_event(&mut self) -> Option<ChangeEvent>;
}
