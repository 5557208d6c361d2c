use serde::{Deserialize, Serialize};

use super::expense::Expense;
use super::income::AdditionalIncome;
use super::money::Amount;
use super::pocket::{LedgerEntry, Pocket, PocketBalance};

/// The per-month budget record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub initial_budget: Amount,

    /// Applied once against the month's total additional income
    #[serde(default)]
    pub income_deduction: Amount,

    #[serde(default)]
    pub notes: String,
}

/// Everything `GET /budget/{y}/{m}` returns, and the value stored in one
/// month cache slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSnapshot {
    #[serde(default)]
    pub budget: Option<Budget>,

    #[serde(default)]
    pub expenses: Vec<Expense>,

    #[serde(default)]
    pub additional_incomes: Vec<AdditionalIncome>,

    #[serde(default)]
    pub previous_month_remaining: Option<Amount>,
}

/// Everything `GET /pockets/{y}/{m}` returns.
///
/// `balances` are pre-computed by the backend. When the backend also ships
/// the raw `entries`, the client recomputes balances from them instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PocketsSnapshot {
    #[serde(default)]
    pub pockets: Vec<Pocket>,

    #[serde(default)]
    pub balances: Vec<PocketBalance>,

    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
}

impl PocketsSnapshot {
    /// Look up a pocket by id.
    #[must_use]
    pub fn pocket(&self, pocket_id: &str) -> Option<&Pocket> {
        self.pockets.iter().find(|p| p.id == pocket_id)
    }

    /// Look up the reported balance for a pocket.
    #[must_use]
    pub fn balance(&self, pocket_id: &str) -> Option<&PocketBalance> {
        self.balances.iter().find(|b| b.pocket_id == pocket_id)
    }
}
