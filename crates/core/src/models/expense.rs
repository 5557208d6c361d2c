use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::money::Amount;

/// A sub-split of an expense (e.g. the lines of a grocery receipt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub name: String,
    pub amount: Amount,
}

impl ExpenseItem {
    pub fn new(name: impl Into<String>, amount: Amount) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// An expense as confirmed by the backend.
///
/// **Month ownership** comes from `date` alone, never from whichever month
/// was on screen when the expense was entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,

    pub name: String,

    /// Positive, in the smallest currency unit
    pub amount: Amount,

    /// Authoritative ISO date (or timestamp) as stored by the backend
    pub date: String,

    #[serde(default)]
    pub items: Vec<ExpenseItem>,

    pub pocket_id: String,

    #[serde(default)]
    pub category: Option<String>,

    /// Reversal flag: the amount is moved back to income and reduces the
    /// month's expense total instead of adding to it.
    #[serde(default)]
    pub from_income: bool,
}

impl Expense {
    /// Contribution to the month's expense total.
    #[must_use]
    pub fn net_amount(&self) -> Amount {
        if self.from_income {
            -self.amount
        } else {
            self.amount
        }
    }
}

/// Payload for creating or updating an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub name: String,
    pub amount: Amount,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ExpenseItem>,
    pub pocket_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub from_income: bool,
}

impl NewExpense {
    pub fn new(
        name: impl Into<String>,
        amount: Amount,
        date: NaiveDate,
        pocket_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            date,
            items: Vec::new(),
            pocket_id: pocket_id.into(),
            category: None,
            from_income: false,
        }
    }

    pub fn with_items(mut self, items: Vec<ExpenseItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn from_income(mut self) -> Self {
        self.from_income = true;
        self
    }

    /// Checked locally before any request goes out.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Expense name must not be empty".into()));
        }
        if self.amount <= 0 {
            return Err(CoreError::Validation(format!(
                "Expense amount must be positive, got {}",
                self.amount
            )));
        }
        if self.pocket_id.trim().is_empty() {
            return Err(CoreError::Validation("Expense must belong to a pocket".into()));
        }
        if !self.items.is_empty() {
            if let Some(item) = self.items.iter().find(|i| i.amount <= 0) {
                return Err(CoreError::Validation(format!(
                    "Expense item '{}' must have a positive amount",
                    item.name
                )));
            }
            let items_total: Amount = self.items.iter().map(|i| i.amount).sum();
            if items_total != self.amount {
                return Err(CoreError::Validation(format!(
                    "Expense items sum to {items_total} but the expense amount is {}",
                    self.amount
                )));
            }
        }
        Ok(())
    }
}
