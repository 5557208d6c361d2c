use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::money::Amount;

/// Extra income received during a month (salary bonus, freelance job...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalIncome {
    pub id: String,

    pub name: String,

    /// Amount after conversion into the account currency
    #[serde(rename = "amountIDR")]
    pub amount_idr: Amount,

    /// Tax or fee withheld from this income
    #[serde(default)]
    pub deduction: Amount,

    pub date: String,

    pub pocket_id: String,
}

impl AdditionalIncome {
    /// What this income actually adds to the month.
    #[must_use]
    pub fn net_amount(&self) -> Amount {
        self.amount_idr - self.deduction
    }
}

/// Payload for creating or updating an additional income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncome {
    pub name: String,
    #[serde(rename = "amountIDR")]
    pub amount_idr: Amount,
    #[serde(default)]
    pub deduction: Amount,
    pub date: NaiveDate,
    pub pocket_id: String,
}

impl NewIncome {
    pub fn new(
        name: impl Into<String>,
        amount_idr: Amount,
        date: NaiveDate,
        pocket_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount_idr,
            deduction: 0,
            date,
            pocket_id: pocket_id.into(),
        }
    }

    pub fn with_deduction(mut self, deduction: Amount) -> Self {
        self.deduction = deduction;
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Income name must not be empty".into()));
        }
        if self.amount_idr <= 0 {
            return Err(CoreError::Validation(format!(
                "Income amount must be positive, got {}",
                self.amount_idr
            )));
        }
        if self.deduction < 0 || self.deduction > self.amount_idr {
            return Err(CoreError::Validation(format!(
                "Deduction {} must be between 0 and the income amount {}",
                self.deduction, self.amount_idr
            )));
        }
        if self.pocket_id.trim().is_empty() {
            return Err(CoreError::Validation("Income must belong to a pocket".into()));
        }
        Ok(())
    }
}
