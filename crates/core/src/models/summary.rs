use serde::{Deserialize, Serialize};

use super::money::Amount;

/// Positive and negative ending balances of the previous month, split apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOver {
    /// Sum of non-negative pocket balances
    pub assets: Amount,

    /// Sum of overspent pocket balances, as a positive debt figure
    pub liabilities: Amount,
}

impl CarryOver {
    /// No previous data: the normal state for a first month of use.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// The signed total the split was taken from.
    #[must_use]
    pub fn net(&self) -> Amount {
        self.assets - self.liabilities
    }
}

/// Month totals shown to the user. Recomputed from the month's snapshot and
/// carry-over every time; never stored on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub net_additional_income: Amount,
    pub carry_over_assets: Amount,
    pub carry_over_liabilities: Amount,
    /// Net of `from_income` reversals
    pub current_month_expenses: Amount,
    pub total_income: Amount,
    pub total_expenses: Amount,
    pub remaining_budget: Amount,
}
