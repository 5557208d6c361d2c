use std::collections::HashMap;

use crate::models::budget::MonthSnapshot;
use crate::models::money::Amount;
use crate::models::pocket::PocketBalance;
use crate::models::summary::{BudgetSummary, CarryOver};

/// Rolls the previous month's ending balances into the current month and
/// derives the month totals.
///
/// Never fails: a month without prior data simply has a zero carry-over.
pub struct CarryOverService;

impl CarryOverService {
    pub fn new() -> Self {
        Self
    }

    /// Sum of non-negative previous balances.
    pub fn carry_over_assets(&self, prev: &HashMap<String, PocketBalance>) -> Amount {
        prev.values().map(|b| b.available_balance.max(0)).sum()
    }

    /// Sum of overspent previous balances, as a positive figure.
    pub fn carry_over_liabilities(&self, prev: &HashMap<String, PocketBalance>) -> Amount {
        prev.values().map(|b| (-b.available_balance).max(0)).sum()
    }

    /// Split the previous month's balances, or zero when there are none.
    pub fn carry_over(&self, prev: Option<&HashMap<String, PocketBalance>>) -> CarryOver {
        match prev {
            Some(balances) => CarryOver {
                assets: self.carry_over_assets(balances),
                liabilities: self.carry_over_liabilities(balances),
            },
            None => CarryOver::zero(),
        }
    }

    /// `Σ(amountIDR − deduction) − budget.incomeDeduction`
    pub fn net_additional_income(&self, snapshot: &MonthSnapshot) -> Amount {
        let gross: Amount = snapshot
            .additional_incomes
            .iter()
            .map(|i| i.net_amount())
            .sum();
        let global_deduction = snapshot
            .budget
            .as_ref()
            .map(|b| b.income_deduction)
            .unwrap_or(0);
        gross - global_deduction
    }

    /// This month's own expenses, net of reversals.
    pub fn current_month_expenses(&self, snapshot: &MonthSnapshot) -> Amount {
        snapshot.expenses.iter().map(|e| e.net_amount()).sum()
    }

    /// Derive the month totals from a snapshot and its carry-over.
    ///
    /// - `totalIncome = initialBudget + netAdditionalIncome + carryOverAssets`
    /// - `totalExpenses = currentMonthExpenses + carryOverLiabilities`
    /// - `remainingBudget = totalIncome − totalExpenses`
    pub fn summarize(&self, snapshot: &MonthSnapshot, carry_over: CarryOver) -> BudgetSummary {
        let initial_budget = snapshot
            .budget
            .as_ref()
            .map(|b| b.initial_budget)
            .unwrap_or(0);
        let net_additional_income = self.net_additional_income(snapshot);
        let current_month_expenses = self.current_month_expenses(snapshot);

        let total_income = initial_budget + net_additional_income + carry_over.assets;
        let total_expenses = current_month_expenses + carry_over.liabilities;

        BudgetSummary {
            net_additional_income,
            carry_over_assets: carry_over.assets,
            carry_over_liabilities: carry_over.liabilities,
            current_month_expenses,
            total_income,
            total_expenses,
            remaining_budget: total_income - total_expenses,
        }
    }
}

impl Default for CarryOverService {
    fn default() -> Self {
        Self::new()
    }
}
