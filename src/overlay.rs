//! Expense overlay: recurring costs and extra-payment provisions on top of a schedule
//!
//! Each expense grows once per calendar year. Extra payments are smoothed into a monthly
//! provision spread over the semester that leads up to each payment, so the household
//! knows how much to set aside every month.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulatorError};
use crate::loan::{ExpenseSet, ExtraPaymentPolicy, EXTRA_PAYMENT_INTERVAL_MONTHS};
use crate::schedule::{Schedule, ScheduleRow};

/// Rows averaged for the first-year figures (months 1 through 13 inclusive)
pub const FIRST_YEAR_ROWS: usize = 13;

/// A schedule row extended with expenses and provisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    #[serde(flatten)]
    pub schedule: ScheduleRow,

    /// One amount per expense, in [`ExpenseSet`] order
    pub expenses: Vec<f64>,

    /// Sum of the expense columns
    pub additional_expenses: f64,

    /// Installment plus expenses
    pub total_monthly_expense: f64,

    /// Share of an upcoming extra payment set aside this month
    pub amortization_provision: f64,

    /// Total monthly expense plus provision
    pub total_provision: f64,
}

/// Expense rows together with the expense column names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSchedule {
    pub names: Vec<String>,
    pub rows: Vec<ExpenseRow>,
}

impl ExpenseSchedule {
    /// Whether any row carries an extra-payment provision
    pub fn has_provisions(&self) -> bool {
        self.rows.iter().any(|r| r.amortization_provision > 0.0)
    }

    /// Mean of `value` over rows 1..=13 (fewer when the term is shorter)
    pub fn first_year_mean(&self, value: impl Fn(&ExpenseRow) -> f64) -> f64 {
        let end = self.rows.len().min(FIRST_YEAR_ROWS + 1);
        let window = self.rows.get(1..end).unwrap_or(&[]);
        if window.is_empty() {
            return 0.0;
        }
        window.iter().map(value).sum::<f64>() / window.len() as f64
    }

    /// Average monthly cash needed in the first year
    ///
    /// Uses the total provision when extra payments are being provisioned, otherwise the
    /// plain total monthly expense.
    pub fn average_first_year_provision(&self) -> f64 {
        if self.has_provisions() {
            self.first_year_mean(|r| r.total_provision)
        } else {
            self.first_year_mean(|r| r.total_monthly_expense)
        }
    }

    /// Column of one expense by name
    pub fn expense_column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(self.rows.iter().map(|r| r.expenses[idx]).collect())
    }
}

/// Projects recurring expenses and extra-payment provisions onto a schedule
pub struct ExpenseOverlay<'a> {
    expenses: &'a ExpenseSet,
    policy: &'a ExtraPaymentPolicy,
}

impl<'a> ExpenseOverlay<'a> {
    pub fn new(expenses: &'a ExpenseSet, policy: &'a ExtraPaymentPolicy) -> Self {
        Self { expenses, policy }
    }

    /// Build the expense schedule for an already built schedule
    pub fn apply(&self, schedule: &Schedule) -> Result<ExpenseSchedule> {
        if !schedule.is_built() {
            return Err(SimulatorError::prerequisite(
                "the expense overlay needs a built strategy schedule",
            ));
        }

        let base_year = schedule.row(1).unwrap_or(&schedule.rows[0]).date.year();

        let mut rows: Vec<ExpenseRow> = schedule
            .rows
            .iter()
            .map(|row| {
                let expenses: Vec<f64> = if row.month == 0 {
                    vec![0.0; self.expenses.len()]
                } else {
                    let years_elapsed = row.date.year() - base_year;
                    self.expenses.iter().map(|e| e.amount_after_years(years_elapsed)).collect()
                };
                let additional_expenses: f64 = expenses.iter().sum();
                let total_monthly_expense = row.installment + additional_expenses;

                ExpenseRow {
                    schedule: row.clone(),
                    expenses,
                    additional_expenses,
                    total_monthly_expense,
                    amortization_provision: 0.0,
                    total_provision: total_monthly_expense,
                }
            })
            .collect();

        self.spread_provisions(schedule, &mut rows);

        for row in rows.iter_mut() {
            row.total_provision = row.total_monthly_expense + row.amortization_provision;
        }

        Ok(ExpenseSchedule {
            names: self.expenses.names().map(str::to_string).collect(),
            rows,
        })
    }

    /// Spread each realized extra payment over the semester ending on its month
    ///
    /// The money for a payment at month t is saved during the six months before it, t-5..t.
    fn spread_provisions(&self, schedule: &Schedule, rows: &mut [ExpenseRow]) {
        let interval = EXTRA_PAYMENT_INTERVAL_MONTHS as usize;

        for (month, row) in schedule.rows.iter().enumerate() {
            if !self.policy.triggers_at(row.month) || row.extra_principal <= 0.0 {
                continue;
            }

            let window_start = (month + 1).saturating_sub(interval).max(1);
            let window_len = interval.min(rows.len() - window_start);
            if window_len == 0 {
                continue;
            }

            let share = row.extra_principal / window_len as f64;
            for target in &mut rows[window_start..window_start + window_len] {
                target.amortization_provision += share;
            }
        }
    }
}
