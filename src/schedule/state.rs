//! Running state while a schedule is built month by month

use crate::loan::LoanParameters;
use super::rate::monthly_installment;

/// State of the loan at a point in time during the build
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Current month (1-indexed once the build starts)
    pub month: u32,

    /// Total months in the term
    pub term_months: u32,

    /// Monthly rate as a fraction
    pub monthly_rate: f64,

    /// Balance at the beginning of the current month
    pub balance: f64,

    /// Installment currently in force
    pub installment: f64,
}

impl AmortizationState {
    /// Start from `opening_balance` with the installment for the full term
    pub fn open(loan: &LoanParameters, opening_balance: f64) -> Self {
        let monthly_rate = loan.monthly_rate();
        Self {
            month: 0,
            term_months: loan.term_months(),
            monthly_rate,
            balance: opening_balance,
            installment: monthly_installment(opening_balance, monthly_rate, loan.term_months()),
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    pub fn is_final_month(&self) -> bool {
        self.month == self.term_months
    }

    pub fn remaining_months(&self) -> u32 {
        self.term_months.saturating_sub(self.month)
    }

    /// Interest accrued on the opening balance this month
    pub fn interest_due(&self) -> f64 {
        self.balance * self.monthly_rate
    }

    /// Keep the term, lower the installment to fit the current balance
    pub fn reamortize(&mut self) {
        let remaining = self.remaining_months();
        if remaining > 0 {
            self.installment = monthly_installment(self.balance, self.monthly_rate, remaining);
        }
    }
}
