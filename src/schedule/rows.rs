//! Schedule output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Month index (0 = signing snapshot)
    pub month: u32,
    pub date: NaiveDate,

    /// Installment for this month; on an extra-payment month, the recalculated one
    pub installment: f64,
    pub interest_portion: f64,
    pub principal_portion: f64,

    /// Principal-only payment on top of the installment
    pub extra_principal: f64,

    /// Balance after this month's payments
    pub outstanding_balance: f64,

    /// Installment in force from the next month on
    pub recalculated_installment: f64,
}

impl ScheduleRow {
    pub fn new(month: u32, date: NaiveDate) -> Self {
        Self {
            month,
            date,
            installment: 0.0,
            interest_portion: 0.0,
            principal_portion: 0.0,
            extra_principal: 0.0,
            outstanding_balance: 0.0,
            recalculated_installment: 0.0,
        }
    }

    /// Principal repaid this month, scheduled and extra
    pub fn total_principal(&self) -> f64 {
        self.principal_portion + self.extra_principal
    }
}

/// Which policy produced a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleKind {
    /// Fixed installment, no extra payments
    Standard,
    /// Lump sum plus semiannual extra payments with re-amortization
    Strategy,
}

/// Complete schedule: row 0 snapshot plus one row per month of the term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub kind: ScheduleKind,
    pub rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn new(kind: ScheduleKind) -> Self {
        Self { kind, rows: Vec::new() }
    }

    pub fn add_row(&mut self, row: ScheduleRow) {
        self.rows.push(row);
    }

    /// A schedule with no rows has never been built
    pub fn is_built(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Number of payment months (rows excluding the snapshot)
    pub fn term_months(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Rows 1..N
    pub fn payment_rows(&self) -> &[ScheduleRow] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn row(&self, month: usize) -> Option<&ScheduleRow> {
        self.rows.get(month)
    }

    pub fn last_row(&self) -> Option<&ScheduleRow> {
        self.rows.last()
    }

    /// Rows carrying an extra payment
    pub fn extra_payments(&self) -> impl Iterator<Item = &ScheduleRow> {
        self.payment_rows().iter().filter(|r| r.extra_principal > 0.0)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let payments = self.payment_rows();
        let total_interest: f64 = self.rows.iter().map(|r| r.interest_portion).sum();
        let total_principal: f64 = payments.iter().map(|r| r.principal_portion).sum();
        let total_extra: f64 = payments.iter().map(|r| r.extra_principal).sum();
        let total_installments: f64 = payments.iter().map(|r| r.installment).sum();

        ScheduleSummary {
            total_months: payments.len() as u32,
            total_interest,
            total_principal,
            total_extra,
            total_installments,
            upfront_principal: self.rows.first().map(|r| r.principal_portion).unwrap_or(0.0),
            first_installment: payments.first().map(|r| r.installment).unwrap_or(0.0),
            final_installment: payments.last().map(|r| r.installment).unwrap_or(0.0),
            final_balance: self.rows.last().map(|r| r.outstanding_balance).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_months: u32,
    pub total_interest: f64,
    pub total_principal: f64,
    pub total_extra: f64,
    pub total_installments: f64,
    /// Principal repaid at signing (row 0)
    pub upfront_principal: f64,
    pub first_installment: f64,
    pub final_installment: f64,
    pub final_balance: f64,
}

impl ScheduleSummary {
    /// Principal repaid over rows 1..N, scheduled plus extra
    pub fn repaid_over_term(&self) -> f64 {
        self.total_principal + self.total_extra
    }
}
