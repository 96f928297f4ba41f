//! Month-by-month schedule builder for the standard and strategy repayment plans

use crate::loan::{ExtraPaymentPolicy, LoanParameters};
use super::rows::{Schedule, ScheduleKind, ScheduleRow};
use super::state::AmortizationState;

/// Maximum gap tolerated between principal repaid and principal owed
pub const CONSERVATION_TOLERANCE: f64 = 0.01;

/// Builds amortization schedules for one loan
pub struct ScheduleBuilder<'a> {
    loan: &'a LoanParameters,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(loan: &'a LoanParameters) -> Self {
        Self { loan }
    }

    /// Fixed-installment schedule on the full principal, ignoring any lump sum
    pub fn build_standard(&self) -> Schedule {
        let mut state = AmortizationState::open(self.loan, self.loan.principal());
        let mut schedule = Schedule::new(ScheduleKind::Standard);

        let mut opening = ScheduleRow::new(0, self.loan.payment_date(0));
        opening.outstanding_balance = state.balance;
        opening.recalculated_installment = state.installment;
        schedule.add_row(opening);

        for _month in 1..=self.loan.term_months() {
            state.advance_month();
            let row = self.calculate_month(&mut state, None);
            schedule.add_row(row);
        }

        self.check_conservation(&schedule, self.loan.principal());
        schedule
    }

    /// Schedule with the initial lump sum and the policy's semiannual extra payments
    ///
    /// Every extra payment re-amortizes the remaining balance over the remaining term, so
    /// the installment drops while the end date stays put.
    pub fn build_strategy(&self, policy: &ExtraPaymentPolicy) -> Schedule {
        let financed = self.loan.financed_after_lump_sum();
        let mut state = AmortizationState::open(self.loan, financed);
        let mut schedule = Schedule::new(ScheduleKind::Strategy);

        let mut opening = ScheduleRow::new(0, self.loan.payment_date(0));
        opening.principal_portion = self.loan.initial_lump_sum();
        opening.outstanding_balance = state.balance;
        opening.recalculated_installment = state.installment;
        schedule.add_row(opening);

        for _month in 1..=self.loan.term_months() {
            state.advance_month();
            let row = self.calculate_month(&mut state, Some(policy));
            schedule.add_row(row);
        }

        self.check_conservation(&schedule, financed);
        schedule
    }

    /// Calculate one month and update the running state
    fn calculate_month(&self, state: &mut AmortizationState, policy: Option<&ExtraPaymentPolicy>) -> ScheduleRow {
        let mut row = ScheduleRow::new(state.month, self.loan.payment_date(state.month));

        let interest = state.interest_due();
        let mut principal = state.installment - interest;
        let mut paid = state.installment;

        // Extra payment may not overdraw what is left after the scheduled principal
        let extra = match policy {
            Some(policy) if policy.triggers_at(state.month) => policy
                .candidate_amount(state.installment)
                .min(state.balance - principal)
                .max(0.0),
            _ => 0.0,
        };

        state.balance -= principal + extra;

        if state.is_final_month() {
            // Last payment absorbs the rounding residue so the loan closes at exactly zero
            principal = (state.balance + principal).max(0.0);
            paid = principal + interest;
            state.balance = 0.0;
        } else {
            state.balance = state.balance.max(0.0);
            if extra > 0.0 {
                // Extra-payment rows carry the recalculated installment
                state.reamortize();
                paid = state.installment;
            }
        }

        row.installment = paid;
        row.interest_portion = interest;
        row.principal_portion = principal;
        row.extra_principal = extra;
        row.outstanding_balance = state.balance;
        row.recalculated_installment = state.installment;
        row
    }

    fn check_conservation(&self, schedule: &Schedule, owed: f64) {
        let summary = schedule.summary();
        let residual = summary.repaid_over_term() - owed;

        log::debug!(
            "{:?} schedule: {} months, interest {:.2}, principal {:.2}, extra {:.2}, residual {:.6}",
            schedule.kind,
            summary.total_months,
            summary.total_interest,
            summary.total_principal,
            summary.total_extra,
            residual,
        );

        if residual.abs() >= CONSERVATION_TOLERANCE {
            log::warn!(
                "{:?} schedule repays {:.2} against {:.2} owed (difference {:.2})",
                schedule.kind,
                summary.repaid_over_term(),
                owed,
                residual,
            );
        }
    }
}
