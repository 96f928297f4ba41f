//! Standard vs strategy comparison

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulatorError};
use crate::loan::{ExtraPaymentPolicy, LoanParameters, MONTHS_PER_YEAR};
use crate::schedule::Schedule;

/// A final strategy installment below this share of the standard one counts as an early finish
pub const EARLY_FINISH_THRESHOLD: f64 = 0.5;

/// Savings derived from comparing the two schedules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub total_interest_standard: f64,
    pub total_interest_strategy: f64,
    pub interest_savings: f64,
    pub total_payments_standard: f64,
    pub total_payments_strategy: f64,
    pub absolute_savings: f64,
    pub percent_savings: f64,
    /// Standard interest paid during the active period
    pub interest_in_active_period: f64,
    /// Same, as a percentage of lifetime standard interest
    pub interest_share_in_active_period: f64,
    /// 0 or 1, see [`SavingsAnalyzer::compare`]
    pub early_finish_months: u32,
    pub estimated_finish_date: NaiveDate,
}

/// How large the savings are, for narrative output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SavingsLevel {
    Significant,
    Moderate,
    Slight,
    Minimal,
}

impl SavingsLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent > 10.0 {
            SavingsLevel::Significant
        } else if percent > 5.0 {
            SavingsLevel::Moderate
        } else if percent > 0.1 {
            SavingsLevel::Slight
        } else {
            SavingsLevel::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsLevel::Significant => "significant",
            SavingsLevel::Moderate => "moderate",
            SavingsLevel::Slight => "slight",
            SavingsLevel::Minimal => "minimal",
        }
    }
}

/// Compares a standard schedule with a strategy schedule
pub struct SavingsAnalyzer<'a> {
    loan: &'a LoanParameters,
    policy: &'a ExtraPaymentPolicy,
}

impl<'a> SavingsAnalyzer<'a> {
    pub fn new(loan: &'a LoanParameters, policy: &'a ExtraPaymentPolicy) -> Self {
        Self { loan, policy }
    }

    /// Derive interest and payment savings
    ///
    /// The strategy keeps the full term, so there is no real early payoff to detect.
    /// `early_finish_months` is a heuristic: it is 1 when the strategy's last installment
    /// is under half of the standard one, 0 otherwise.
    pub fn compare(&self, standard: &Schedule, strategy: &Schedule) -> Result<SavingsSummary> {
        if !standard.is_built() {
            return Err(SimulatorError::prerequisite("the standard schedule has not been built"));
        }
        if !strategy.is_built() {
            return Err(SimulatorError::prerequisite("the strategy schedule has not been built"));
        }

        let std_summary = standard.summary();
        let strat_summary = strategy.summary();

        let total_interest_standard = std_summary.total_interest;
        let total_interest_strategy = strat_summary.total_interest;

        let total_payments_standard = std_summary.total_installments;
        let total_payments_strategy =
            self.loan.initial_lump_sum() + strat_summary.total_installments + strat_summary.total_extra;

        let absolute_savings = total_payments_standard - total_payments_strategy;
        let percent_savings = if total_payments_standard != 0.0 {
            absolute_savings / total_payments_standard * 100.0
        } else {
            0.0
        };

        let active_years = self.policy.active_years().min(self.loan.term_years());
        let active_months = (active_years * MONTHS_PER_YEAR) as usize;
        let interest_in_active_period: f64 = standard
            .payment_rows()
            .iter()
            .take(active_months)
            .map(|r| r.interest_portion)
            .sum();
        let interest_share_in_active_period = if total_interest_standard > 0.0 {
            interest_in_active_period / total_interest_standard * 100.0
        } else {
            0.0
        };

        let early_finish_months = if standard.term_months() > 0
            && strategy.term_months() > 0
            && strat_summary.final_installment < EARLY_FINISH_THRESHOLD * std_summary.final_installment
        {
            1
        } else {
            0
        };

        let estimated_finish_date = strategy
            .last_row()
            .map(|r| r.date)
            .unwrap_or_else(|| self.loan.start_date());

        Ok(SavingsSummary {
            total_interest_standard,
            total_interest_strategy,
            interest_savings: total_interest_standard - total_interest_strategy,
            total_payments_standard,
            total_payments_strategy,
            absolute_savings,
            percent_savings,
            interest_in_active_period,
            interest_share_in_active_period,
            early_finish_months,
            estimated_finish_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::PolicyKind;
    use crate::schedule::{ScheduleBuilder, ScheduleKind};
    use approx::assert_abs_diff_eq;

    fn loan(lump_sum: f64) -> LoanParameters {
        LoanParameters::with_term_years(232_741.0, 30, 1.9, lump_sum, 1, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).unwrap()
    }

    fn compare(loan: &LoanParameters, policy: &ExtraPaymentPolicy) -> SavingsSummary {
        let builder = ScheduleBuilder::new(loan);
        let standard = builder.build_standard();
        let strategy = builder.build_strategy(policy);
        SavingsAnalyzer::new(loan, policy).compare(&standard, &strategy).unwrap()
    }

    #[test]
    fn test_requires_built_schedules() {
        let loan = loan(0.0);
        let policy = ExtraPaymentPolicy::none();
        let built = ScheduleBuilder::new(&loan).build_standard();
        let empty = Schedule::new(ScheduleKind::Strategy);
        let analyzer = SavingsAnalyzer::new(&loan, &policy);

        assert!(analyzer.compare(&built, &empty).unwrap_err().is_prerequisite());
        assert!(analyzer.compare(&Schedule::new(ScheduleKind::Standard), &built).unwrap_err().is_prerequisite());
    }

    #[test]
    fn test_no_strategy_means_no_savings() {
        let loan = loan(0.0);
        let summary = compare(&loan, &ExtraPaymentPolicy::none());

        assert_abs_diff_eq!(summary.absolute_savings, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(summary.interest_savings, 0.0, epsilon = 1e-6);
        assert_eq!(summary.interest_share_in_active_period, 0.0);
        assert_eq!(summary.early_finish_months, 0);
        assert_eq!(summary.estimated_finish_date, NaiveDate::from_ymd_opt(2055, 6, 1).unwrap());
    }

    #[test]
    fn test_savings_are_non_negative_for_active_policies() {
        for lump in [0.0, 10_000.0] {
            for (kind, value) in [(PolicyKind::InstallmentMultiple, 1.0), (PolicyKind::InstallmentMultiple, 3.0),
                                  (PolicyKind::FixedAmount, 600.0), (PolicyKind::FixedAmount, 2_400.0)] {
                for years in [2, 10, 30] {
                    let loan = loan(lump);
                    let policy = ExtraPaymentPolicy::new(kind, value, years).unwrap();
                    let summary = compare(&loan, &policy);
                    assert!(summary.absolute_savings >= 0.0,
                        "{:?} {} for {} years: {}", kind, value, years, summary.absolute_savings);
                    assert!(summary.total_interest_strategy <= summary.total_interest_standard);
                }
            }
        }
    }

    #[test]
    fn test_payment_totals_include_lump_sum_and_extras() {
        let loan = loan(10_000.0);
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1_200.0, 10).unwrap();
        let builder = ScheduleBuilder::new(&loan);
        let strategy = builder.build_strategy(&policy);
        let summary = compare(&loan, &policy);

        assert_abs_diff_eq!(summary.total_payments_standard, 232_741.0 + summary.total_interest_standard, epsilon = 0.01);

        let installments: f64 = strategy.payment_rows().iter().map(|r| r.installment).sum();
        let extras: f64 = strategy.extra_payments().map(|r| r.extra_principal).sum();
        assert_abs_diff_eq!(summary.total_payments_strategy, 10_000.0 + installments + extras, epsilon = 1e-6);

        // Extra-payment rows record the lowered installment, so payment savings exceed
        // interest savings by the installment drop on those rows
        let drop: f64 = strategy
            .payment_rows()
            .iter()
            .map(|r| r.interest_portion + r.principal_portion - r.installment)
            .sum();
        assert!(drop > 0.0);
        assert_abs_diff_eq!(summary.absolute_savings, summary.interest_savings + drop, epsilon = 0.02);
        assert_abs_diff_eq!(
            summary.percent_savings,
            summary.absolute_savings / summary.total_payments_standard * 100.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_reference_loan_savings() {
        let loan = loan(0.0);
        let policy = ExtraPaymentPolicy::new(PolicyKind::InstallmentMultiple, 2.0, 10).unwrap();
        let summary = compare(&loan, &policy);

        assert_abs_diff_eq!(summary.absolute_savings, 8_192.13, epsilon = 0.01);
        assert_abs_diff_eq!(summary.interest_savings, 8_058.35, epsilon = 0.01);
    }

    #[test]
    fn test_interest_share_in_active_period() {
        let loan = loan(0.0);
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1_000.0, 10).unwrap();
        let builder = ScheduleBuilder::new(&loan);
        let standard = builder.build_standard();
        let summary = compare(&loan, &policy);

        let first_ten_years: f64 = standard.rows[1..=120].iter().map(|r| r.interest_portion).sum();
        assert_abs_diff_eq!(summary.interest_in_active_period, first_ten_years, epsilon = 1e-9);
        assert!(summary.interest_share_in_active_period > 40.0 && summary.interest_share_in_active_period < 60.0,
            "share {}", summary.interest_share_in_active_period);

        let whole_term = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1_000.0, 30).unwrap();
        assert_abs_diff_eq!(compare(&loan, &whole_term).interest_share_in_active_period, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_rate_percentages_are_zero_safe() {
        let loan = LoanParameters::new(100_000.0, 120, 0.0, 0.0, 1, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap();
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1_000.0, 5).unwrap();
        let summary = compare(&loan, &policy);
        assert_eq!(summary.total_interest_standard, 0.0);
        assert_eq!(summary.interest_share_in_active_period, 0.0);
        assert_eq!(summary.interest_savings, 0.0);
        assert!(summary.absolute_savings >= 0.0);
        assert!(summary.percent_savings.is_finite());
    }

    #[test]
    fn test_early_finish_heuristic() {
        // Extra payments through the final year shrink the last installment well below half
        let short = LoanParameters::new(20_000.0, 24, 4.0, 0.0, 1, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap();
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 4_000.0, 2).unwrap();
        let summary = compare(&short, &policy);
        assert_eq!(summary.early_finish_months, 1);

        let loan = loan(0.0);
        let mild = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 600.0, 4).unwrap();
        assert_eq!(compare(&loan, &mild).early_finish_months, 0);
    }

    #[test]
    fn test_savings_level() {
        assert_eq!(SavingsLevel::from_percent(12.0), SavingsLevel::Significant);
        assert_eq!(SavingsLevel::from_percent(7.5), SavingsLevel::Moderate);
        assert_eq!(SavingsLevel::from_percent(0.5), SavingsLevel::Slight);
        assert_eq!(SavingsLevel::from_percent(0.05), SavingsLevel::Minimal);
    }
}
