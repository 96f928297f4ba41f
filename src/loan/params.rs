//! Loan terms and the extra-payment policy applied on top of them

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result, SimulatorError};

/// Months in a calendar year
pub const MONTHS_PER_YEAR: u32 = 12;

/// Extra payments fall every six months during the active period
pub const EXTRA_PAYMENT_INTERVAL_MONTHS: u32 = 6;

/// Latest payment day allowed, so every month (February included) has it
pub const MAX_PAYMENT_DAY: u32 = 28;

/// Validated loan parameters
///
/// Fields are private: the only way to obtain a value is through [`LoanParameters::new`]
/// (or the derived constructors), which validates every field eagerly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanParameters {
    /// Amount borrowed
    principal: f64,

    /// Loan term in months
    term_months: u32,

    /// Nominal annual rate in percent (1.9 means 1.9%)
    annual_rate: f64,

    /// Principal repaid right after signing
    initial_lump_sum: f64,

    /// Day of month on which installments fall (1-28)
    payment_day: u32,

    /// Signing date, with its day moved to `payment_day`
    start_date: NaiveDate,
}

impl LoanParameters {
    /// Create loan parameters, failing fast on any invalid field
    pub fn new(
        principal: f64,
        term_months: u32,
        annual_rate: f64,
        initial_lump_sum: f64,
        payment_day: u32,
        start_date: NaiveDate,
    ) -> Result<Self> {
        ensure_finite("principal", principal)?;
        ensure_finite("annual_rate", annual_rate)?;
        ensure_finite("initial_lump_sum", initial_lump_sum)?;

        if principal <= 0.0 {
            return Err(SimulatorError::validation("principal", "must be greater than zero"));
        }
        if term_months == 0 {
            return Err(SimulatorError::validation("term_months", "must be greater than zero"));
        }
        if annual_rate < 0.0 {
            return Err(SimulatorError::validation("annual_rate", "cannot be negative"));
        }
        if initial_lump_sum < 0.0 {
            return Err(SimulatorError::validation("initial_lump_sum", "cannot be negative"));
        }
        if initial_lump_sum >= principal {
            return Err(SimulatorError::validation(
                "initial_lump_sum",
                format!("must be lower than the principal ({:.2})", principal),
            ));
        }
        if !(1..=MAX_PAYMENT_DAY).contains(&payment_day) {
            return Err(SimulatorError::validation(
                "payment_day",
                format!("must be between 1 and {}, got {}", MAX_PAYMENT_DAY, payment_day),
            ));
        }

        let start_date = start_date.with_day(payment_day).ok_or_else(|| {
            SimulatorError::validation("start_date", format!("cannot move {} to day {}", start_date, payment_day))
        })?;

        Ok(Self {
            principal,
            term_months,
            annual_rate,
            initial_lump_sum,
            payment_day,
            start_date,
        })
    }

    /// Convenience constructor for a term expressed in whole years
    pub fn with_term_years(
        principal: f64,
        term_years: u32,
        annual_rate: f64,
        initial_lump_sum: f64,
        payment_day: u32,
        start_date: NaiveDate,
    ) -> Result<Self> {
        let term_months = term_years
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or_else(|| SimulatorError::validation("term_years", "term is too long"))?;
        Self::new(principal, term_months, annual_rate, initial_lump_sum, payment_day, start_date)
    }

    /// Same loan with a different initial lump sum (revalidated)
    pub fn with_initial_lump_sum(&self, initial_lump_sum: f64) -> Result<Self> {
        Self::new(
            self.principal,
            self.term_months,
            self.annual_rate,
            initial_lump_sum,
            self.payment_day,
            self.start_date,
        )
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Whole years covered by the term
    pub fn term_years(&self) -> u32 {
        self.term_months / MONTHS_PER_YEAR
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    /// Monthly rate as a fraction
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / MONTHS_PER_YEAR as f64 / 100.0
    }

    pub fn initial_lump_sum(&self) -> f64 {
        self.initial_lump_sum
    }

    /// Balance left after the lump sum paid at signing
    pub fn financed_after_lump_sum(&self) -> f64 {
        self.principal - self.initial_lump_sum
    }

    pub fn payment_day(&self) -> u32 {
        self.payment_day
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Date of schedule row `month` (row 0 is the signing date)
    pub fn payment_date(&self, month: u32) -> NaiveDate {
        // payment_day <= 28, so adding months never lands on an invalid day
        self.start_date
            .checked_add_months(Months::new(month))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// How the semiannual extra payment is sized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// A multiple of the installment in force at the payment month
    InstallmentMultiple,
    /// A fixed currency amount
    FixedAmount,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 2] = [PolicyKind::InstallmentMultiple, PolicyKind::FixedAmount];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::InstallmentMultiple => "installment_multiple",
            PolicyKind::FixedAmount => "fixed_amount",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "installment_multiple" | "installments" | "cuotas" => Ok(PolicyKind::InstallmentMultiple),
            "fixed_amount" | "fixed" | "constante" => Ok(PolicyKind::FixedAmount),
            other => Err(SimulatorError::validation(
                "policy_kind",
                format!("unknown kind '{}' (expected installment_multiple or fixed_amount)", other),
            )),
        }
    }
}

/// Semiannual extra-payment policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtraPaymentPolicy {
    kind: PolicyKind,
    value: f64,
    active_years: u32,
}

impl ExtraPaymentPolicy {
    pub fn new(kind: PolicyKind, value: f64, active_years: u32) -> Result<Self> {
        ensure_finite("policy_value", value)?;
        if value < 0.0 {
            return Err(SimulatorError::validation("policy_value", "cannot be negative"));
        }
        Ok(Self { kind, value, active_years })
    }

    /// Build a policy and check it fits `loan` in one step
    pub fn for_loan(kind: PolicyKind, value: f64, active_years: u32, loan: &LoanParameters) -> Result<Self> {
        let policy = Self::new(kind, value, active_years)?;
        policy.validate_for(loan)?;
        Ok(policy)
    }

    /// Policy that never triggers an extra payment
    pub fn none() -> Self {
        Self {
            kind: PolicyKind::FixedAmount,
            value: 0.0,
            active_years: 0,
        }
    }

    /// Check the active period fits inside the loan term
    pub fn validate_for(&self, loan: &LoanParameters) -> Result<()> {
        if self.active_years > loan.term_years() {
            return Err(SimulatorError::validation(
                "active_years",
                format!(
                    "{} years exceeds the loan term of {} years",
                    self.active_years,
                    loan.term_years()
                ),
            ));
        }
        Ok(())
    }

    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn active_years(&self) -> u32 {
        self.active_years
    }

    /// Last month in which an extra payment may fall
    pub fn active_months(&self) -> u32 {
        self.active_years * MONTHS_PER_YEAR
    }

    /// Whether the policy ever produces an extra payment
    pub fn is_active(&self) -> bool {
        self.active_years > 0 && self.value > 0.0
    }

    /// Whether an extra payment is due at `month` (1-indexed)
    pub fn triggers_at(&self, month: u32) -> bool {
        self.is_active()
            && month > 0
            && month % EXTRA_PAYMENT_INTERVAL_MONTHS == 0
            && month <= self.active_months()
    }

    /// Requested extra payment before capping at the outstanding balance
    pub fn candidate_amount(&self, installment: f64) -> f64 {
        match self.kind {
            PolicyKind::InstallmentMultiple => installment * self.value,
            PolicyKind::FixedAmount => self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_valid_loan() {
        let loan = LoanParameters::with_term_years(232_741.0, 30, 1.9, 0.0, 1, start()).unwrap();
        assert_eq!(loan.term_months(), 360);
        assert_eq!(loan.term_years(), 30);
        assert_eq!(loan.start_date(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert!((loan.monthly_rate() - 0.019 / 12.0).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let cases = [
            (LoanParameters::new(0.0, 120, 1.0, 0.0, 1, start()), "principal"),
            (LoanParameters::new(1000.0, 0, 1.0, 0.0, 1, start()), "term_months"),
            (LoanParameters::new(1000.0, 120, -0.5, 0.0, 1, start()), "annual_rate"),
            (LoanParameters::new(1000.0, 120, 1.0, -1.0, 1, start()), "initial_lump_sum"),
            (LoanParameters::new(1000.0, 120, 1.0, 1000.0, 1, start()), "initial_lump_sum"),
            (LoanParameters::new(1000.0, 120, 1.0, 0.0, 0, start()), "payment_day"),
            (LoanParameters::new(1000.0, 120, 1.0, 0.0, 29, start()), "payment_day"),
            (LoanParameters::new(f64::NAN, 120, 1.0, 0.0, 1, start()), "principal"),
        ];

        for (result, expected_field) in cases {
            match result {
                Err(SimulatorError::Validation { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected validation error on {}, got {:?}", expected_field, other),
            }
        }
    }

    #[test]
    fn test_payment_dates_keep_day() {
        let loan = LoanParameters::new(1000.0, 24, 1.0, 0.0, 28, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()).unwrap();
        assert_eq!(loan.payment_date(0), NaiveDate::from_ymd_opt(2024, 1, 28).unwrap());
        assert_eq!(loan.payment_date(1), NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(loan.payment_date(12), NaiveDate::from_ymd_opt(2025, 1, 28).unwrap());
    }

    #[test]
    fn test_policy_kind_parsing() {
        assert_eq!("cuotas".parse::<PolicyKind>().unwrap(), PolicyKind::InstallmentMultiple);
        assert_eq!("Fixed_Amount".parse::<PolicyKind>().unwrap(), PolicyKind::FixedAmount);
        assert!("monthly".parse::<PolicyKind>().unwrap_err().is_validation());
    }

    #[test]
    fn test_policy_triggers() {
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1500.0, 2).unwrap();
        let triggered: Vec<u32> = (1..=60).filter(|&m| policy.triggers_at(m)).collect();
        assert_eq!(triggered, vec![6, 12, 18, 24]);

        assert!(!ExtraPaymentPolicy::none().triggers_at(6));
        let zero_value = ExtraPaymentPolicy::new(PolicyKind::InstallmentMultiple, 0.0, 10).unwrap();
        assert!(!zero_value.triggers_at(6));
    }

    #[test]
    fn test_policy_rejects_negative_value_and_long_period() {
        assert!(ExtraPaymentPolicy::new(PolicyKind::FixedAmount, -1.0, 5).is_err());

        let loan = LoanParameters::with_term_years(100_000.0, 10, 2.0, 0.0, 1, start()).unwrap();
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1000.0, 11).unwrap();
        assert!(policy.validate_for(&loan).is_err());
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1000.0, 10).unwrap();
        assert!(policy.validate_for(&loan).is_ok());
    }

    #[test]
    fn test_for_loan_checks_active_period_against_term() {
        let loan = LoanParameters::with_term_years(100_000.0, 10, 2.0, 0.0, 1, start()).unwrap();

        let policy = ExtraPaymentPolicy::for_loan(PolicyKind::InstallmentMultiple, 2.0, 10, &loan).unwrap();
        assert_eq!(policy.active_years(), 10);

        match ExtraPaymentPolicy::for_loan(PolicyKind::InstallmentMultiple, 2.0, 11, &loan) {
            Err(SimulatorError::Validation { field, .. }) => assert_eq!(field, "active_years"),
            other => panic!("expected active_years validation error, got {:?}", other),
        }
        assert!(ExtraPaymentPolicy::for_loan(PolicyKind::FixedAmount, -5.0, 2, &loan).unwrap_err().is_validation());
    }

    #[test]
    fn test_candidate_amount() {
        let multiple = ExtraPaymentPolicy::new(PolicyKind::InstallmentMultiple, 2.5, 5).unwrap();
        assert!((multiple.candidate_amount(800.0) - 2000.0).abs() < 1e-12);
        let fixed = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1200.0, 5).unwrap();
        assert!((fixed.candidate_amount(800.0) - 1200.0).abs() < 1e-12);
    }
}
