//! Savings of a strategy against the standard schedule, and interest concentration

mod analyzer;
mod distribution;

pub use analyzer::{SavingsAnalyzer, SavingsLevel, SavingsSummary, EARLY_FINISH_THRESHOLD};
pub use distribution::{ActivePeriodAssessment, ExtraPaymentCheck, InterestDistribution, YearlyInterest};
