//! Mortgage Strategy - amortization engine and grid search for extra-payment strategies
//!
//! This library provides:
//! - French amortization schedules, with and without semiannual extra payments
//! - Re-amortization after each extra payment (lower installment, same term)
//! - Recurring household expenses and extra-payment provisions layered on a schedule
//! - Savings comparison and interest concentration analysis
//! - Parallel grid search over lump sums, extra-payment policies and active periods

pub mod error;
pub mod loan;
pub mod schedule;
pub mod overlay;
pub mod savings;
pub mod context;
pub mod grid;
pub mod config;

// Re-export commonly used types
pub use error::{Result, SimulatorError};
pub use loan::{ExpenseDefinition, ExpenseSet, ExtraPaymentPolicy, LoanParameters, PolicyKind};
pub use schedule::{Schedule, ScheduleBuilder, ScheduleRow};
pub use overlay::{ExpenseOverlay, ExpenseRow, ExpenseSchedule};
pub use savings::{InterestDistribution, SavingsAnalyzer, SavingsSummary};
pub use context::SimulationContext;
pub use grid::{GridDimensions, GridSearch, GridSearchResults, RankCriterion};
pub use config::GridConfig;
