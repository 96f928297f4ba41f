//! Amortization schedule engine: installment math, month-by-month builder and rows

pub mod rate;
mod state;
mod builder;
mod rows;

pub use rate::{monthly_installment, installment_with_method, InstallmentMethod, DEGENERATE_DENOMINATOR};
pub use state::AmortizationState;
pub use builder::{ScheduleBuilder, CONSERVATION_TOLERANCE};
pub use rows::{Schedule, ScheduleKind, ScheduleRow, ScheduleSummary};
