//! Loan inputs: parameters, extra-payment policy and recurring expenses

mod params;
mod expenses;
pub mod loader;

pub use params::{
    LoanParameters, ExtraPaymentPolicy, PolicyKind,
    MONTHS_PER_YEAR, EXTRA_PAYMENT_INTERVAL_MONTHS, MAX_PAYMENT_DAY,
};
pub use expenses::{ExpenseDefinition, ExpenseSet};
pub use loader::{load_expenses, load_expenses_from_reader};
