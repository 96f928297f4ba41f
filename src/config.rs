//! JSON configuration for grid runs
//!
//! Every field is optional; missing fields fall back to the reference loan (232 741 over
//! 30 years at 1.90%, first anchored on 2025-06-01) and the default grid.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulatorError};
use crate::grid::{GridDimensions, GridSearch};
use crate::loan::{ExpenseDefinition, ExpenseSet, LoanParameters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_principal")]
    pub principal: f64,

    #[serde(default = "default_term_years")]
    pub term_years: u32,

    /// Annual rate in percent
    #[serde(default = "default_annual_rate")]
    pub annual_rate: f64,

    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    #[serde(default = "default_payment_day")]
    pub payment_day: u32,

    #[serde(default)]
    pub grid: GridDimensions,

    #[serde(default)]
    pub expenses: Vec<ExpenseDefinition>,

    /// Evaluate only the first N combinations
    #[serde(default)]
    pub max_combinations: Option<usize>,
}

fn default_principal() -> f64 { 232_741.0 }
fn default_term_years() -> u32 { 30 }
fn default_annual_rate() -> f64 { 1.90 }
fn default_payment_day() -> u32 { 1 }
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            principal: default_principal(),
            term_years: default_term_years(),
            annual_rate: default_annual_rate(),
            start_date: default_start_date(),
            payment_day: default_payment_day(),
            grid: GridDimensions::default(),
            expenses: Vec::new(),
            max_combinations: None,
        }
    }
}

impl GridConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        log::debug!("loaded grid config from {}", path.display());
        Ok(config)
    }

    /// Base loan, without a lump sum (the grid supplies it)
    pub fn loan(&self) -> Result<LoanParameters> {
        LoanParameters::with_term_years(
            self.principal,
            self.term_years,
            self.annual_rate,
            0.0,
            self.payment_day,
            self.start_date,
        )
    }

    pub fn expense_set(&self) -> Result<ExpenseSet> {
        ExpenseSet::from_definitions(self.expenses.iter().cloned())
    }

    /// Validate the loan and expenses and configure the search
    pub fn into_search(self) -> Result<GridSearch> {
        let loan = self.loan()?;
        let expenses = self.expense_set()?;
        if self.grid.lump_sums.iter().any(|v| !v.is_finite())
            || self.grid.policies.iter().flat_map(|a| &a.values).any(|v| !v.is_finite())
        {
            return Err(SimulatorError::validation("grid", "values must be finite numbers"));
        }
        Ok(GridSearch::configure(loan, expenses, self.grid))
    }
}
