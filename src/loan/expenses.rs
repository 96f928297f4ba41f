//! Recurring household expenses that ride along with the mortgage installment

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result, SimulatorError};
use super::params::MONTHS_PER_YEAR;

/// A recurring monthly cost with annual compounding growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDefinition {
    /// Unique key within an [`ExpenseSet`]
    pub name: String,

    /// Monthly amount during the first calendar year
    pub monthly_base_amount: f64,

    /// Annual growth as a fraction (0.03 = 3%)
    pub annual_growth_rate: f64,
}

impl ExpenseDefinition {
    /// Expense given as a monthly amount
    pub fn monthly(name: impl Into<String>, amount: f64, annual_growth_rate: f64) -> Result<Self> {
        let expense = Self {
            name: name.into(),
            monthly_base_amount: amount,
            annual_growth_rate,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Expense given as a yearly amount, prorated over twelve months
    pub fn annual(name: impl Into<String>, yearly_amount: f64, annual_growth_rate: f64) -> Result<Self> {
        Self::monthly(name, yearly_amount / MONTHS_PER_YEAR as f64, annual_growth_rate)
    }

    pub fn validate(&self) -> Result<()> {
        let field = format!("expense '{}'", self.name);
        ensure_finite(&field, self.monthly_base_amount)?;
        ensure_finite(&field, self.annual_growth_rate)?;
        if self.name.trim().is_empty() {
            return Err(SimulatorError::validation("expense name", "cannot be empty"));
        }
        if self.monthly_base_amount < 0.0 {
            return Err(SimulatorError::validation(field, "amount cannot be negative"));
        }
        if self.annual_growth_rate < 0.0 {
            return Err(SimulatorError::validation(field, "annual growth rate cannot be negative"));
        }
        Ok(())
    }

    /// Amount due `years_elapsed` calendar years after the first payment year
    pub fn amount_after_years(&self, years_elapsed: i32) -> f64 {
        self.monthly_base_amount * (1.0 + self.annual_growth_rate).powi(years_elapsed)
    }
}

/// Ordered, name-unique collection of expenses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseSet {
    expenses: Vec<ExpenseDefinition>,
}

impl ExpenseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from definitions, rejecting invalid or duplicate entries
    pub fn from_definitions(definitions: impl IntoIterator<Item = ExpenseDefinition>) -> Result<Self> {
        let mut set = Self::new();
        for definition in definitions {
            set.push(definition)?;
        }
        Ok(set)
    }

    /// Append an expense, keeping insertion order
    pub fn push(&mut self, definition: ExpenseDefinition) -> Result<()> {
        definition.validate()?;
        if self.expenses.iter().any(|e| e.name == definition.name) {
            return Err(SimulatorError::validation(
                "expense name",
                format!("'{}' is defined more than once", definition.name),
            ));
        }
        self.expenses.push(definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpenseDefinition> {
        self.expenses.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.expenses.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ExpenseDefinition> {
        self.expenses.iter().find(|e| e.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.expenses.iter().position(|e| e.name == name)
    }
}
