//! Load expense definitions from CSV
//!
//! Expected columns: `name,amount,annual_growth_rate,frequency`, where `frequency` is
//! `monthly` (default when empty) or `annual`.

use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder, Trim};

use super::{ExpenseDefinition, ExpenseSet};
use crate::error::{Result, SimulatorError};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    name: String,
    amount: f64,
    #[serde(default)]
    annual_growth_rate: f64,
    #[serde(default)]
    frequency: Option<String>,
}

impl CsvRow {
    fn into_definition(self) -> Result<ExpenseDefinition> {
        match self.frequency.as_deref().map(str::trim) {
            None | Some("") | Some("monthly") => {
                ExpenseDefinition::monthly(self.name, self.amount, self.annual_growth_rate)
            }
            Some("annual") => ExpenseDefinition::annual(self.name, self.amount, self.annual_growth_rate),
            Some(other) => Err(SimulatorError::validation(
                format!("expense '{}' frequency", self.name),
                format!("unknown frequency '{}' (expected monthly or annual)", other),
            )),
        }
    }
}

/// Load expenses from a CSV file
pub fn load_expenses(path: &Path) -> Result<ExpenseSet> {
    let reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    read_rows(reader)
}

/// Load expenses from any reader (used by tests and embedded data)
pub fn load_expenses_from_reader<R: Read>(reader: R) -> Result<ExpenseSet> {
    read_rows(ReaderBuilder::new().trim(Trim::All).from_reader(reader))
}

fn read_rows<R: Read>(mut reader: Reader<R>) -> Result<ExpenseSet> {
    let mut set = ExpenseSet::new();
    for row in reader.deserialize::<CsvRow>() {
        set.push(row?.into_definition()?)?;
    }
    log::debug!("Loaded {} expense definitions", set.len());
    Ok(set)
}
