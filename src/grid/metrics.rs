//! Ranking criteria and the metrics derived for each grid point

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimulatorError;
use crate::loan::MONTHS_PER_YEAR;
use crate::overlay::ExpenseSchedule;
use crate::savings::SavingsSummary;
use crate::schedule::Schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCriterion {
    SavingsTotal,
    SavingsPercent,
    FinalInstallment,
    AverageFirstYearProvision,
    SavingsToProvisionRatio,
}

impl RankCriterion {
    pub const ALL: [RankCriterion; 5] = [
        RankCriterion::SavingsTotal,
        RankCriterion::SavingsPercent,
        RankCriterion::FinalInstallment,
        RankCriterion::AverageFirstYearProvision,
        RankCriterion::SavingsToProvisionRatio,
    ];

    /// Higher is better for savings, lower is better for installments and provisions
    pub fn maximizes(&self) -> bool {
        matches!(
            self,
            RankCriterion::SavingsTotal | RankCriterion::SavingsPercent | RankCriterion::SavingsToProvisionRatio
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankCriterion::SavingsTotal => "savings_total",
            RankCriterion::SavingsPercent => "savings_percent",
            RankCriterion::FinalInstallment => "final_installment",
            RankCriterion::AverageFirstYearProvision => "average_first_year_provision",
            RankCriterion::SavingsToProvisionRatio => "savings_to_provision_ratio",
        }
    }
}

impl fmt::Display for RankCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankCriterion {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        RankCriterion::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| SimulatorError::validation("criterion", format!("unknown criterion '{}'", s)))
    }
}

/// Figures the grid is ranked on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub savings_total: f64,
    pub savings_percent: f64,
    /// Installment paid in the first month after the active period
    pub final_installment: f64,
    pub average_first_year_provision: f64,
    pub savings_to_provision_ratio: f64,
}

impl GridMetrics {
    pub fn derive(strategy: &Schedule, expenses: &ExpenseSchedule, savings: &SavingsSummary, active_years: u32) -> Self {
        let after_active = (active_years * MONTHS_PER_YEAR + 1) as usize;
        let final_installment = strategy
            .rows
            .get(after_active.min(strategy.term_months()))
            .map(|r| r.installment)
            .unwrap_or(0.0);

        let average_first_year_provision = expenses.average_first_year_provision();
        let savings_to_provision_ratio = if average_first_year_provision != 0.0 {
            savings.absolute_savings / average_first_year_provision
        } else {
            0.0
        };

        Self {
            savings_total: savings.absolute_savings,
            savings_percent: savings.percent_savings,
            final_installment,
            average_first_year_provision,
            savings_to_provision_ratio,
        }
    }

    pub fn value(&self, criterion: RankCriterion) -> f64 {
        match criterion {
            RankCriterion::SavingsTotal => self.savings_total,
            RankCriterion::SavingsPercent => self.savings_percent,
            RankCriterion::FinalInstallment => self.final_installment,
            RankCriterion::AverageFirstYearProvision => self.average_first_year_provision,
            RankCriterion::SavingsToProvisionRatio => self.savings_to_provision_ratio,
        }
    }
}
