//! Parameter space of a grid search

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loan::{ExtraPaymentPolicy, LoanParameters, PolicyKind};

/// Values to try for one policy kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAxis {
    pub kind: PolicyKind,
    pub values: Vec<f64>,
}

impl PolicyAxis {
    pub fn new(kind: PolicyKind, values: impl Into<Vec<f64>>) -> Self {
        Self { kind, values: values.into() }
    }
}

/// Lump sums x (kind, value) pairs x active years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDimensions {
    pub lump_sums: Vec<f64>,
    pub policies: Vec<PolicyAxis>,
    pub active_years: Vec<u32>,
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self {
            lump_sums: vec![0.0],
            policies: vec![
                PolicyAxis::new(PolicyKind::InstallmentMultiple, [2.0, 3.0, 4.0]),
                PolicyAxis::new(PolicyKind::FixedAmount, [1_000.0, 2_000.0, 3_000.0]),
            ],
            active_years: vec![5, 10, 15],
        }
    }
}

impl GridDimensions {
    /// Number of (kind, value) pairs across all policy axes
    pub fn policy_count(&self) -> usize {
        self.policies.iter().map(|axis| axis.values.len()).sum()
    }

    pub fn combination_count(&self) -> usize {
        self.lump_sums.len() * self.policy_count() * self.active_years.len()
    }

    /// Every combination: lump sum outermost, then kind, value and active years
    pub fn combinations(&self) -> Vec<GridCombination> {
        let mut out = Vec::with_capacity(self.combination_count());
        for &initial_lump_sum in &self.lump_sums {
            for axis in &self.policies {
                for &policy_value in &axis.values {
                    for &active_years in &self.active_years {
                        out.push(GridCombination {
                            initial_lump_sum,
                            policy_kind: axis.kind,
                            policy_value,
                            active_years,
                        });
                    }
                }
            }
        }
        out
    }
}

/// One point of the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCombination {
    pub initial_lump_sum: f64,
    pub policy_kind: PolicyKind,
    pub policy_value: f64,
    pub active_years: u32,
}

impl GridCombination {
    /// Loan and policy for this point, derived from the base loan
    pub fn instantiate(&self, base: &LoanParameters) -> Result<(LoanParameters, ExtraPaymentPolicy)> {
        let loan = base.with_initial_lump_sum(self.initial_lump_sum)?;
        let policy = ExtraPaymentPolicy::for_loan(self.policy_kind, self.policy_value, self.active_years, &loan)?;
        Ok((loan, policy))
    }

    pub fn label(&self) -> String {
        format!(
            "lump {:.0}, {} {}, {} years",
            self.initial_lump_sum, self.policy_kind, self.policy_value, self.active_years
        )
    }
}
