//! One loan, one policy, one expense set, and everything derived from them
//!
//! Schedules and savings are computed once by [`SimulationContext::initialize`] and then
//! served read-only. A different loan or policy means a new context.

use serde::Serialize;

use crate::error::{Result, SimulatorError};
use crate::loan::{ExpenseSet, ExtraPaymentPolicy, LoanParameters};
use crate::overlay::{ExpenseOverlay, ExpenseSchedule};
use crate::savings::{SavingsAnalyzer, SavingsSummary};
use crate::schedule::{Schedule, ScheduleBuilder};

/// Outputs of an initialized context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutputs {
    pub standard: Schedule,
    pub strategy: Schedule,
    pub expense_schedule: ExpenseSchedule,
    pub savings: SavingsSummary,
}

#[derive(Debug, Clone)]
pub struct SimulationContext {
    loan: LoanParameters,
    policy: ExtraPaymentPolicy,
    expenses: ExpenseSet,
    outputs: Option<SimulationOutputs>,
}

impl SimulationContext {
    /// Check the policy against the loan; nothing is built yet
    pub fn new(loan: LoanParameters, policy: ExtraPaymentPolicy, expenses: ExpenseSet) -> Result<Self> {
        policy.validate_for(&loan)?;
        Ok(Self { loan, policy, expenses, outputs: None })
    }

    /// Build and initialize in one go
    pub fn simulate(loan: LoanParameters, policy: ExtraPaymentPolicy, expenses: ExpenseSet) -> Result<Self> {
        let mut context = Self::new(loan, policy, expenses)?;
        context.initialize()?;
        Ok(context)
    }

    /// Build both schedules, the expense overlay and the savings summary
    ///
    /// Calling it again on an initialized context does nothing.
    pub fn initialize(&mut self) -> Result<()> {
        if self.outputs.is_some() {
            return Ok(());
        }

        let builder = ScheduleBuilder::new(&self.loan);
        let standard = builder.build_standard();
        let strategy = builder.build_strategy(&self.policy);
        let expense_schedule = ExpenseOverlay::new(&self.expenses, &self.policy).apply(&strategy)?;
        let savings = SavingsAnalyzer::new(&self.loan, &self.policy).compare(&standard, &strategy)?;

        self.outputs = Some(SimulationOutputs { standard, strategy, expense_schedule, savings });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.outputs.is_some()
    }

    pub fn loan(&self) -> &LoanParameters {
        &self.loan
    }

    pub fn policy(&self) -> &ExtraPaymentPolicy {
        &self.policy
    }

    pub fn expenses(&self) -> &ExpenseSet {
        &self.expenses
    }

    pub fn outputs(&self) -> Result<&SimulationOutputs> {
        self.outputs
            .as_ref()
            .ok_or_else(|| SimulatorError::prerequisite("the simulation context has not been initialized"))
    }

    /// Take ownership of the outputs, consuming the context
    pub fn into_outputs(self) -> Result<SimulationOutputs> {
        self.outputs
            .ok_or_else(|| SimulatorError::prerequisite("the simulation context has not been initialized"))
    }

    pub fn standard_schedule(&self) -> Result<&Schedule> {
        Ok(&self.outputs()?.standard)
    }

    pub fn strategy_schedule(&self) -> Result<&Schedule> {
        Ok(&self.outputs()?.strategy)
    }

    pub fn expense_schedule(&self) -> Result<&ExpenseSchedule> {
        Ok(&self.outputs()?.expense_schedule)
    }

    pub fn savings(&self) -> Result<&SavingsSummary> {
        Ok(&self.outputs()?.savings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{ExpenseDefinition, PolicyKind};
    use chrono::NaiveDate;

    fn loan() -> LoanParameters {
        LoanParameters::with_term_years(232_741.0, 30, 1.9, 0.0, 1, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).unwrap()
    }

    #[test]
    fn test_outputs_require_initialization() {
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1_000.0, 5).unwrap();
        let context = SimulationContext::new(loan(), policy, ExpenseSet::new()).unwrap();

        assert!(!context.is_initialized());
        assert!(context.standard_schedule().unwrap_err().is_prerequisite());
        assert!(context.strategy_schedule().unwrap_err().is_prerequisite());
        assert!(context.expense_schedule().unwrap_err().is_prerequisite());
        assert!(context.savings().unwrap_err().is_prerequisite());
    }

    #[test]
    fn test_policy_longer_than_term_is_rejected() {
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 1_000.0, 31).unwrap();
        let err = SimulationContext::new(loan(), policy, ExpenseSet::new()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_initialize_builds_everything_once() {
        let policy = ExtraPaymentPolicy::new(PolicyKind::InstallmentMultiple, 2.0, 10).unwrap();
        let expenses = ExpenseSet::from_definitions([ExpenseDefinition::annual("Home insurance", 300.0, 0.02).unwrap()]).unwrap();
        let mut context = SimulationContext::new(loan(), policy, expenses).unwrap();
        context.initialize().unwrap();

        let first = context.outputs().unwrap().clone();
        context.initialize().unwrap();
        assert_eq!(context.outputs().unwrap(), &first);

        assert_eq!(context.standard_schedule().unwrap().rows.len(), 361);
        assert_eq!(context.strategy_schedule().unwrap().rows.len(), 361);
        assert_eq!(context.expense_schedule().unwrap().rows.len(), 361);
        assert_eq!(context.expense_schedule().unwrap().names, vec!["Home insurance".to_string()]);
        assert!(context.savings().unwrap().absolute_savings > 0.0);
    }

    #[test]
    fn test_simulate_matches_manual_pipeline() {
        let policy = ExtraPaymentPolicy::new(PolicyKind::FixedAmount, 3_000.0, 15).unwrap();
        let context = SimulationContext::simulate(loan(), policy, ExpenseSet::new()).unwrap();

        let loan = loan();
        let builder = ScheduleBuilder::new(&loan);
        let strategy = builder.build_strategy(&policy);
        assert_eq!(context.strategy_schedule().unwrap(), &strategy);

        let outputs = context.into_outputs().unwrap();
        assert_eq!(outputs.strategy, strategy);
    }
}
