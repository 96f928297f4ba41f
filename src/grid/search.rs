//! Exhaustive evaluation of a grid of strategies
//!
//! A [`GridSearch`] is configured once and consumed by `execute`, which evaluates every
//! combination on the rayon pool and hands back [`GridSearchResults`]. Each combination
//! gets its own loan, policy and context, so one failing point never affects the others.

use rayon::prelude::*;

use crate::context::SimulationContext;
use crate::error::{Result, SimulatorError};
use crate::loan::{ExpenseSet, LoanParameters};
use crate::overlay::ExpenseSchedule;
use crate::savings::SavingsSummary;
use crate::schedule::Schedule;

use super::dimensions::{GridCombination, GridDimensions};
use super::metrics::{GridMetrics, RankCriterion};

/// Outcome of one successful grid point
#[derive(Debug, Clone)]
pub struct GridResult {
    pub combination: GridCombination,
    pub strategy: Schedule,
    pub expense_schedule: ExpenseSchedule,
    pub savings: SavingsSummary,
    pub metrics: GridMetrics,
}

/// One slot of the results, in enumeration order
#[derive(Debug)]
pub struct GridEntry {
    pub index: usize,
    pub combination: GridCombination,
    pub outcome: Result<GridResult>,
}

impl GridEntry {
    pub fn result(&self) -> Option<&GridResult> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&SimulatorError> {
        self.outcome.as_ref().err()
    }
}

/// A configured, not yet executed grid search
#[derive(Debug, Clone)]
pub struct GridSearch {
    base: LoanParameters,
    expenses: ExpenseSet,
    dimensions: GridDimensions,
}

impl GridSearch {
    pub fn configure(base: LoanParameters, expenses: ExpenseSet, dimensions: GridDimensions) -> Self {
        log::info!(
            "grid configured: {} lump sums x {} policies x {} active periods = {} combinations",
            dimensions.lump_sums.len(),
            dimensions.policy_count(),
            dimensions.active_years.len(),
            dimensions.combination_count()
        );
        Self { base, expenses, dimensions }
    }

    pub fn combination_count(&self) -> usize {
        self.dimensions.combination_count()
    }

    pub fn dimensions(&self) -> &GridDimensions {
        &self.dimensions
    }

    pub fn base(&self) -> &LoanParameters {
        &self.base
    }

    /// Evaluate all combinations in parallel, or only the first `max_combinations`
    pub fn execute(self, max_combinations: Option<usize>) -> GridSearchResults {
        let combinations = self.planned(max_combinations);
        let entries: Vec<GridEntry> = combinations
            .par_iter()
            .enumerate()
            .map(|(index, combination)| self.run_slot(index, combination))
            .collect();
        self.finish(entries)
    }

    /// Same as [`execute`](Self::execute) on the calling thread
    pub fn execute_sequential(self, max_combinations: Option<usize>) -> GridSearchResults {
        let combinations = self.planned(max_combinations);
        let entries: Vec<GridEntry> = combinations
            .iter()
            .enumerate()
            .map(|(index, combination)| self.run_slot(index, combination))
            .collect();
        self.finish(entries)
    }

    fn planned(&self, max_combinations: Option<usize>) -> Vec<GridCombination> {
        let mut combinations = self.dimensions.combinations();
        if let Some(cap) = max_combinations {
            if cap < combinations.len() {
                log::info!("limiting grid to the first {} of {} combinations", cap, combinations.len());
                combinations.truncate(cap);
            }
        }
        combinations
    }

    fn run_slot(&self, index: usize, combination: &GridCombination) -> GridEntry {
        let outcome = self.evaluate(combination);
        if let Err(e) = &outcome {
            log::warn!("combination {} ({}) failed: {}", index, combination.label(), e);
        }
        GridEntry { index, combination: *combination, outcome }
    }

    fn evaluate(&self, combination: &GridCombination) -> Result<GridResult> {
        let (loan, policy) = combination.instantiate(&self.base)?;
        let outputs = SimulationContext::simulate(loan, policy, self.expenses.clone())?.into_outputs()?;
        let metrics = GridMetrics::derive(
            &outputs.strategy,
            &outputs.expense_schedule,
            &outputs.savings,
            combination.active_years,
        );

        Ok(GridResult {
            combination: *combination,
            strategy: outputs.strategy,
            expense_schedule: outputs.expense_schedule,
            savings: outputs.savings,
            metrics,
        })
    }

    fn finish(&self, entries: Vec<GridEntry>) -> GridSearchResults {
        let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
        log::info!("grid executed: {} combinations, {} failed", entries.len(), failed);
        GridSearchResults { entries }
    }
}

/// Executed grid search
#[derive(Debug)]
pub struct GridSearchResults {
    entries: Vec<GridEntry>,
}

impl GridSearchResults {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[GridEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&GridEntry> {
        self.entries.get(index)
    }

    /// Result at `index`, if that slot succeeded
    pub fn result(&self, index: usize) -> Option<&GridResult> {
        self.get(index).and_then(GridEntry::result)
    }

    pub fn successful(&self) -> impl Iterator<Item = (usize, &GridResult)> {
        self.entries.iter().filter_map(|e| e.result().map(|r| (e.index, r)))
    }

    pub fn failures(&self) -> Vec<&GridEntry> {
        self.entries.iter().filter(|e| e.outcome.is_err()).collect()
    }

    /// Index of the best successful result; the earliest wins a tie
    pub fn rank_best(&self, criterion: RankCriterion) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, result) in self.successful() {
            let value = result.metrics.value(criterion);
            let better = match best {
                None => true,
                Some((_, current)) if criterion.maximizes() => value > current,
                Some((_, current)) => value < current,
            };
            if better {
                best = Some((index, value));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Up to `n` successful indices, best first; ties keep enumeration order
    pub fn rank_top(&self, criterion: RankCriterion, n: usize) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = self
            .successful()
            .map(|(index, r)| (index, r.metrics.value(criterion)))
            .collect();
        if criterion.maximizes() {
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        } else {
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
        ranked.into_iter().take(n).map(|(index, _)| index).collect()
    }

    pub fn best_by_criterion(&self) -> Vec<(RankCriterion, Option<usize>)> {
        RankCriterion::ALL.into_iter().map(|c| (c, self.rank_best(c))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PolicyAxis;
    use crate::loan::{ExpenseDefinition, PolicyKind};
    use chrono::NaiveDate;

    fn base() -> LoanParameters {
        LoanParameters::with_term_years(232_741.0, 30, 1.9, 0.0, 1, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).unwrap()
    }

    fn expenses() -> ExpenseSet {
        ExpenseSet::from_definitions([ExpenseDefinition::monthly("Community", 50.0, 0.03).unwrap()]).unwrap()
    }

    fn search(dimensions: GridDimensions) -> GridSearch {
        GridSearch::configure(base(), expenses(), dimensions)
    }

    #[test]
    fn test_default_grid_runs_every_combination() {
        let results = search(GridDimensions::default()).execute(None);
        assert_eq!(results.len(), 18);
        assert!(results.failures().is_empty());
        for (i, entry) in results.entries().iter().enumerate() {
            assert_eq!(entry.index, i);
        }
    }

    #[test]
    fn test_cap_returns_deterministic_prefix() {
        let dims = GridDimensions::default();
        let all = dims.combinations();
        let results = search(dims).execute(Some(5));

        assert_eq!(results.len(), 5);
        for (entry, combination) in results.entries().iter().zip(&all) {
            assert_eq!(&entry.combination, combination);
        }

        // A cap above the count changes nothing
        assert_eq!(search(GridDimensions::default()).execute(Some(1_000)).len(), 18);
        assert!(search(GridDimensions::default()).execute(Some(0)).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dims = GridDimensions {
            lump_sums: vec![0.0, 20_000.0],
            ..GridDimensions::default()
        };
        let parallel = search(dims.clone()).execute(None);
        let sequential = search(dims).execute_sequential(None);

        assert_eq!(parallel.len(), sequential.len());
        for (a, b) in parallel.entries().iter().zip(sequential.entries()) {
            assert_eq!(a.combination, b.combination);
            assert_eq!(a.result().unwrap().metrics, b.result().unwrap().metrics);
            assert_eq!(a.result().unwrap().strategy, b.result().unwrap().strategy);
        }
    }

    #[test]
    fn test_failed_slot_does_not_abort_siblings() {
        let dims = GridDimensions {
            lump_sums: vec![0.0, 300_000.0],
            policies: vec![PolicyAxis::new(PolicyKind::FixedAmount, [1_000.0])],
            active_years: vec![5, 40],
        };
        let results = search(dims).execute(None);

        assert_eq!(results.len(), 4);
        // Slot 1 asks for 40 active years, slots 2 and 3 for a lump sum above the principal
        assert!(results.result(0).is_some());
        let failed: Vec<usize> = results.failures().iter().map(|e| e.index).collect();
        assert_eq!(failed, vec![1, 2, 3]);
        assert!(results.failures().iter().all(|e| e.error().unwrap().is_validation()));

        for criterion in RankCriterion::ALL {
            assert_eq!(results.rank_best(criterion), Some(0));
        }
    }

    #[test]
    fn test_rank_best_dominates() {
        let results = search(GridDimensions::default()).execute(None);

        for (criterion, best) in results.best_by_criterion() {
            let best = best.unwrap();
            assert!(best < results.len());
            let best_value = results.result(best).unwrap().metrics.value(criterion);
            for (index, result) in results.successful() {
                let value = result.metrics.value(criterion);
                if criterion.maximizes() {
                    assert!(best_value >= value, "{} at {} beats {}", criterion, index, best);
                } else {
                    assert!(best_value <= value, "{} at {} beats {}", criterion, index, best);
                }
                if value == best_value {
                    assert!(best <= index);
                }
            }
        }
    }

    #[test]
    fn test_rank_top_is_sorted_and_bounded() {
        let results = search(GridDimensions::default()).execute(None);
        let top = results.rank_top(RankCriterion::SavingsTotal, 5);

        assert_eq!(top.len(), 5);
        assert_eq!(top[0], results.rank_best(RankCriterion::SavingsTotal).unwrap());
        let values: Vec<f64> = top.iter().map(|&i| results.result(i).unwrap().metrics.savings_total).collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));

        let lowest = results.rank_top(RankCriterion::FinalInstallment, 100);
        assert_eq!(lowest.len(), 18);
        assert_eq!(lowest[0], results.rank_best(RankCriterion::FinalInstallment).unwrap());
    }

    #[test]
    fn test_ties_resolve_to_earliest_index() {
        // Identical combinations produce identical metrics
        let dims = GridDimensions {
            lump_sums: vec![0.0, 0.0],
            policies: vec![PolicyAxis::new(PolicyKind::FixedAmount, [1_500.0])],
            active_years: vec![10],
        };
        let results = search(dims).execute(None);
        for criterion in RankCriterion::ALL {
            assert_eq!(results.rank_best(criterion), Some(0));
            assert_eq!(results.rank_top(criterion, 2), vec![0, 1]);
        }
    }

    #[test]
    fn test_empty_grid() {
        let dims = GridDimensions { lump_sums: vec![], ..GridDimensions::default() };
        let results = search(dims).execute(None);
        assert!(results.is_empty());
        assert_eq!(results.rank_best(RankCriterion::SavingsTotal), None);
        assert!(results.rank_top(RankCriterion::SavingsTotal, 3).is_empty());
    }
}
