//! How standard interest is spread over the calendar years of a loan

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulatorError};
use crate::loan::{ExtraPaymentPolicy, PolicyKind};
use crate::schedule::Schedule;

/// Years an active period may run past the 50% point before it is considered long
const ACTIVE_PERIOD_SLACK_YEARS: u32 = 2;

/// Interest paid in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyInterest {
    pub year: i32,
    pub interest: f64,
    pub percent: f64,
    pub cumulative_percent: f64,
}

/// Recommendation on the length of the extra-payment period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivePeriodAssessment {
    /// Half of the interest is never reached (no interest at all)
    HalfNotReached,
    /// Ends before half of the interest is paid; extend it through `until_year`
    Extend { until_year: i32 },
    /// Runs well past the 50% point; `to_year` is enough
    Shorten { to_year: i32 },
    Adequate,
    /// No active period; `years` would cover half of the interest
    Introduce { years: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestDistribution {
    pub years: Vec<YearlyInterest>,
    pub total_interest: f64,
    /// First calendar year in which cumulative interest reaches 50%
    pub year_50: Option<i32>,
    pub year_80: Option<i32>,
    /// Cumulative share at the end of the last active calendar year
    pub share_at_active_end: Option<f64>,
    pub assessment: ActivePeriodAssessment,
}

impl InterestDistribution {
    pub fn from_schedule(standard: &Schedule, active_years: u32) -> Result<Self> {
        if !standard.is_built() {
            return Err(SimulatorError::prerequisite(
                "interest distribution needs a built standard schedule",
            ));
        }

        let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
        for row in standard.payment_rows() {
            *by_year.entry(row.date.year()).or_insert(0.0) += row.interest_portion;
        }
        let total_interest: f64 = by_year.values().sum();

        let mut cumulative = 0.0;
        let years: Vec<YearlyInterest> = by_year
            .into_iter()
            .map(|(year, interest)| {
                let percent = if total_interest > 0.0 { interest / total_interest * 100.0 } else { 0.0 };
                cumulative += percent;
                YearlyInterest { year, interest, percent, cumulative_percent: cumulative }
            })
            .collect();

        let reached = |threshold: f64| {
            if total_interest <= 0.0 {
                return None;
            }
            years.iter().find(|y| y.cumulative_percent >= threshold).map(|y| y.year)
        };
        let year_50 = reached(50.0);
        let year_80 = reached(80.0);

        let first_year = years.first().map(|y| y.year);
        let share_at_active_end = match first_year {
            Some(first) if active_years > 0 => {
                let end_year = first + active_years as i32 - 1;
                years.iter().find(|y| y.year == end_year).map(|y| y.cumulative_percent)
            }
            _ => None,
        };

        let assessment = match (year_50, first_year) {
            (Some(y50), Some(first)) => assess(active_years, first, y50),
            _ => ActivePeriodAssessment::HalfNotReached,
        };

        log::debug!(
            "interest distribution over {} years: 50% in {:?}, 80% in {:?}",
            years.len(),
            year_50,
            year_80
        );

        Ok(Self { years, total_interest, year_50, year_80, share_at_active_end, assessment })
    }

    pub fn years_to_half(&self) -> Option<u32> {
        let first = self.years.first()?.year;
        self.year_50.map(|y| (y - first + 1) as u32)
    }
}

fn assess(active_years: u32, first_year: i32, year_50: i32) -> ActivePeriodAssessment {
    let years_to_half = (year_50 - first_year + 1) as u32;
    if active_years == 0 {
        ActivePeriodAssessment::Introduce { years: years_to_half }
    } else if active_years < years_to_half {
        ActivePeriodAssessment::Extend { until_year: year_50 }
    } else if active_years > years_to_half + ACTIVE_PERIOD_SLACK_YEARS {
        ActivePeriodAssessment::Shorten { to_year: year_50 }
    } else {
        ActivePeriodAssessment::Adequate
    }
}

/// Realized extra payments compared with what the policy asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentCheck {
    pub kind: PolicyKind,
    pub configured: f64,
    /// Mean amount for fixed payments, multiple of the installment for the first event otherwise
    pub realized: f64,
    pub events: usize,
    /// Realized amount fell short because the balance capped it
    pub capped: bool,
}

impl ExtraPaymentCheck {
    /// Tolerances for a shortfall: one currency unit, or a tenth of an installment
    const AMOUNT_TOLERANCE: f64 = 1.0;
    const MULTIPLE_TOLERANCE: f64 = 0.1;

    /// Inspect the first `n` extra payments; `None` when there are none
    pub fn from_schedule(schedule: &Schedule, policy: &ExtraPaymentPolicy, n: usize) -> Option<Self> {
        let first: Vec<_> = schedule.extra_payments().take(n).collect();
        if first.is_empty() {
            return None;
        }

        let configured = policy.value();
        let (realized, capped) = match policy.kind() {
            PolicyKind::FixedAmount => {
                let mean = first.iter().map(|r| r.extra_principal).sum::<f64>() / first.len() as f64;
                (mean, (mean - configured).abs() > Self::AMOUNT_TOLERANCE)
            }
            PolicyKind::InstallmentMultiple => {
                let event = first[0];
                // The installment in force is the one recorded on the previous row
                let in_force = schedule
                    .row(event.month as usize - 1)
                    .map(|r| r.recalculated_installment)
                    .unwrap_or(event.installment);
                let multiple = if in_force > 0.0 { event.extra_principal / in_force } else { 0.0 };
                (multiple, (multiple - configured).abs() > Self::MULTIPLE_TOLERANCE)
            }
        };

        Some(Self { kind: policy.kind(), configured, realized, events: first.len(), capped })
    }
}
