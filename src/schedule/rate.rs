//! French amortization installment formula
//!
//! Used by the schedule builder for the initial installment and every
//! re-amortization after an extra payment.

/// Denominators below this magnitude are treated as numerically degenerate
pub const DEGENERATE_DENOMINATOR: f64 = 1e-10;

/// Branch taken by [`installment_with_method`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentMethod {
    /// Rate is exactly zero: balance spread evenly
    ZeroRate,
    /// Closed-form annuity formula
    French,
    /// `(1+r)^n - 1` cancelled out to (nearly) zero; the linear formula is used instead
    DegenerateFallback,
}

/// Installment that repays `balance` over `remaining_months` at `monthly_rate`
///
/// # Arguments
/// * `balance` - Outstanding balance (>= 0)
/// * `monthly_rate` - Monthly rate as a fraction (>= 0)
/// * `remaining_months` - Months left on the term (>= 1)
pub fn monthly_installment(balance: f64, monthly_rate: f64, remaining_months: u32) -> f64 {
    installment_with_method(balance, monthly_rate, remaining_months).0
}

/// Same as [`monthly_installment`], also reporting which branch produced the amount
pub fn installment_with_method(balance: f64, monthly_rate: f64, remaining_months: u32) -> (f64, InstallmentMethod) {
    let n = remaining_months.max(1);
    let linear = balance / n as f64;

    if monthly_rate == 0.0 {
        return (linear, InstallmentMethod::ZeroRate);
    }

    let growth = (1.0 + monthly_rate).powi(n as i32);
    let denominator = growth - 1.0;

    if denominator.abs() < DEGENERATE_DENOMINATOR {
        log::trace!(
            "Degenerate annuity denominator {:e} (rate {:e}, {} months), using linear installment",
            denominator, monthly_rate, n
        );
        return (linear, InstallmentMethod::DegenerateFallback);
    }

    (balance * monthly_rate * growth / denominator, InstallmentMethod::French)
}
