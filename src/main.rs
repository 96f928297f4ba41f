//! Mortgage strategy simulator CLI
//!
//! Simulates one loan with one extra-payment policy, prints the savings against the
//! standard schedule and writes the month-by-month expense schedule to CSV.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use mortgage_strategy::loan::load_expenses;
use mortgage_strategy::overlay::ExpenseSchedule;
use mortgage_strategy::savings::{ActivePeriodAssessment, ExtraPaymentCheck, SavingsLevel};
use mortgage_strategy::{
    ExpenseSet, ExtraPaymentPolicy, InterestDistribution, LoanParameters, PolicyKind, SimulationContext,
};

#[derive(Parser, Debug)]
#[command(name = "mortgage_sim")]
#[command(about = "Simulate semiannual extra payments on a fixed-rate mortgage")]
struct Args {
    /// Amount borrowed
    #[arg(long, default_value_t = 232_741.0)]
    principal: f64,

    /// Term in years
    #[arg(long, default_value_t = 30)]
    years: u32,

    /// Annual interest rate in percent
    #[arg(long, default_value_t = 1.90)]
    rate: f64,

    /// Principal paid up front at signing
    #[arg(long, default_value_t = 0.0)]
    lump_sum: f64,

    /// installment_multiple or fixed_amount
    #[arg(long, default_value = "installment_multiple")]
    kind: PolicyKind,

    /// Installment multiple or fixed amount of each extra payment
    #[arg(long, default_value_t = 2.0)]
    value: f64,

    /// Years during which extra payments are made
    #[arg(long, default_value_t = 10)]
    active_years: u32,

    /// Signing date (YYYY-MM-DD)
    #[arg(long, default_value = "2025-06-01")]
    start_date: NaiveDate,

    /// Day of the month installments are due (1-28)
    #[arg(long, default_value_t = 1)]
    payment_day: u32,

    /// CSV with recurring expenses (name,amount,annual_growth_rate,frequency)
    #[arg(long)]
    expenses: Option<PathBuf>,

    /// Where to write the month-by-month schedule
    #[arg(short, long, default_value = "expense_schedule.csv")]
    output: PathBuf,

    /// Print the savings summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let loan = LoanParameters::with_term_years(
        args.principal,
        args.years,
        args.rate,
        args.lump_sum,
        args.payment_day,
        args.start_date,
    )
    .context("invalid loan parameters")?;
    let policy = ExtraPaymentPolicy::for_loan(args.kind, args.value, args.active_years, &loan)
        .context("invalid extra-payment policy")?;
    let expenses = match &args.expenses {
        Some(path) => load_expenses(path).with_context(|| format!("loading expenses from {}", path.display()))?,
        None => ExpenseSet::new(),
    };

    let context = SimulationContext::simulate(loan, policy, expenses)?;
    let savings = context.savings()?;

    write_schedule_csv(&args.output, context.expense_schedule()?)
        .with_context(|| format!("writing {}", args.output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(savings)?);
        return Ok(());
    }

    let loan = context.loan();
    println!("Mortgage Strategy Simulator");
    println!("===========================\n");
    println!("Loan:");
    println!("  Principal:        {:>12.2}", loan.principal());
    println!("  Initial lump sum: {:>12.2}", loan.initial_lump_sum());
    println!("  Term:             {:>12} months", loan.term_months());
    println!("  Annual rate:      {:>11.2}%", loan.annual_rate());
    println!("  Policy:           {} {} for {} years", policy.kind(), policy.value(), policy.active_years());

    let standard = context.standard_schedule()?;
    let strategy = context.strategy_schedule()?;
    println!("\nInstallments:");
    println!("  Standard:            {:>10.2}", standard.summary().first_installment);
    println!("  Strategy (initial):  {:>10.2}", strategy.summary().first_installment);

    let extras: Vec<_> = strategy.extra_payments().take(5).collect();
    if !extras.is_empty() {
        println!("\nFirst extra payments:");
        for row in &extras {
            println!(
                "  Month {:>3} ({}): {:>10.2}, installment afterwards {:>8.2}",
                row.month, row.date, row.extra_principal, row.recalculated_installment
            );
        }
        if let Some(check) = ExtraPaymentCheck::from_schedule(strategy, &policy, 5) {
            if check.capped {
                println!("  Note: realized {:.2} against configured {:.2}, capped by the balance", check.realized, check.configured);
            }
        }
    }

    println!("\nSavings:");
    println!("  Interest (standard):  {:>12.2}", savings.total_interest_standard);
    println!("  Interest (strategy):  {:>12.2}", savings.total_interest_strategy);
    println!("  Payments (standard):  {:>12.2}", savings.total_payments_standard);
    println!("  Payments (strategy):  {:>12.2}", savings.total_payments_strategy);
    println!("  Absolute savings:     {:>12.2}", savings.absolute_savings);
    println!("  Percent savings:      {:>11.2}%", savings.percent_savings);
    println!("  Interest share in active period: {:.2}%", savings.interest_share_in_active_period);
    println!("  Estimated finish:     {}", savings.estimated_finish_date);
    println!(
        "  Average first-year provision: {:.2}",
        context.expense_schedule()?.average_first_year_provision()
    );

    let distribution = InterestDistribution::from_schedule(standard, policy.active_years())?;
    println!("\nInterest concentration:");
    if let Some(year) = distribution.year_50 {
        println!("  50% of interest paid by {}", year);
    }
    if let Some(year) = distribution.year_80 {
        println!("  80% of interest paid by {}", year);
    }
    match distribution.assessment {
        ActivePeriodAssessment::HalfNotReached => println!("  No interest to concentrate on"),
        ActivePeriodAssessment::Extend { until_year } => {
            println!("  Consider extending extra payments through {}", until_year)
        }
        ActivePeriodAssessment::Shorten { to_year } => {
            println!("  Extra payments after {} have a smaller effect", to_year)
        }
        ActivePeriodAssessment::Adequate => println!("  The active period covers the interest-heavy years"),
        ActivePeriodAssessment::Introduce { years } => {
            println!("  Extra payments during the first {} years would have the most effect", years)
        }
    }

    println!(
        "\nConclusion: {} savings ({:.2}%)",
        SavingsLevel::from_percent(savings.percent_savings).as_str(),
        savings.percent_savings
    );
    println!("Schedule written to {}", args.output.display());

    Ok(())
}

fn write_schedule_csv(path: &Path, schedule: &ExpenseSchedule) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = [
        "month", "date", "installment", "interest", "principal", "extra_principal",
        "balance", "recalculated_installment",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(schedule.names.iter().cloned());
    header.extend(
        ["additional_expenses", "total_monthly_expense", "amortization_provision", "total_provision"]
            .iter()
            .map(|s| s.to_string()),
    );
    writer.write_record(&header)?;

    for row in &schedule.rows {
        let s = &row.schedule;
        let mut record = vec![
            s.month.to_string(),
            s.date.to_string(),
            format!("{:.2}", s.installment),
            format!("{:.2}", s.interest_portion),
            format!("{:.2}", s.principal_portion),
            format!("{:.2}", s.extra_principal),
            format!("{:.2}", s.outstanding_balance),
            format!("{:.2}", s.recalculated_installment),
        ];
        record.extend(row.expenses.iter().map(|e| format!("{:.2}", e)));
        record.push(format!("{:.2}", row.additional_expenses));
        record.push(format!("{:.2}", row.total_monthly_expense));
        record.push(format!("{:.2}", row.amortization_provision));
        record.push(format!("{:.2}", row.total_provision));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
