//! Run the strategy grid search
//!
//! Loads a grid configuration (or the defaults), evaluates every combination in parallel,
//! prints the best strategies per criterion and writes one metrics row per combination.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use mortgage_strategy::grid::{GridCombination, GridMetrics, GridSearchResults, RankCriterion};
use mortgage_strategy::savings::SavingsLevel;
use mortgage_strategy::GridConfig;

#[derive(Parser, Debug)]
#[command(name = "run_grid")]
#[command(about = "Evaluate a grid of extra-payment strategies and rank them")]
struct Args {
    /// JSON grid configuration; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate only the first N combinations (overrides the configuration)
    #[arg(long)]
    max_combinations: Option<usize>,

    /// Strategies listed per criterion
    #[arg(long, default_value_t = 3)]
    top: usize,

    /// Metrics CSV, one row per combination
    #[arg(short, long, default_value = "grid_results.csv")]
    output: PathBuf,

    /// Print the ranking as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// One ranked entry in the JSON report
#[derive(Serialize)]
struct RankedEntry {
    index: usize,
    combination: GridCombination,
    metrics: GridMetrics,
}

#[derive(Serialize)]
struct CriterionReport {
    criterion: RankCriterion,
    top: Vec<RankedEntry>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GridConfig::from_json_path(path)
            .with_context(|| format!("loading grid configuration from {}", path.display()))?,
        None => GridConfig::default(),
    };
    let cap = args.max_combinations.or(config.max_combinations);

    let search = config.into_search().context("invalid grid configuration")?;
    let total = search.combination_count();
    if !args.json {
        println!("Evaluating {} combinations{}...", total,
            cap.filter(|&c| c < total).map(|c| format!(" (first {})", c)).unwrap_or_default());
    }

    let start = Instant::now();
    let results = search.execute(cap);
    let elapsed = start.elapsed();

    write_metrics_csv(&args.output, &results).with_context(|| format!("writing {}", args.output.display()))?;

    let reports: Vec<CriterionReport> = RankCriterion::ALL
        .into_iter()
        .map(|criterion| CriterionReport {
            criterion,
            top: results
                .rank_top(criterion, args.top)
                .into_iter()
                .filter_map(|index| {
                    results.result(index).map(|r| RankedEntry { index, combination: r.combination, metrics: r.metrics })
                })
                .collect(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("Completed in {:?}: {} succeeded, {} failed", elapsed,
        results.len() - results.failures().len(), results.failures().len());
    for entry in results.failures() {
        if let Some(err) = entry.error() {
            println!("  #{} {}: {}", entry.index, entry.combination.label(), err);
        }
    }

    for report in &reports {
        let direction = if report.criterion.maximizes() { "highest" } else { "lowest" };
        println!("\nBest by {} ({}):", report.criterion, direction);
        for (rank, entry) in report.top.iter().enumerate() {
            println!(
                "  {}. #{:<3} {:<45} {:>12.2}",
                rank + 1,
                entry.index,
                entry.combination.label(),
                entry.metrics.value(report.criterion)
            );
        }
    }

    if let Some(best) = results.rank_best(RankCriterion::SavingsTotal).and_then(|i| results.result(i)) {
        println!(
            "\nConclusion: {} gives {} savings of {:.2} ({:.2}%)",
            best.combination.label(),
            SavingsLevel::from_percent(best.metrics.savings_percent).as_str(),
            best.metrics.savings_total,
            best.metrics.savings_percent
        );
    }
    println!("Metrics written to {}", args.output.display());

    Ok(())
}

#[derive(Serialize)]
struct MetricsRecord<'a> {
    index: usize,
    initial_lump_sum: f64,
    policy_kind: &'a str,
    policy_value: f64,
    active_years: u32,
    status: &'a str,
    savings_total: Option<f64>,
    savings_percent: Option<f64>,
    final_installment: Option<f64>,
    average_first_year_provision: Option<f64>,
    savings_to_provision_ratio: Option<f64>,
    error: Option<String>,
}

fn write_metrics_csv(path: &Path, results: &GridSearchResults) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for entry in results.entries() {
        let c = &entry.combination;
        let metrics = entry.result().map(|r| r.metrics);
        writer.serialize(MetricsRecord {
            index: entry.index,
            initial_lump_sum: c.initial_lump_sum,
            policy_kind: c.policy_kind.as_str(),
            policy_value: c.policy_value,
            active_years: c.active_years,
            status: if metrics.is_some() { "ok" } else { "failed" },
            savings_total: metrics.map(|m| m.savings_total),
            savings_percent: metrics.map(|m| m.savings_percent),
            final_installment: metrics.map(|m| m.final_installment),
            average_first_year_provision: metrics.map(|m| m.average_first_year_provision),
            savings_to_provision_ratio: metrics.map(|m| m.savings_to_provision_ratio),
            error: entry.error().map(|e| e.to_string()),
        })?;
    }

    writer.flush()?;
    Ok(())
}
