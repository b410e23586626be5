//! Sensitivity sweep over a CSV of parameter overrides
//!
//! Each override row is applied to the base bundle, validated, and planned in
//! parallel. Output is one CSV row per (label, scenario).

use agency_planner::params::{load_parameters, load_sweep, SweepOverride};
use agency_planner::{plan, PlanResult, PlannerError, SimulationParameters};
use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "sweep", about = "Run the plan for every row of an override table")]
struct Args {
    /// CSV of overrides: label,target_retention_rate,target_conversion_rate,additional_lead_spend,additional_staff,projection_months
    overrides: PathBuf,

    /// Base JSON parameter bundle (defaults if omitted)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Output CSV path
    #[arg(long, default_value = "sweep_output.csv")]
    output: PathBuf,
}

#[derive(Serialize)]
struct SweepRow<'a> {
    label: &'a str,
    scenario: &'static str,
    final_policies: f64,
    final_customers: f64,
    roi: f64,
    payback_months: f64,
    break_even_month: Option<u32>,
    cac: f64,
    ltv: f64,
    ltv_cac_ratio: f64,
    ebitda_margin: f64,
    rule_of_20_score: f64,
}

fn run_row(base: &SimulationParameters, row: &SweepOverride) -> Result<PlanResult, PlannerError> {
    let params = row.apply(base);
    plan(&params).map_err(|source| PlannerError::SweepRow {
        label: row.label.clone(),
        source: Box::new(source),
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let base = match &args.params {
        Some(path) => load_parameters(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => SimulationParameters::default_agency(),
    };
    let rows = load_sweep(&args.overrides)
        .with_context(|| format!("failed to load overrides from {}", args.overrides.display()))?;
    println!("Loaded {} sweep rows", rows.len());

    let results: Vec<Result<PlanResult, PlannerError>> = rows
        .par_iter()
        .map(|row| run_row(&base, row))
        .collect();

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let mut failures = 0;

    for (row, result) in rows.iter().zip(&results) {
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                log::warn!("{}", err);
                failures += 1;
                continue;
            }
        };

        for projection in &result.scenarios {
            let s = &projection.summary;
            writer.serialize(SweepRow {
                label: &row.label,
                scenario: projection.scenario.label(),
                final_policies: s.final_policies,
                final_customers: s.final_customers,
                roi: s.roi,
                payback_months: s.payback_months,
                break_even_month: s.break_even_month,
                cac: s.cac,
                ltv: s.ltv,
                ltv_cac_ratio: s.ltv_cac_ratio,
                ebitda_margin: s.ebitda_margin,
                rule_of_20_score: result.benchmarks.rule_of_20_score,
            })?;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} to {} ({} rows skipped) in {:?}",
        rows.len() - failures,
        args.output.display(),
        failures,
        start.elapsed()
    );
    Ok(())
}
