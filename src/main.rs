//! Agency Planner CLI
//!
//! Runs the three-scenario plan and prints a comparison. Parameters come from
//! an optional JSON file, then environment overrides, then command-line flags:
//!   PROJECTION_MONTHS, TARGET_RETENTION_RATE, ADDITIONAL_LEAD_SPEND

use agency_planner::params::load_parameters;
use agency_planner::{plan, PlanResult, Scenario, SimulationParameters};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "agency_planner", version, about = "Insurance agency growth and cash-flow planner")]
struct Cli {
    /// JSON parameter bundle (missing fields take defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Projection horizon in months
    #[arg(long)]
    months: Option<u32>,

    /// Print the full plan as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write every scenario's month records to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    generated_at: DateTime<Utc>,
    parameters: &'a SimulationParameters,
    plan: &'a PlanResult,
}

#[derive(Serialize)]
struct CsvRow {
    scenario: &'static str,
    month: u32,
    policies: f64,
    customers: f64,
    leads: f64,
    new_policies: f64,
    policies_lost: f64,
    revenue: f64,
    total_costs: f64,
    cash_flow: f64,
    cumulative_cash: f64,
    policies_per_customer: f64,
    monthly_retention: f64,
    capacity_utilization: f64,
    service_degraded: bool,
    ebitda_margin: f64,
}

fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

fn resolve_parameters(cli: &Cli) -> Result<SimulationParameters> {
    let mut params = match &cli.params {
        Some(path) => load_parameters(path)
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => SimulationParameters::default_agency(),
    };

    if let Some(months) = env_override("PROJECTION_MONTHS") {
        params.projection_months = months;
    }
    if let Some(rate) = env_override("TARGET_RETENTION_RATE") {
        params.target_retention_rate = rate;
    }
    if let Some(spend) = env_override("ADDITIONAL_LEAD_SPEND") {
        params.additional_lead_spend = spend;
    }
    if let Some(months) = cli.months {
        params.projection_months = months;
    }

    Ok(params)
}

fn write_csv(path: &Path, result: &PlanResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for projection in &result.scenarios {
        for record in &projection.records {
            writer.serialize(CsvRow {
                scenario: projection.scenario.label(),
                month: record.month,
                policies: record.policies,
                customers: record.customers,
                leads: record.leads,
                new_policies: record.new_policies,
                policies_lost: record.policies_lost,
                revenue: record.revenue,
                total_costs: record.total_costs,
                cash_flow: record.cash_flow,
                cumulative_cash: record.cumulative_cash,
                policies_per_customer: record.policies_per_customer,
                monthly_retention: record.monthly_retention,
                capacity_utilization: record.capacity_utilization,
                service_degraded: record.service_degraded,
                ebitda_margin: record.ebitda_margin,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn print_table(params: &SimulationParameters, result: &PlanResult) {
    println!("Agency Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!(
        "Starting book: {:.0} policies, {:.0} customers, {:.1} FTE",
        params.current_policies,
        params.current_customers,
        params.total_fte()
    );
    println!("Horizon: {} months\n", params.projection_months);

    println!(
        "{:<13} {:>10} {:>10} {:>9} {:>8} {:>10} {:>9} {:>8} {:>10}",
        "Scenario", "Policies", "Customers", "ROI %", "Payback", "BreakEven", "CAC", "LTV:CAC", "EBITDA %"
    );
    println!("{}", "-".repeat(95));
    for projection in &result.scenarios {
        let s = &projection.summary;
        let break_even = s
            .break_even_month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<13} {:>10.0} {:>10.0} {:>9.1} {:>8.0} {:>10} {:>9.2} {:>8.2} {:>10.1}",
            projection.scenario.label(),
            s.final_policies,
            s.final_customers,
            s.roi,
            s.payback_months,
            break_even,
            s.cac,
            s.ltv_cac_ratio,
            s.ebitda_margin,
        );
    }

    let b = &result.benchmarks;
    println!("\nBenchmarks ({} plan):", Scenario::Moderate.label());
    println!("  Rule of 20:        {:.1} ({})", b.rule_of_20_score, b.rule_of_20_rating);
    println!("  Organic growth:    {:.1}%", b.organic_growth);
    println!("  EBITDA margin:     {:.1}% ({})", b.ebitda_margin, b.ebitda_status);
    println!("  LTV:CAC:           {:.2} ({})", b.ltv_cac_ratio, b.ltv_cac_status);
    println!(
        "  Revenue/employee:  ${:.0} ({})",
        b.revenue_per_employee, b.revenue_per_employee_rating
    );
    println!(
        "  Policies/customer: {:.2} ({})",
        b.policies_per_customer, b.policies_per_customer_status
    );
    println!("  Retention:         {:.1}%", b.retention_rate);
    println!("  Marketing spend:   {:.1}% of revenue", b.marketing_spend_pct);
    println!("  Tech spend:        {:.1}% of revenue", b.tech_spend_pct);
    println!("  Staffing ratio:    {:.2} support per producer", b.staffing_ratio);
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let params = resolve_parameters(&cli)?;
    let result = plan(&params).context("invalid planning parameters")?;

    if let Some(path) = &cli.csv {
        write_csv(path, &result)?;
        if !cli.json {
            println!("Month records written to: {}\n", path.display());
        }
    }

    if cli.json {
        let report = PlanReport {
            generated_at: Utc::now(),
            parameters: &params,
            plan: &result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&params, &result);
    }

    Ok(())
}
