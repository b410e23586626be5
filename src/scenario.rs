//! Scenario runner: projects the fixed Conservative / Moderate / Aggressive set
//!
//! Each scenario gets its own engine and running state; the three runs share
//! nothing but the immutable parameter bundle, so they are projected in parallel.

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::rates::monthly_to_annual;
use crate::assumptions::Assumptions;
use crate::benchmarks::{evaluate, BenchmarkReport};
use crate::error::PlannerResult;
use crate::params::SimulationParameters;
use crate::projection::{MonthRecord, ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Longest customer lifetime credited to LTV
pub const MAX_LIFETIME_YEARS: f64 = 10.0;

/// The three planning scenarios, in their fixed reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Conservative,
    Moderate,
    Aggressive,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Conservative, Scenario::Moderate, Scenario::Aggressive];

    /// Position in [`Scenario::ALL`]; Moderate (1) is the recommended plan
    pub fn index(&self) -> usize {
        match self {
            Scenario::Conservative => 0,
            Scenario::Moderate => 1,
            Scenario::Aggressive => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Conservative => "Conservative",
            Scenario::Moderate => "Moderate",
            Scenario::Aggressive => "Aggressive",
        }
    }

    pub fn conversion_multiplier(&self) -> f64 {
        match self {
            Scenario::Conservative => 0.85,
            Scenario::Moderate => 1.0,
            Scenario::Aggressive => 1.15,
        }
    }

    pub fn retention_multiplier(&self) -> f64 {
        match self {
            Scenario::Conservative => 1.0,
            Scenario::Moderate => 1.0,
            Scenario::Aggressive => 1.02,
        }
    }

    /// Engine configuration for this scenario over `projection_months`
    pub fn config(&self, projection_months: u32) -> ProjectionConfig {
        ProjectionConfig {
            projection_months,
            conversion_multiplier: self.conversion_multiplier(),
            retention_multiplier: self.retention_multiplier(),
        }
    }
}

/// Scenario-level economics derived from its month records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario: Scenario,
    pub final_policies: f64,
    pub final_customers: f64,
    /// (revenue - cost) / cost, in %
    pub roi: f64,
    pub payback_months: f64,
    pub total_cost: f64,
    pub total_revenue: f64,
    /// Marketing spend only; CAC is measured on this basis, ROI on `total_cost`
    pub total_marketing: f64,
    pub total_new_customers: f64,
    pub break_even_month: Option<u32>,
    pub ltv: f64,
    pub cac: f64,
    pub ltv_cac_ratio: f64,
    pub policies_per_customer: f64,
    /// Final month's EBITDA margin (run-rate), in %
    pub ebitda_margin: f64,
}

impl ScenarioSummary {
    /// Derive the summary from a finished projection
    pub fn from_projection(
        scenario: Scenario,
        projection: &ProjectionResult,
        params: &SimulationParameters,
    ) -> Self {
        let totals = projection.totals();
        let months = params.projection_months;
        let final_record = projection.final_record().cloned().unwrap_or_else(|| MonthRecord::new(0));

        let cac = if totals.total_new_customers > 0.0 {
            totals.total_marketing / totals.total_new_customers
        } else {
            0.0
        };

        let ltv = final_record.policies_per_customer
            * params.product_premium()
            * params.payout_fraction()
            * lifetime_years(monthly_to_annual(final_record.monthly_retention));

        let ltv_cac_ratio = if cac > 0.0 { ltv / cac } else { 0.0 };

        let roi = if totals.total_cost > 0.0 {
            (totals.total_revenue - totals.total_cost) / totals.total_cost * 100.0
        } else {
            0.0
        };

        let payback_months = if totals.total_revenue > 0.0 && months > 0 {
            (totals.total_cost / (totals.total_revenue / months as f64)).round()
        } else {
            months as f64
        };

        Self {
            scenario,
            final_policies: final_record.policies,
            final_customers: final_record.customers,
            roi,
            payback_months,
            total_cost: totals.total_cost,
            total_revenue: totals.total_revenue,
            total_marketing: totals.total_marketing,
            total_new_customers: totals.total_new_customers,
            break_even_month: projection.break_even_month,
            ltv,
            cac,
            ltv_cac_ratio,
            policies_per_customer: final_record.policies_per_customer,
            ebitda_margin: final_record.ebitda_margin,
        }
    }
}

/// Expected customer lifetime implied by annual retention, capped
pub fn lifetime_years(annual_retention: f64) -> f64 {
    let churn = 1.0 - annual_retention;
    if churn <= 0.0 {
        return MAX_LIFETIME_YEARS;
    }
    (1.0 / churn).min(MAX_LIFETIME_YEARS)
}

/// Month records and summary for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub scenario: Scenario,
    pub records: Vec<MonthRecord>,
    pub summary: ScenarioSummary,
}

/// One month of the combined chart series: policy counts per scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedMonth {
    pub month: u32,
    pub conservative: f64,
    pub moderate: f64,
    pub aggressive: f64,
}

/// Everything a presentation layer needs from one planning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResult {
    /// In [`Scenario::ALL`] order
    pub scenarios: Vec<ScenarioProjection>,
    pub combined: Vec<CombinedMonth>,
    pub benchmarks: BenchmarkReport,
}

impl PlanResult {
    pub fn scenario(&self, scenario: Scenario) -> &ScenarioProjection {
        &self.scenarios[scenario.index()]
    }

    pub fn moderate(&self) -> &ScenarioProjection {
        self.scenario(Scenario::Moderate)
    }
}

/// Merge per-scenario records into one series keyed by month
pub fn combine_series(projections: &[ScenarioProjection]) -> Vec<CombinedMonth> {
    let policies_at = |scenario: Scenario, idx: usize| {
        projections
            .iter()
            .find(|p| p.scenario == scenario)
            .and_then(|p| p.records.get(idx))
            .map(|r| r.policies)
            .unwrap_or(0.0)
    };

    let months = projections.iter().map(|p| p.records.len()).max().unwrap_or(0);
    (0..months)
        .map(|idx| CombinedMonth {
            month: idx as u32,
            conservative: policies_at(Scenario::Conservative, idx),
            moderate: policies_at(Scenario::Moderate, idx),
            aggressive: policies_at(Scenario::Aggressive, idx),
        })
        .collect()
}

/// Runs the fixed scenario set against one parameter bundle
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    params: SimulationParameters,
    assumptions: Assumptions,
}

impl ScenarioRunner {
    /// Create a runner; the parameters are not validated here (see [`plan`])
    pub fn new(params: SimulationParameters) -> Self {
        let assumptions = Assumptions::from_params(&params);
        Self { params, assumptions }
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Project a single scenario
    pub fn run_scenario(&self, scenario: Scenario) -> ScenarioProjection {
        let config = scenario.config(self.params.projection_months);
        let engine = ProjectionEngine::new(self.assumptions.clone(), config);
        let projection = engine.project(&self.params);
        let summary = ScenarioSummary::from_projection(scenario, &projection, &self.params);

        info!(
            "{}: final policies {:.1}, ROI {:.1}%, break-even {:?}",
            scenario.label(),
            summary.final_policies,
            summary.roi,
            summary.break_even_month
        );

        ScenarioProjection {
            scenario,
            records: projection.records,
            summary,
        }
    }

    /// Project all three scenarios, merge the series and benchmark the Moderate plan
    pub fn run(&self) -> PlanResult {
        let scenarios: Vec<ScenarioProjection> = Scenario::ALL
            .par_iter()
            .map(|&scenario| self.run_scenario(scenario))
            .collect();

        let combined = combine_series(&scenarios);

        let moderate = &scenarios[Scenario::Moderate.index()];
        let final_record = moderate.records.last().cloned().unwrap_or_else(|| MonthRecord::new(0));
        let benchmarks = evaluate(&moderate.summary, &final_record, &self.params);

        PlanResult {
            scenarios,
            combined,
            benchmarks,
        }
    }
}

/// Validate the parameters and run the full plan
pub fn plan(params: &SimulationParameters) -> PlannerResult<PlanResult> {
    params.validate()?;
    Ok(ScenarioRunner::new(params.clone()).run())
}
