//! Industry benchmark classification for the recommended (Moderate) plan
//!
//! Threshold tables are fixed agency-industry benchmarks. Each table is
//! ordered from the highest cutoff down; the first cutoff met wins.

use serde::{Deserialize, Serialize};

use crate::assumptions::rates::monthly_to_annual;
use crate::params::SimulationParameters;
use crate::projection::MonthRecord;
use crate::scenario::ScenarioSummary;

/// Weight of EBITDA margin in the Rule of 20 score
pub const RULE_OF_20_MARGIN_WEIGHT: f64 = 0.5;

pub const RULE_OF_20_RATINGS: [(f64, &str); 3] = [
    (25.0, "Top Performer"),
    (20.0, "Healthy"),
    (15.0, "Needs Improvement"),
];
pub const RULE_OF_20_FLOOR: &str = "At Risk";

pub const EBITDA_STATUSES: [(f64, &str); 3] = [
    (30.0, "Excellent"),
    (25.0, "Target Range"),
    (20.0, "Acceptable"),
];
pub const EBITDA_FLOOR: &str = "Below Target";

/// A very high ratio is a warning: growth is underfunded
pub const LTV_CAC_STATUSES: [(f64, &str); 3] = [
    (5.0, "Underinvested in Growth"),
    (4.0, "Great"),
    (3.0, "Good"),
];
pub const LTV_CAC_FLOOR: &str = "Needs Improvement";

pub const RPE_RATINGS: [(f64, &str); 3] = [
    (300_000.0, "Excellent"),
    (200_000.0, "Good"),
    (150_000.0, "Acceptable"),
];
pub const RPE_FLOOR: &str = "Below Target";

pub const PPC_STATUSES: [(f64, &str); 2] = [(1.8, "Optimal"), (1.5, "Bundled")];
pub const PPC_FLOOR: &str = "Monoline";

/// Benchmark view of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Annualized policy growth over the horizon, in %
    pub organic_growth: f64,
    pub rule_of_20_score: f64,
    pub rule_of_20_rating: String,
    pub ebitda_margin: f64,
    pub ebitda_status: String,
    pub ltv_cac_ratio: f64,
    pub ltv_cac_status: String,
    pub revenue_per_employee: f64,
    pub revenue_per_employee_rating: String,
    pub policies_per_customer: f64,
    pub policies_per_customer_status: String,
    /// Final month's retention, annualized, in %
    pub retention_rate: f64,
    pub marketing_spend_pct: f64,
    pub tech_spend_pct: f64,
    /// Support staff (service + admin) per producer
    pub staffing_ratio: f64,
}

/// Look a value up in a descending threshold table
pub fn classify(value: f64, table: &[(f64, &'static str)], floor: &'static str) -> &'static str {
    table
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, label)| *label)
        .unwrap_or(floor)
}

pub fn rule_of_20_score(organic_growth: f64, ebitda_margin: f64) -> f64 {
    organic_growth + RULE_OF_20_MARGIN_WEIGHT * ebitda_margin
}

pub fn rule_of_20_rating(score: f64) -> &'static str {
    classify(score, &RULE_OF_20_RATINGS, RULE_OF_20_FLOOR)
}

pub fn ebitda_status(margin: f64) -> &'static str {
    classify(margin, &EBITDA_STATUSES, EBITDA_FLOOR)
}

pub fn ltv_cac_status(ratio: f64) -> &'static str {
    classify(ratio, &LTV_CAC_STATUSES, LTV_CAC_FLOOR)
}

pub fn revenue_per_employee_rating(rpe: f64) -> &'static str {
    classify(rpe, &RPE_RATINGS, RPE_FLOOR)
}

pub fn policies_per_customer_status(ppc: f64) -> &'static str {
    classify(ppc, &PPC_STATUSES, PPC_FLOOR)
}

/// Annualized policy growth in %, 0 when there is no starting book or no horizon
pub fn organic_growth(start_policies: f64, final_policies: f64, months: u32) -> f64 {
    if start_policies <= 0.0 || months == 0 {
        return 0.0;
    }
    (final_policies - start_policies) / start_policies * (12.0 / months as f64) * 100.0
}

fn pct_of(amount: f64, base: f64) -> f64 {
    if base > 0.0 {
        amount / base * 100.0
    } else {
        0.0
    }
}

/// Benchmark a scenario from its summary and final month
pub fn evaluate(
    summary: &ScenarioSummary,
    final_record: &MonthRecord,
    params: &SimulationParameters,
) -> BenchmarkReport {
    let growth = organic_growth(params.current_policies, summary.final_policies, params.projection_months);
    let score = rule_of_20_score(growth, summary.ebitda_margin);

    let fte = params.total_fte();
    let revenue_per_employee = if fte > 0.0 {
        final_record.revenue * 12.0 / fte
    } else {
        0.0
    };

    let staffing_ratio = if params.producer_heads() > 0.0 {
        (params.staff.service + params.staff.admin) / params.producer_heads()
    } else {
        0.0
    };

    BenchmarkReport {
        organic_growth: growth,
        rule_of_20_score: score,
        rule_of_20_rating: rule_of_20_rating(score).to_string(),
        ebitda_margin: summary.ebitda_margin,
        ebitda_status: ebitda_status(summary.ebitda_margin).to_string(),
        ltv_cac_ratio: summary.ltv_cac_ratio,
        ltv_cac_status: ltv_cac_status(summary.ltv_cac_ratio).to_string(),
        revenue_per_employee,
        revenue_per_employee_rating: revenue_per_employee_rating(revenue_per_employee).to_string(),
        policies_per_customer: final_record.policies_per_customer,
        policies_per_customer_status: policies_per_customer_status(final_record.policies_per_customer)
            .to_string(),
        retention_rate: monthly_to_annual(final_record.monthly_retention) * 100.0,
        marketing_spend_pct: pct_of(final_record.marketing_spend, final_record.revenue),
        tech_spend_pct: pct_of(final_record.technology_spend, final_record.revenue),
        staffing_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Scenario, ScenarioRunner};
    use approx::assert_relative_eq;

    #[test]
    fn test_rule_of_20_example() {
        let score = rule_of_20_score(20.0, 30.0);
        assert_eq!(score, 35.0);
        assert_eq!(rule_of_20_rating(score), "Top Performer");
    }

    #[test]
    fn test_rule_of_20_cutoffs() {
        assert_eq!(rule_of_20_rating(25.0), "Top Performer");
        assert_eq!(rule_of_20_rating(24.99), "Healthy");
        assert_eq!(rule_of_20_rating(20.0), "Healthy");
        assert_eq!(rule_of_20_rating(15.0), "Needs Improvement");
        assert_eq!(rule_of_20_rating(14.99), "At Risk");
        assert_eq!(rule_of_20_rating(-40.0), "At Risk");
    }

    #[test]
    fn test_ebitda_status_cutoffs() {
        assert_eq!(ebitda_status(31.0), "Excellent");
        assert_eq!(ebitda_status(30.0), "Excellent");
        assert_eq!(ebitda_status(27.0), "Target Range");
        assert_eq!(ebitda_status(20.0), "Acceptable");
        assert_eq!(ebitda_status(19.9), "Below Target");
    }

    #[test]
    fn test_high_ltv_cac_is_flagged_before_great() {
        assert_eq!(ltv_cac_status(8.0), "Underinvested in Growth");
        assert_eq!(ltv_cac_status(5.0), "Underinvested in Growth");
        assert_eq!(ltv_cac_status(4.5), "Great");
        assert_eq!(ltv_cac_status(3.0), "Good");
        assert_eq!(ltv_cac_status(2.9), "Needs Improvement");
        assert_eq!(ltv_cac_status(0.0), "Needs Improvement");
    }

    #[test]
    fn test_rpe_and_ppc_cutoffs() {
        assert_eq!(revenue_per_employee_rating(300_000.0), "Excellent");
        assert_eq!(revenue_per_employee_rating(250_000.0), "Good");
        assert_eq!(revenue_per_employee_rating(150_000.0), "Acceptable");
        assert_eq!(revenue_per_employee_rating(149_999.0), "Below Target");

        assert_eq!(policies_per_customer_status(2.0), "Optimal");
        assert_eq!(policies_per_customer_status(1.8), "Optimal");
        assert_eq!(policies_per_customer_status(1.6), "Bundled");
        assert_eq!(policies_per_customer_status(1.2), "Monoline");
    }

    #[test]
    fn test_organic_growth_annualized() {
        // +10% over 24 months is 5% a year
        assert_relative_eq!(organic_growth(1_000.0, 1_100.0, 24), 5.0, epsilon = 1e-12);
        assert_eq!(organic_growth(0.0, 100.0, 24), 0.0);
        assert_eq!(organic_growth(100.0, 200.0, 0), 0.0);
    }

    #[test]
    fn test_evaluate_moderate_plan() {
        let params = SimulationParameters::default_agency();
        let result = ScenarioRunner::new(params.clone()).run();
        let moderate = result.scenario(Scenario::Moderate);
        let last = moderate.records.last().unwrap();
        let report = &result.benchmarks;

        assert_eq!(report, &evaluate(&moderate.summary, last, &params));

        let growth = organic_growth(params.current_policies, moderate.summary.final_policies, 24);
        assert_relative_eq!(report.organic_growth, growth);
        assert_relative_eq!(report.rule_of_20_score, growth + 0.5 * moderate.summary.ebitda_margin);
        assert_eq!(report.rule_of_20_rating, rule_of_20_rating(report.rule_of_20_score));
        assert_relative_eq!(report.revenue_per_employee, last.revenue * 12.0 / 7.0, epsilon = 1e-9);
        assert_relative_eq!(report.staffing_ratio, 3.0 / 4.0);
        assert_relative_eq!(
            report.marketing_spend_pct,
            params.total_marketing_spend() / last.revenue * 100.0,
            epsilon = 1e-9
        );
        assert!(report.retention_rate > 0.0 && report.retention_rate < 100.0);
    }
}
