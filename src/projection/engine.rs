//! Core projection engine: month-by-month growth, churn and cash flow for one scenario

use log::{debug, warn};

use crate::assumptions::channels::{organic_referrals, spend_efficiency};
use crate::assumptions::rates::{
    annual_to_monthly, bundling_bonus, program_retention_boost, referral_policy_yield,
    target_policies_per_customer, team_ramp_factor, MAX_ANNUAL_RETENTION,
};
use crate::assumptions::{AcquisitionFactors, Assumptions};
use crate::params::SimulationParameters;
use super::cashflows::{MonthRecord, ProjectionResult};
use super::state::ProjectionState;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Number of months to project after month 0
    pub projection_months: u32,

    /// Scales conversions on every paid channel and the referral flywheel
    pub conversion_multiplier: f64,

    /// Scales the annual retention target (after program boosts)
    pub retention_multiplier: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            projection_months: 24,
            conversion_multiplier: 1.0,
            retention_multiplier: 1.0,
        }
    }
}

/// Intermediate values for one month, before they are snapshotted
#[derive(Debug, Clone, Copy)]
struct MonthFlows {
    strain: f64,
    leads: f64,
    new_customers: f64,
    new_policies: f64,
    customers_lost: f64,
    policies_lost: f64,
    monthly_retention: f64,
}

/// Main projection engine
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    /// Engine whose assumptions are derived from the same parameters it will project
    pub fn for_params(params: &SimulationParameters, config: ProjectionConfig) -> Self {
        Self::new(Assumptions::from_params(params), config)
    }

    /// Run the projection: month 0 is the starting book, then one record per month
    pub fn project(&self, params: &SimulationParameters) -> ProjectionResult {
        let mut result = ProjectionResult::new();
        let mut state = ProjectionState::from_params(params);
        let target_ppc = target_policies_per_customer(
            params.base_policies_per_customer(),
            params.features.cross_sell_program,
        );

        result.add_record(self.initial_record(params, &state, target_ppc));

        for month in 1..=self.config.projection_months {
            state.month = month;
            let record = self.calculate_month(params, &mut state, target_ppc);

            if month % 12 == 0 {
                debug!(
                    "month {}: policies={:.1} customers={:.1} cumulative_cash={:.2}",
                    month, record.policies, record.customers, record.cumulative_cash
                );
            }
            result.add_record(record);
        }

        result.break_even_month = state.break_even_month;
        result
    }

    fn initial_record(
        &self,
        params: &SimulationParameters,
        state: &ProjectionState,
        target_ppc: f64,
    ) -> MonthRecord {
        let capacity = &self.assumptions.capacity;
        let strain = capacity.strain(state.policies);
        let live_ppc = state.policies_per_customer(target_ppc);

        let mut record = MonthRecord::new(0);
        record.policies = state.policies;
        record.customers = state.customers;
        record.policies_per_customer = live_ppc;
        record.monthly_retention = annual_to_monthly(self.annual_retention(params, target_ppc, strain));
        record.capacity_strain = strain;
        record.capacity_utilization = capacity.utilization(state.policies);
        record.service_degraded = capacity.is_degraded(state.policies);
        record.max_capacity = capacity.max_capacity();
        record
    }

    /// Advance the state by one month and snapshot it
    fn calculate_month(
        &self,
        params: &SimulationParameters,
        state: &mut ProjectionState,
        target_ppc: f64,
    ) -> MonthRecord {
        let flows = self.calculate_flows(params, state, target_ppc);
        let capacity = &self.assumptions.capacity;

        // Update the book
        state.customers += flows.new_customers - flows.customers_lost;
        state.policies += flows.new_policies - flows.policies_lost;

        // Money
        let revenue = state.policies * (params.product_premium() / 12.0) * params.payout_fraction();
        let costs = self.assumptions.expenses.month_costs(flows.new_policies);
        let total_costs = costs.total();
        let ebitda = revenue - total_costs;
        let ebitda_margin = if revenue != 0.0 { ebitda / revenue * 100.0 } else { 0.0 };
        let cash_flow = revenue - total_costs;
        state.book_cash(cash_flow);

        MonthRecord {
            month: state.month,
            policies: state.policies,
            customers: state.customers,
            policies_per_customer: state.policies_per_customer(target_ppc),
            leads: flows.leads,
            new_customers: flows.new_customers,
            new_policies: flows.new_policies,
            customers_lost: flows.customers_lost,
            policies_lost: flows.policies_lost,
            monthly_retention: flows.monthly_retention,
            capacity_strain: flows.strain,
            capacity_utilization: capacity.utilization(state.policies),
            service_degraded: capacity.is_degraded(state.policies),
            max_capacity: capacity.max_capacity(),
            revenue,
            total_costs,
            marketing_spend: costs.marketing,
            technology_spend: costs.technology,
            ebitda,
            ebitda_margin,
            cash_flow,
            cumulative_cash: state.cumulative_cash,
        }
    }

    /// Acquisition, capacity cap, retention and churn for the month, from the prior state
    fn calculate_flows(
        &self,
        params: &SimulationParameters,
        state: &mut ProjectionState,
        target_ppc: f64,
    ) -> MonthFlows {
        let capacity = &self.assumptions.capacity;
        let conversion_multiplier = self.config.conversion_multiplier;

        // Ramp and capacity penalty from the prior book
        let ramp = team_ramp_factor(
            params.staff.producers,
            params.additional_staff,
            state.month,
            params.ramp_months,
        );
        let strain = capacity.strain(state.policies);

        // Paid channels and the referral flywheel
        let factors = AcquisitionFactors {
            scenario_multiplier: conversion_multiplier,
            ramp,
            spend_efficiency: spend_efficiency(self.assumptions.channels.total_spend()),
            capacity_penalty: (1.0 - strain).max(0.0),
        };
        let paid = self.assumptions.channels.acquire(&factors);
        let organic = organic_referrals(state.customers, &params.features, conversion_multiplier);

        // Growth cannot exceed remaining capacity
        let referral_yield = referral_policy_yield(target_ppc);
        let referred = paid.referral_customers + organic;
        let projected_new = paid.lead_customers + referred * referral_yield + params.organic_monthly_sales;
        let scale = capacity.growth_scale(state.policies, projected_new);
        if scale < 1.0 && !state.capacity_bound {
            warn!(
                "capacity cap reached in month {}: {:.1} of {:.1} policies",
                state.month,
                state.policies,
                capacity.max_capacity()
            );
            state.capacity_bound = true;
        }
        let lead_customers = paid.lead_customers * scale;
        let referred = referred * scale;
        let walk_in_policies = params.organic_monthly_sales * scale;

        // Bundling bonus follows the run's PPC target; churn uses the live ratio
        let annual_retention = self.annual_retention(params, target_ppc, strain);
        let monthly_retention = annual_to_monthly(annual_retention);

        let new_policies = lead_customers + referred * referral_yield + walk_in_policies;

        // Churn
        let live_ppc = state.policies_per_customer(target_ppc);
        let customers_lost = state.customers * (1.0 - monthly_retention);
        let policies_lost = (customers_lost * live_ppc).min(state.policies);

        MonthFlows {
            strain,
            leads: paid.leads,
            new_customers: lead_customers + referred,
            new_policies,
            customers_lost,
            policies_lost,
            monthly_retention,
        }
    }

    /// Annual retention: target plus bundling and program boosts, clamped,
    /// scaled for the scenario, clamped again, then reduced by half the strain
    fn annual_retention(&self, params: &SimulationParameters, target_ppc: f64, strain: f64) -> f64 {
        let boosted = params.retention_fraction()
            + bundling_bonus(target_ppc)
            + program_retention_boost(&params.features);
        let clamped = boosted.min(MAX_ANNUAL_RETENTION);
        let scenario = (clamped * self.config.retention_multiplier).min(MAX_ANNUAL_RETENTION);
        (scenario * (1.0 - strain / 2.0)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ChannelSpend;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn config(months: u32) -> ProjectionConfig {
        ProjectionConfig {
            projection_months: months,
            ..Default::default()
        }
    }

    /// 500 policies on a single customer, traditional channel only
    fn growth_case() -> SimulationParameters {
        let mut params = SimulationParameters::default_agency();
        params.current_policies = 500.0;
        params.current_customers = 1.0;
        params.staff.producers = 2.0;
        params.staff.service = 1.0;
        params.staff.admin = 1.0;
        params.additional_staff = 0.0;
        params.channels = ChannelSpend {
            referral: 0.0,
            digital: 0.0,
            traditional: 2_000.0,
            partnerships: 0.0,
        };
        params.cost_per_lead = 25.0;
        params.target_conversion_rate = 10.0;
        params.target_retention_rate = 92.0;
        params.average_premium = 1_200.0;
        params.commission_payout = 10.0;
        params.organic_monthly_sales = 0.0;
        params.projection_months = 24;
        params
    }

    #[test]
    fn test_projection_runs() {
        let params = growth_case();
        let result = ProjectionEngine::for_params(&params, config(24)).project(&params);

        assert_eq!(result.records.len(), 25);
        assert_eq!(result.records[0].month, 0);
        assert_eq!(result.records[24].month, 24);
    }

    #[test]
    fn test_growth_case_adds_eight_paid_customers_a_month() {
        let params = growth_case();
        let result = ProjectionEngine::for_params(&params, config(24)).project(&params);

        let month_1 = &result.records[1];
        // 80 leads at 10%, plus a sliver of organic referral from the one customer
        let organic = 1.0 * 0.02 / 12.0;
        assert_relative_eq!(month_1.new_customers, 8.0 + organic, epsilon = 1e-9);
        assert_relative_eq!(month_1.new_policies, 8.0 + organic * 1.3, epsilon = 1e-9);

        let final_record = result.final_record().unwrap();
        assert!(final_record.policies > 500.0, "final policies {}", final_record.policies);
    }

    #[test]
    fn test_policy_conservation_every_month() {
        let params = SimulationParameters::default_agency();
        let result = ProjectionEngine::for_params(&params, config(36)).project(&params);

        for pair in result.records.windows(2) {
            let (prior, current) = (&pair[0], &pair[1]);
            assert_abs_diff_eq!(
                current.policies,
                prior.policies + current.new_policies - current.policies_lost,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                current.customers,
                prior.customers + current.new_customers - current.customers_lost,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_cumulative_cash_and_break_even() {
        let mut params = SimulationParameters::default_agency();
        params.fixed_monthly_costs = 0.0;
        let result = ProjectionEngine::for_params(&params, config(36)).project(&params);

        let mut running = 0.0;
        for record in result.flow_records() {
            running += record.cash_flow;
            assert_abs_diff_eq!(record.cumulative_cash, running, epsilon = 1e-6);
            assert_abs_diff_eq!(record.cash_flow, record.revenue - record.total_costs, epsilon = 1e-9);
            assert_abs_diff_eq!(record.ebitda, record.cash_flow, epsilon = 1e-9);
        }

        let first_positive = result
            .records
            .iter()
            .find(|r| r.cumulative_cash > 0.0)
            .map(|r| r.month);
        assert_eq!(result.break_even_month, first_positive);
        assert!(result.break_even_month.is_some());
    }

    #[test]
    fn test_break_even_none_when_never_positive() {
        let mut params = SimulationParameters::default_agency();
        params.fixed_monthly_costs = 1_000_000.0;
        let result = ProjectionEngine::for_params(&params, config(12)).project(&params);
        assert_eq!(result.break_even_month, None);
    }

    #[test]
    fn test_zero_horizon_is_initial_state_only() {
        let params = SimulationParameters::default_agency();
        let result = ProjectionEngine::for_params(&params, config(0)).project(&params);

        assert_eq!(result.records.len(), 1);
        let initial = &result.records[0];
        assert_eq!(initial.policies, params.current_policies);
        assert_eq!(initial.customers, params.current_customers);
        assert_eq!(initial.cumulative_cash, 0.0);
        assert_eq!(result.break_even_month, None);
    }

    #[test]
    fn test_zero_customers_is_defined() {
        let mut params = SimulationParameters::default_agency();
        params.current_customers = 0.0;
        params.channels = ChannelSpend {
            referral: 0.0,
            digital: 0.0,
            traditional: 0.0,
            partnerships: 0.0,
        };
        let result = ProjectionEngine::for_params(&params, config(1)).project(&params);
        let month_1 = &result.records[1];

        // No customers: no referrals, no churn, walk-ins still arrive
        assert_eq!(month_1.new_customers, 0.0);
        assert_eq!(month_1.customers_lost, 0.0);
        assert_eq!(month_1.policies_lost, 0.0);
        assert_relative_eq!(month_1.new_policies, params.organic_monthly_sales);
        for record in &result.records {
            assert!(record.policies.is_finite());
            assert!(record.policies_per_customer.is_finite());
            assert!(record.ebitda_margin.is_finite());
        }
    }

    #[test]
    fn test_zero_cost_per_lead_is_defined() {
        let mut params = SimulationParameters::default_agency();
        params.cost_per_lead = 0.0;
        let result = ProjectionEngine::for_params(&params, config(12)).project(&params);
        for record in &result.records {
            assert!(record.policies.is_finite());
            assert!(record.cumulative_cash.is_finite());
        }
    }

    #[test]
    fn test_zero_revenue_margin_is_zero() {
        let mut params = SimulationParameters::default_agency();
        params.commission_payout = 0.0;
        let result = ProjectionEngine::for_params(&params, config(3)).project(&params);
        for record in result.flow_records() {
            assert_eq!(record.revenue, 0.0);
            assert_eq!(record.ebitda_margin, 0.0);
        }
    }

    #[test]
    fn test_capacity_cap_never_exceeded() {
        let mut params = SimulationParameters::default_agency();
        params.current_policies = 7_000.0;
        params.current_customers = 5_000.0;
        params.additional_lead_spend = 200_000.0;
        params.cost_per_lead = 5.0;
        params.target_conversion_rate = 50.0;
        params.target_retention_rate = 99.0;

        let engine = ProjectionEngine::for_params(&params, config(60));
        let max_capacity = engine.assumptions.capacity.max_capacity();
        let result = engine.project(&params);

        for record in &result.records {
            assert!(
                record.policies <= max_capacity + 1e-9,
                "month {}: {} > {}",
                record.month,
                record.policies,
                max_capacity
            );
        }
        // The cap binds: growth stalls right at capacity
        assert!(result.final_record().unwrap().policies > max_capacity * 0.95);
    }

    #[test]
    fn test_strain_reduces_retention() {
        // Both books sit in the top bundling tier so only strain differs
        let mut relaxed = SimulationParameters::default_agency();
        relaxed.current_policies = 2_000.0;
        relaxed.current_customers = 1_000.0;
        let mut strained = relaxed.clone();
        strained.current_policies = 8_500.0;

        let relaxed_result = ProjectionEngine::for_params(&relaxed, config(1)).project(&relaxed);
        let strained_result = ProjectionEngine::for_params(&strained, config(1)).project(&strained);

        assert_eq!(relaxed_result.records[1].capacity_strain, 0.0);
        assert!(strained_result.records[1].capacity_strain > 0.0);
        assert!(strained_result.records[1].monthly_retention < relaxed_result.records[1].monthly_retention);
    }

    #[test]
    fn test_higher_retention_never_lowers_final_policies() {
        let mut previous = 0.0;
        for rate in [70.0, 80.0, 85.0, 90.0, 95.0, 99.0] {
            let mut params = SimulationParameters::default_agency();
            params.target_retention_rate = rate;
            let result = ProjectionEngine::for_params(&params, config(24)).project(&params);
            let final_policies = result.final_record().unwrap().policies;
            assert!(final_policies >= previous, "retention {}% gave {}", rate, final_policies);
            previous = final_policies;
        }
    }

    #[test]
    fn test_retention_clamped_below_one() {
        let mut params = SimulationParameters::default_agency();
        params.target_retention_rate = 100.0;
        params.features.renewal_program = true;
        let engine = ProjectionEngine::for_params(
            &params,
            ProjectionConfig {
                projection_months: 3,
                conversion_multiplier: 1.0,
                retention_multiplier: 1.02,
            },
        );
        let result = engine.project(&params);
        for record in result.flow_records() {
            assert!(record.monthly_retention < 1.0);
            assert!(record.customers_lost > 0.0);
        }
    }

    #[test]
    fn test_commission_model_charges_new_business() {
        let mut params = growth_case();
        params.compensation = crate::params::CompensationModel::Commission { rate: 10.0 };
        let result = ProjectionEngine::for_params(&params, config(2)).project(&params);

        let month_1 = &result.records[1];
        let recurring = 2_000.0 + params.fixed_monthly_costs;
        assert_relative_eq!(
            month_1.total_costs,
            recurring + month_1.new_policies * 1_200.0 * 0.10,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_bundling_bonus_does_not_depend_on_acquisition_volume() {
        // A 1.5 PPC book sits on the bundling tier edge; heavy lead buying
        // dilutes the live ratio but must not cost the book its bonus
        let mut params = SimulationParameters::default_agency();
        params.current_policies = 1_500.0;
        params.current_customers = 1_000.0;
        params.additional_lead_spend = 6_000.0;

        let project = |conversion_multiplier: f64| {
            let config = ProjectionConfig {
                projection_months: 24,
                conversion_multiplier,
                retention_multiplier: 1.0,
            };
            ProjectionEngine::for_params(&params, config).project(&params)
        };
        let slow = project(0.85);
        let fast = project(1.15);

        let last = fast.final_record().unwrap();
        assert!(last.policies_per_customer < 1.5, "ppc {}", last.policies_per_customer);
        for (a, b) in slow.records.iter().zip(&fast.records) {
            assert_eq!(a.capacity_strain, 0.0);
            assert_relative_eq!(a.monthly_retention, b.monthly_retention, epsilon = 1e-15);
        }
        assert_relative_eq!(last.monthly_retention, annual_to_monthly(0.89), epsilon = 1e-12);
        assert!(last.policies > slow.final_record().unwrap().policies);
    }

    #[test]
    fn test_record_capacity_snapshot() {
        let mut params = SimulationParameters::default_agency();
        params.current_policies = 7_500.0;
        params.current_customers = 5_000.0;
        let result = ProjectionEngine::for_params(&params, config(2)).project(&params);

        let initial = &result.records[0];
        assert_relative_eq!(initial.capacity_utilization, 7_500.0 / 9_000.0);
        assert!(initial.service_degraded);
        assert_eq!(initial.leads, 0.0);

        let month_1 = &result.records[1];
        assert_relative_eq!(month_1.capacity_utilization, month_1.policies / month_1.max_capacity);
        assert_eq!(month_1.service_degraded, month_1.policies > 7_200.0);
        // 1500/25 traditional + 500/15 referral + 1000/30 digital + 500/25 partnerships
        assert_relative_eq!(month_1.leads, 60.0 + 500.0 / 15.0 + 1_000.0 / 30.0 + 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_new_hire_ramp_grows_conversions() {
        let mut params = growth_case();
        params.staff.producers = 0.0;
        params.additional_staff = 2.0;
        params.ramp_months = 4;
        let result = ProjectionEngine::for_params(&params, config(6)).project(&params);

        let paid: Vec<f64> = result.flow_records().iter().map(|r| r.new_customers).collect();
        assert!(paid[0] < paid[1]);
        assert!(paid[2] < paid[3]);
        // Fully ramped from month 4 on
        assert_relative_eq!(paid[3], paid[4], epsilon = 0.05);
    }
}
