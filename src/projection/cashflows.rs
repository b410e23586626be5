//! Monthly output records for projections

use serde::{Deserialize, Serialize};

/// A single month of one scenario's projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub month: u32,

    // Book of business (end of month)
    pub policies: f64,
    pub customers: f64,
    pub policies_per_customer: f64,

    // Flows during the month
    /// Paid leads bought across all channels
    pub leads: f64,
    pub new_customers: f64,
    pub new_policies: f64,
    pub customers_lost: f64,
    pub policies_lost: f64,

    // Rates
    pub monthly_retention: f64,
    pub capacity_strain: f64,
    /// Policies as a fraction of max capacity
    pub capacity_utilization: f64,
    /// Book above the optimal (80%) utilization line
    pub service_degraded: bool,
    pub max_capacity: f64,

    // Money
    pub revenue: f64,
    pub total_costs: f64,
    pub marketing_spend: f64,
    pub technology_spend: f64,
    pub ebitda: f64,
    /// EBITDA as % of revenue (0 with no revenue)
    pub ebitda_margin: f64,
    pub cash_flow: f64,
    pub cumulative_cash: f64,
}

impl MonthRecord {
    /// Create a record with zero flows
    pub fn new(month: u32) -> Self {
        Self {
            month,
            policies: 0.0,
            customers: 0.0,
            policies_per_customer: 0.0,
            leads: 0.0,
            new_customers: 0.0,
            new_policies: 0.0,
            customers_lost: 0.0,
            policies_lost: 0.0,
            monthly_retention: 0.0,
            capacity_strain: 0.0,
            capacity_utilization: 0.0,
            service_degraded: false,
            max_capacity: 0.0,
            revenue: 0.0,
            total_costs: 0.0,
            marketing_spend: 0.0,
            technology_spend: 0.0,
            ebitda: 0.0,
            ebitda_margin: 0.0,
            cash_flow: 0.0,
            cumulative_cash: 0.0,
        }
    }
}

/// Complete projection for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// One record per month, 0..=projection_months
    pub records: Vec<MonthRecord>,

    /// First month cumulative cash turned positive
    pub break_even_month: Option<u32>,
}

impl ProjectionResult {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            break_even_month: None,
        }
    }

    pub fn add_record(&mut self, record: MonthRecord) {
        self.records.push(record);
    }

    pub fn final_record(&self) -> Option<&MonthRecord> {
        self.records.last()
    }

    /// Flow months only (month 0 carries no flows)
    pub fn flow_records(&self) -> &[MonthRecord] {
        self.records.get(1..).unwrap_or(&[])
    }

    pub fn totals(&self) -> ProjectionTotals {
        let flows = self.flow_records();
        ProjectionTotals {
            total_revenue: flows.iter().map(|r| r.revenue).sum(),
            total_cost: flows.iter().map(|r| r.total_costs).sum(),
            total_marketing: flows.iter().map(|r| r.marketing_spend).sum(),
            total_new_customers: flows.iter().map(|r| r.new_customers).sum(),
        }
    }
}

impl Default for ProjectionResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Horizon totals over the flow months
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_marketing: f64,
    pub total_new_customers: f64,
}
