//! Monthly cost accrual: marketing, overhead, program fees, sales compensation

use serde::{Deserialize, Serialize};

use crate::params::{CompensationModel, SimulationParameters};

/// Monthly fees for retention systems
pub const CONCIERGE_MONTHLY_FEE: f64 = 750.0;
pub const NEWSLETTER_MONTHLY_FEE: f64 = 200.0;
pub const RENEWAL_PROGRAM_MONTHLY_FEE: f64 = 350.0;
pub const CROSS_SELL_PROGRAM_MONTHLY_FEE: f64 = 250.0;

/// Monthly technology fee for E&O automation
pub const EO_AUTOMATION_MONTHLY_FEE: f64 = 500.0;

/// Cost breakdown for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCosts {
    pub marketing: f64,
    pub fixed_overhead: f64,
    pub retention_systems: f64,
    pub technology: f64,
    pub staffing: f64,
    pub commissions: f64,
}

impl MonthlyCosts {
    pub fn total(&self) -> f64 {
        self.marketing
            + self.fixed_overhead
            + self.retention_systems
            + self.technology
            + self.staffing
            + self.commissions
    }
}

/// Recurring costs fixed for the run plus the per-sale commission rule
#[derive(Debug, Clone)]
pub struct ExpenseModel {
    recurring: MonthlyCosts,
    commission_rate: Option<f64>,
    premium: f64,
}

impl ExpenseModel {
    pub fn from_params(params: &SimulationParameters) -> Self {
        let features = &params.features;

        let mut retention_systems = 0.0;
        if features.concierge {
            retention_systems += CONCIERGE_MONTHLY_FEE;
        }
        if features.newsletter {
            retention_systems += NEWSLETTER_MONTHLY_FEE;
        }
        if features.renewal_program {
            retention_systems += RENEWAL_PROGRAM_MONTHLY_FEE;
        }
        if features.cross_sell_program {
            retention_systems += CROSS_SELL_PROGRAM_MONTHLY_FEE;
        }

        let technology = if features.eo_automation {
            EO_AUTOMATION_MONTHLY_FEE
        } else {
            0.0
        };

        let (staffing, commission_rate) = match params.compensation {
            CompensationModel::FixedSalary { annual_salary } => (
                params.additional_staff * annual_salary / 12.0 * params.benefits_multiplier,
                None,
            ),
            CompensationModel::Commission { rate } => (0.0, Some(rate / 100.0)),
        };

        Self {
            recurring: MonthlyCosts {
                marketing: params.total_marketing_spend(),
                fixed_overhead: params.fixed_monthly_costs,
                retention_systems,
                technology,
                staffing,
                commissions: 0.0,
            },
            commission_rate,
            premium: params.product_premium(),
        }
    }

    pub fn recurring(&self) -> &MonthlyCosts {
        &self.recurring
    }

    /// Costs for a month in which `new_policies` were written
    ///
    /// Commission is charged on the full annual premium in the month of sale.
    pub fn month_costs(&self, new_policies: f64) -> MonthlyCosts {
        let mut costs = self.recurring;
        if let Some(rate) = self.commission_rate {
            costs.commissions = new_policies.max(0.0) * self.premium * rate;
        }
        costs
    }
}
