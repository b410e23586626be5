//! Parameter bundle describing the current book of business and the planned investment

use serde::{Deserialize, Serialize};

use crate::assumptions::CapacityModel;
use crate::error::{PlannerError, PlannerResult};

/// Longest horizon accepted at the boundary (50 years)
pub const MAX_PROJECTION_MONTHS: u32 = 600;

/// Line-of-business annual premiums used when a product mix is supplied
pub const AUTO_PREMIUM: f64 = 1_200.0;
pub const HOME_PREMIUM: f64 = 1_500.0;
pub const UMBRELLA_PREMIUM: f64 = 400.0;
pub const COMMERCIAL_PREMIUM: f64 = 3_500.0;
pub const LIFE_PREMIUM: f64 = 800.0;

/// Staffing composition in full-time equivalents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffComposition {
    pub producers: f64,
    pub service: f64,
    pub admin: f64,
}

impl StaffComposition {
    pub fn total(&self) -> f64 {
        self.producers + self.service + self.admin
    }
}

impl Default for StaffComposition {
    fn default() -> Self {
        Self {
            producers: 3.0,
            service: 2.0,
            admin: 1.0,
        }
    }
}

/// Monthly marketing spend by channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSpend {
    pub referral: f64,
    pub digital: f64,
    pub traditional: f64,
    pub partnerships: f64,
}

impl ChannelSpend {
    pub fn total(&self) -> f64 {
        self.referral + self.digital + self.traditional + self.partnerships
    }
}

impl Default for ChannelSpend {
    fn default() -> Self {
        Self {
            referral: 500.0,
            digital: 1_000.0,
            traditional: 1_500.0,
            partnerships: 500.0,
        }
    }
}

/// Optional retention and technology programs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub concierge: bool,
    pub newsletter: bool,
    pub eo_automation: bool,
    pub renewal_program: bool,
    pub cross_sell_program: bool,
}

/// How additional sales staff are paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum CompensationModel {
    /// Salaried producers, loaded with the benefits multiplier
    FixedSalary { annual_salary: f64 },
    /// Commission on full annual premium, paid in the month of sale (percent)
    Commission { rate: f64 },
}

impl Default for CompensationModel {
    fn default() -> Self {
        CompensationModel::FixedSalary {
            annual_salary: 50_000.0,
        }
    }
}

/// Policy counts by line of business
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductMix {
    pub auto: f64,
    pub home: f64,
    pub umbrella: f64,
    pub commercial: f64,
    pub life: f64,
}

impl ProductMix {
    pub fn total(&self) -> f64 {
        self.auto + self.home + self.umbrella + self.commercial + self.life
    }

    /// Count-weighted annual premium, or `fallback` for an empty mix
    pub fn weighted_premium(&self, fallback: f64) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return fallback;
        }
        (self.auto * AUTO_PREMIUM
            + self.home * HOME_PREMIUM
            + self.umbrella * UMBRELLA_PREMIUM
            + self.commercial * COMMERCIAL_PREMIUM
            + self.life * LIFE_PREMIUM)
            / total
    }
}

/// Complete input bundle for one planning run
///
/// Rates are percentages in [0, 100]; they are converted to fractions by the
/// accessor methods. Missing JSON fields fall back to [`SimulationParameters::default_agency`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Policies in force today
    pub current_policies: f64,

    /// Customers (households) today
    pub current_customers: f64,

    pub staff: StaffComposition,

    /// Monthly spend per marketing channel
    pub channels: ChannelSpend,

    /// Cost per lead for the traditional channel
    pub cost_per_lead: f64,

    /// Extra monthly lead spend, routed through the traditional channel
    pub additional_lead_spend: f64,

    /// New producers hired at month 0 (ramp up over `ramp_months`)
    pub additional_staff: f64,

    pub projection_months: u32,

    pub features: FeatureToggles,

    pub compensation: CompensationModel,

    /// Annual retention target (%)
    pub target_retention_rate: f64,

    /// Traditional channel conversion rate (%)
    pub target_conversion_rate: f64,

    /// Average annual premium per policy
    pub average_premium: f64,

    /// Agency commission received on premium (%)
    pub commission_payout: f64,

    pub fixed_monthly_costs: f64,

    /// Loading on salaries for benefits and payroll taxes (1.0 = none)
    pub benefits_multiplier: f64,

    pub ramp_months: u32,

    /// Walk-in policies written each month without channel attribution
    pub organic_monthly_sales: f64,

    pub product_mix: ProductMix,
}

impl SimulationParameters {
    /// A mid-sized personal-lines agency with a modest growth plan
    pub fn default_agency() -> Self {
        Self {
            current_policies: 1_500.0,
            current_customers: 1_000.0,
            staff: StaffComposition::default(),
            channels: ChannelSpend::default(),
            cost_per_lead: 25.0,
            additional_lead_spend: 0.0,
            additional_staff: 1.0,
            projection_months: 24,
            features: FeatureToggles::default(),
            compensation: CompensationModel::default(),
            target_retention_rate: 88.0,
            target_conversion_rate: 10.0,
            average_premium: 1_200.0,
            commission_payout: 12.0,
            fixed_monthly_costs: 8_000.0,
            benefits_multiplier: 1.25,
            ramp_months: 6,
            organic_monthly_sales: 5.0,
            product_mix: ProductMix::default(),
        }
    }

    /// Check the bundle before it reaches the engine
    pub fn validate(&self) -> PlannerResult<()> {
        non_negative("current_policies", self.current_policies)?;
        non_negative("current_customers", self.current_customers)?;
        non_negative("staff.producers", self.staff.producers)?;
        non_negative("staff.service", self.staff.service)?;
        non_negative("staff.admin", self.staff.admin)?;
        non_negative("channels.referral", self.channels.referral)?;
        non_negative("channels.digital", self.channels.digital)?;
        non_negative("channels.traditional", self.channels.traditional)?;
        non_negative("channels.partnerships", self.channels.partnerships)?;
        non_negative("cost_per_lead", self.cost_per_lead)?;
        non_negative("additional_lead_spend", self.additional_lead_spend)?;
        non_negative("additional_staff", self.additional_staff)?;
        non_negative("average_premium", self.average_premium)?;
        non_negative("fixed_monthly_costs", self.fixed_monthly_costs)?;
        non_negative("organic_monthly_sales", self.organic_monthly_sales)?;
        non_negative("product_mix.auto", self.product_mix.auto)?;
        non_negative("product_mix.home", self.product_mix.home)?;
        non_negative("product_mix.umbrella", self.product_mix.umbrella)?;
        non_negative("product_mix.commercial", self.product_mix.commercial)?;
        non_negative("product_mix.life", self.product_mix.life)?;

        percent("target_retention_rate", self.target_retention_rate)?;
        percent("target_conversion_rate", self.target_conversion_rate)?;
        percent("commission_payout", self.commission_payout)?;

        match self.compensation {
            CompensationModel::FixedSalary { annual_salary } => {
                non_negative("compensation.annual_salary", annual_salary)?
            }
            CompensationModel::Commission { rate } => percent("compensation.rate", rate)?,
        }

        if !(1.0..=3.0).contains(&self.benefits_multiplier) {
            return Err(PlannerError::OutOfRange {
                field: "benefits_multiplier",
                value: self.benefits_multiplier,
                min: 1.0,
                max: 3.0,
            });
        }

        let max_capacity = CapacityModel::from_params(self).max_capacity();
        if self.current_policies > max_capacity {
            return Err(PlannerError::OverCapacity {
                policies: self.current_policies,
                max_capacity,
            });
        }

        if self.projection_months == 0 {
            return Err(PlannerError::ZeroHorizon);
        }
        if self.projection_months > MAX_PROJECTION_MONTHS {
            return Err(PlannerError::OutOfRange {
                field: "projection_months",
                value: self.projection_months as f64,
                min: 1.0,
                max: MAX_PROJECTION_MONTHS as f64,
            });
        }

        Ok(())
    }

    /// Total monthly marketing spend, including additional lead spend
    pub fn total_marketing_spend(&self) -> f64 {
        self.channels.total() + self.additional_lead_spend
    }

    /// Producers counted for capacity and ramp (existing plus new hires)
    pub fn producer_heads(&self) -> f64 {
        self.staff.producers + self.additional_staff
    }

    /// Total FTE after the planned hires
    pub fn total_fte(&self) -> f64 {
        self.staff.total() + self.additional_staff
    }

    /// Annual premium per policy used for revenue, commissions and LTV
    pub fn product_premium(&self) -> f64 {
        self.product_mix.weighted_premium(self.average_premium)
    }

    /// Policies per customer today (1.0 with no customers)
    pub fn base_policies_per_customer(&self) -> f64 {
        if self.current_customers > 0.0 {
            self.current_policies / self.current_customers
        } else {
            1.0
        }
    }

    pub fn retention_fraction(&self) -> f64 {
        self.target_retention_rate / 100.0
    }

    pub fn conversion_fraction(&self) -> f64 {
        self.target_conversion_rate / 100.0
    }

    pub fn payout_fraction(&self) -> f64 {
        self.commission_payout / 100.0
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::default_agency()
    }
}

fn non_negative(field: &'static str, value: f64) -> PlannerResult<()> {
    // Written as a negated comparison so NaN is rejected too
    if !(value >= 0.0) {
        return Err(PlannerError::NegativeValue { field, value });
    }
    Ok(())
}

fn percent(field: &'static str, value: f64) -> PlannerResult<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(PlannerError::PercentOutOfRange { field, value });
    }
    Ok(())
}
