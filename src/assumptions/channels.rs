//! Marketing channel model: leads, conversions, diminishing returns, referral flywheel

use serde::{Deserialize, Serialize};

use crate::params::{FeatureToggles, SimulationParameters};

pub const REFERRAL_CONVERSION: f64 = 0.08;
pub const DIGITAL_CONVERSION: f64 = 0.005;
pub const PARTNERSHIPS_CONVERSION: f64 = 0.06;

pub const REFERRAL_COST_PER_LEAD: f64 = 15.0;
pub const DIGITAL_COST_PER_LEAD: f64 = 30.0;
pub const PARTNERSHIPS_COST_PER_LEAD: f64 = 25.0;

/// Total monthly spend before diminishing returns start
pub const EFFICIENCY_FREE_SPEND: f64 = 5_000.0;
/// Spend over which the full efficiency loss is reached
pub const EFFICIENCY_DECAY_SPAN: f64 = 20_000.0;
pub const MAX_EFFICIENCY_LOSS: f64 = 0.3;

/// Annual referral rate of the existing customer base
pub const ORGANIC_REFERRAL_RATE: f64 = 0.02;
pub const CONCIERGE_REFERRAL_BOOST: f64 = 0.25;
pub const NEWSLETTER_REFERRAL_BOOST: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Referral,
    Digital,
    Traditional,
    Partnerships,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Referral,
        Channel::Digital,
        Channel::Traditional,
        Channel::Partnerships,
    ];

    /// Whether customers from this channel arrive through a referral
    pub fn is_referral_sourced(&self) -> bool {
        matches!(self, Channel::Referral)
    }
}

/// Spend, unit cost and conversion for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInputs {
    pub channel: Channel,
    pub spend: f64,
    pub cost_per_lead: f64,
    pub conversion_rate: f64,
}

impl ChannelInputs {
    /// Leads bought this month; zero when the unit cost is zero
    pub fn leads(&self) -> f64 {
        if self.cost_per_lead <= 0.0 {
            0.0
        } else {
            self.spend / self.cost_per_lead
        }
    }

    /// Customers converted from this channel's leads
    pub fn converted_customers(&self, factors: &AcquisitionFactors) -> f64 {
        self.leads() * self.conversion_rate * factors.combined()
    }
}

/// Multipliers applied uniformly to every paid channel in a month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionFactors {
    pub scenario_multiplier: f64,
    pub ramp: f64,
    pub spend_efficiency: f64,
    /// 1 - capacity strain
    pub capacity_penalty: f64,
}

impl AcquisitionFactors {
    pub fn combined(&self) -> f64 {
        self.scenario_multiplier * self.ramp * self.spend_efficiency * self.capacity_penalty
    }
}

/// Paid acquisition for one month, split by how the customer arrived
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaidAcquisition {
    /// Customers from lead-buying channels (one policy each)
    pub lead_customers: f64,
    /// Customers from the paid referral channel
    pub referral_customers: f64,
    pub leads: f64,
}

/// The four fixed channels configured from the parameter bundle
#[derive(Debug, Clone)]
pub struct ChannelModel {
    channels: Vec<ChannelInputs>,
}

impl ChannelModel {
    /// Build channels from the parameters; the traditional channel absorbs
    /// the additional lead spend and uses the user's cost per lead and conversion target
    pub fn from_params(params: &SimulationParameters) -> Self {
        let channels = Channel::ALL
            .iter()
            .map(|&channel| match channel {
                Channel::Referral => ChannelInputs {
                    channel,
                    spend: params.channels.referral,
                    cost_per_lead: REFERRAL_COST_PER_LEAD,
                    conversion_rate: REFERRAL_CONVERSION,
                },
                Channel::Digital => ChannelInputs {
                    channel,
                    spend: params.channels.digital,
                    cost_per_lead: DIGITAL_COST_PER_LEAD,
                    conversion_rate: DIGITAL_CONVERSION,
                },
                Channel::Traditional => ChannelInputs {
                    channel,
                    spend: params.channels.traditional + params.additional_lead_spend,
                    cost_per_lead: params.cost_per_lead,
                    conversion_rate: params.conversion_fraction(),
                },
                Channel::Partnerships => ChannelInputs {
                    channel,
                    spend: params.channels.partnerships,
                    cost_per_lead: PARTNERSHIPS_COST_PER_LEAD,
                    conversion_rate: PARTNERSHIPS_CONVERSION,
                },
            })
            .collect();

        Self { channels }
    }

    pub fn get(&self, channel: Channel) -> Option<&ChannelInputs> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    pub fn total_spend(&self) -> f64 {
        self.channels.iter().map(|c| c.spend).sum()
    }

    /// Converted customers across all channels for one month
    pub fn acquire(&self, factors: &AcquisitionFactors) -> PaidAcquisition {
        let mut acquisition = PaidAcquisition::default();
        for inputs in &self.channels {
            let customers = inputs.converted_customers(factors);
            acquisition.leads += inputs.leads();
            if inputs.channel.is_referral_sourced() {
                acquisition.referral_customers += customers;
            } else {
                acquisition.lead_customers += customers;
            }
        }
        acquisition
    }
}

/// Diminishing returns on total monthly marketing spend, in [0.7, 1.0]
pub fn spend_efficiency(total_spend: f64) -> f64 {
    if total_spend <= EFFICIENCY_FREE_SPEND {
        return 1.0;
    }
    1.0 - ((total_spend - EFFICIENCY_FREE_SPEND) / EFFICIENCY_DECAY_SPAN).min(MAX_EFFICIENCY_LOSS)
}

/// New customers referred by the existing base, independent of paid channels
pub fn organic_referrals(customers: f64, features: &FeatureToggles, scenario_multiplier: f64) -> f64 {
    let mut boost = 1.0;
    if features.concierge {
        boost += CONCIERGE_REFERRAL_BOOST;
    }
    if features.newsletter {
        boost += NEWSLETTER_REFERRAL_BOOST;
    }
    customers.max(0.0) * (ORGANIC_REFERRAL_RATE / 12.0) * boost * scenario_multiplier
}
