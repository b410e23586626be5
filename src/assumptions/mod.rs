//! Model assumptions: rate conversions, channels, capacity and cost accrual

pub mod rates;
pub mod channels;
pub mod capacity;
pub mod expenses;

pub use capacity::CapacityModel;
pub use channels::{AcquisitionFactors, Channel, ChannelInputs, ChannelModel, PaidAcquisition};
pub use expenses::{ExpenseModel, MonthlyCosts};

use crate::params::SimulationParameters;

/// Container for all per-run models derived from the parameters
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub channels: ChannelModel,
    pub capacity: CapacityModel,
    pub expenses: ExpenseModel,
}

impl Assumptions {
    pub fn from_params(params: &SimulationParameters) -> Self {
        Self {
            channels: ChannelModel::from_params(params),
            capacity: CapacityModel::from_params(params),
            expenses: ExpenseModel::from_params(params),
        }
    }
}
