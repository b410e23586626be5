//! Planning inputs and their loaders

mod data;
pub mod loader;

pub use data::{
    ChannelSpend, CompensationModel, FeatureToggles, ProductMix, SimulationParameters,
    StaffComposition, MAX_PROJECTION_MONTHS,
};
pub use loader::{load_parameters, load_parameters_from_reader, load_sweep, load_sweep_from_reader, SweepOverride};
