//! Monthly projection engine for a single scenario

mod state;
mod engine;
mod cashflows;

pub use state::ProjectionState;
pub use engine::{ProjectionEngine, ProjectionConfig};
pub use cashflows::{MonthRecord, ProjectionResult, ProjectionTotals};
