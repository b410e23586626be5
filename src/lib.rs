//! Agency Planner - growth and cash-flow projections for insurance agencies
//!
//! This library provides:
//! - Monthly book-of-business projections (acquisition, churn, capacity, cash)
//! - Channel, capacity and retention models
//! - Conservative / Moderate / Aggressive scenario comparison
//! - Unit economics (CAC, LTV, ROI, payback) and industry benchmarks

pub mod error;
pub mod params;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod benchmarks;

// Re-export commonly used types
pub use error::{PlannerError, PlannerResult};
pub use params::SimulationParameters;
pub use assumptions::Assumptions;
pub use projection::{ProjectionEngine, ProjectionResult, MonthRecord};
pub use scenario::{plan, PlanResult, Scenario, ScenarioRunner, ScenarioSummary};
pub use benchmarks::BenchmarkReport;
