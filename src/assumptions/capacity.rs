//! Staffing capacity: maximum supportable policies and service strain above 80% utilization

use crate::params::SimulationParameters;

/// Policies per producer / admin head (premium-equivalent units)
pub const PRODUCER_CAPACITY: f64 = 2_000.0;
pub const ADMIN_CAPACITY: f64 = 1_000.0;
pub const PRODUCER_CAPACITY_EO: f64 = 2_500.0;
pub const ADMIN_CAPACITY_EO: f64 = 1_500.0;

/// Utilization above which service quality starts to degrade
pub const OPTIMAL_UTILIZATION: f64 = 0.8;
/// Strain slope per unit of overload beyond optimal capacity
pub const STRAIN_SLOPE: f64 = 0.15;
pub const MAX_STRAIN: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityModel {
    max_capacity: f64,
}

impl CapacityModel {
    pub fn new(max_capacity: f64) -> Self {
        Self {
            max_capacity: max_capacity.max(0.0),
        }
    }

    /// Capacity after planned hires; E&O automation raises per-head capacity
    pub fn from_params(params: &SimulationParameters) -> Self {
        let (per_producer, per_admin) = if params.features.eo_automation {
            (PRODUCER_CAPACITY_EO, ADMIN_CAPACITY_EO)
        } else {
            (PRODUCER_CAPACITY, ADMIN_CAPACITY)
        };
        Self::new(params.producer_heads() * per_producer + params.staff.admin * per_admin)
    }

    pub fn max_capacity(&self) -> f64 {
        self.max_capacity
    }

    pub fn optimal_capacity(&self) -> f64 {
        self.max_capacity * OPTIMAL_UTILIZATION
    }

    /// Policies as a fraction of max capacity (0 with no capacity and no policies)
    pub fn utilization(&self, policies: f64) -> f64 {
        if self.max_capacity > 0.0 {
            policies / self.max_capacity
        } else if policies > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    pub fn is_degraded(&self, policies: f64) -> bool {
        policies > self.optimal_capacity()
    }

    /// Capped linear service penalty in [0, MAX_STRAIN]
    ///
    /// With zero capacity any book is fully overloaded.
    pub fn strain(&self, policies: f64) -> f64 {
        let optimal = self.optimal_capacity();
        if policies <= optimal {
            return 0.0;
        }
        if optimal <= 0.0 {
            return MAX_STRAIN;
        }
        ((policies - optimal) / optimal * STRAIN_SLOPE).min(MAX_STRAIN)
    }

    /// Room left before the hard cap
    pub fn remaining(&self, policies: f64) -> f64 {
        (self.max_capacity - policies).max(0.0)
    }

    /// Factor in [0, 1] that shrinks projected new policies to fit remaining capacity
    pub fn growth_scale(&self, policies: f64, projected_new_policies: f64) -> f64 {
        if projected_new_policies <= 0.0 {
            return 1.0;
        }
        (self.remaining(policies) / projected_new_policies).min(1.0)
    }
}
