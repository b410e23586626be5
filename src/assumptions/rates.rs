//! Rate conversions: annual retention to monthly survival, producer ramp, bundling tiers
//!
//! Retention is modeled as a multiplicative monthly survival rate:
//! monthly = annual^(1/12), so twelve monthly steps reproduce the annual figure.

use crate::params::FeatureToggles;

/// No scenario may claim perfect retention
pub const MAX_ANNUAL_RETENTION: f64 = 0.99;

/// Bundling tiers: (minimum policies per customer, annual retention bonus)
pub const BUNDLING_TIERS: [(f64, f64); 2] = [(1.8, 0.02), (1.5, 0.01)];

/// Annual retention boosts from service and technology programs
pub const CONCIERGE_RETENTION_BOOST: f64 = 0.02;
pub const NEWSLETTER_RETENTION_BOOST: f64 = 0.015;
pub const EO_AUTOMATION_RETENTION_BOOST: f64 = 0.02;
pub const RENEWAL_PROGRAM_RETENTION_BOOST: f64 = 0.03;

/// Uplift on the policies-per-customer target from a cross-sell program
pub const CROSS_SELL_PPC_BOOST: f64 = 0.15;

/// Most policies a referred customer brings on day one
pub const REFERRAL_POLICY_CAP: f64 = 1.3;

/// Convert an annual retention fraction to a monthly survival rate
///
/// Inputs at or above 1.0 are clamped to [`MAX_ANNUAL_RETENTION`] first.
pub fn annual_to_monthly(annual_rate: f64) -> f64 {
    let annual = if annual_rate >= 1.0 {
        MAX_ANNUAL_RETENTION
    } else {
        annual_rate.max(0.0)
    };
    annual.powf(1.0 / 12.0)
}

/// Inverse of [`annual_to_monthly`] (without the clamp)
pub fn monthly_to_annual(monthly_rate: f64) -> f64 {
    monthly_rate.max(0.0).powi(12)
}

/// Linear productivity ramp for a new producer, in [0, 1]
///
/// A zero-month ramp means full productivity immediately.
pub fn ramp_factor(month: u32, ramp_months: u32) -> f64 {
    if ramp_months == 0 {
        return 1.0;
    }
    (month as f64 / ramp_months as f64).min(1.0)
}

/// Head-weighted ramp across the whole producer team
///
/// Existing producers are fully productive; new hires follow [`ramp_factor`].
pub fn team_ramp_factor(existing: f64, new_hires: f64, month: u32, ramp_months: u32) -> f64 {
    let heads = existing + new_hires;
    if heads <= 0.0 {
        return 1.0;
    }
    (existing + new_hires * ramp_factor(month, ramp_months)) / heads
}

/// Annual retention bonus earned by bundling (step function, not a curve)
pub fn bundling_bonus(policies_per_customer: f64) -> f64 {
    BUNDLING_TIERS
        .iter()
        .find(|(threshold, _)| policies_per_customer >= *threshold)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

/// Policies-per-customer target: base ratio, lifted by the cross-sell program
pub fn target_policies_per_customer(base_ppc: f64, cross_sell: bool) -> f64 {
    let boost = if cross_sell { CROSS_SELL_PPC_BOOST } else { 0.0 };
    base_ppc * (1.0 + boost)
}

/// Policies written per referred customer
pub fn referral_policy_yield(target_ppc: f64) -> f64 {
    target_ppc.min(REFERRAL_POLICY_CAP)
}

/// Sum of the annual retention boosts for the enabled programs
pub fn program_retention_boost(features: &FeatureToggles) -> f64 {
    let mut boost = 0.0;
    if features.concierge {
        boost += CONCIERGE_RETENTION_BOOST;
    }
    if features.newsletter {
        boost += NEWSLETTER_RETENTION_BOOST;
    }
    if features.eo_automation {
        boost += EO_AUTOMATION_RETENTION_BOOST;
    }
    if features.renewal_program {
        boost += RENEWAL_PROGRAM_RETENTION_BOOST;
    }
    boost
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annual_to_monthly_round_trips() {
        let monthly = annual_to_monthly(0.92);
        assert_relative_eq!(monthly.powi(12), 0.92, epsilon = 1e-12);
        assert!(monthly > 0.99 && monthly < 1.0);
    }

    #[test]
    fn test_perfect_retention_is_clamped() {
        assert_relative_eq!(annual_to_monthly(1.0), 0.99_f64.powf(1.0 / 12.0));
        assert_relative_eq!(annual_to_monthly(1.4), annual_to_monthly(0.99));
    }

    #[test]
    fn test_ramp_factor() {
        assert_eq!(ramp_factor(0, 6), 0.0);
        assert_relative_eq!(ramp_factor(3, 6), 0.5);
        assert_eq!(ramp_factor(6, 6), 1.0);
        assert_eq!(ramp_factor(40, 6), 1.0);
        // Zero-length ramp must not divide by zero
        assert_eq!(ramp_factor(0, 0), 1.0);
    }

    #[test]
    fn test_team_ramp_factor() {
        // 3 seasoned producers plus 1 hire at half productivity
        assert_relative_eq!(team_ramp_factor(3.0, 1.0, 3, 6), 3.5 / 4.0);
        assert_eq!(team_ramp_factor(3.0, 0.0, 1, 6), 1.0);
        assert_eq!(team_ramp_factor(0.0, 0.0, 1, 6), 1.0);
        assert_eq!(team_ramp_factor(0.0, 2.0, 0, 6), 0.0);
    }

    #[test]
    fn test_bundling_bonus_tiers() {
        assert_eq!(bundling_bonus(1.0), 0.0);
        assert_eq!(bundling_bonus(1.49), 0.0);
        assert_eq!(bundling_bonus(1.5), 0.01);
        assert_eq!(bundling_bonus(1.79), 0.01);
        assert_eq!(bundling_bonus(1.8), 0.02);
        assert_eq!(bundling_bonus(3.0), 0.02);
    }

    #[test]
    fn test_policies_per_customer_target() {
        assert_eq!(target_policies_per_customer(1.4, false), 1.4);
        assert_relative_eq!(target_policies_per_customer(1.4, true), 1.61, epsilon = 1e-12);

        assert_eq!(referral_policy_yield(1.1), 1.1);
        assert_eq!(referral_policy_yield(2.4), REFERRAL_POLICY_CAP);
    }

    #[test]
    fn test_program_retention_boost() {
        assert_eq!(program_retention_boost(&FeatureToggles::default()), 0.0);

        let all = FeatureToggles {
            concierge: true,
            newsletter: true,
            eo_automation: true,
            renewal_program: true,
            cross_sell_program: true,
        };
        assert_relative_eq!(program_retention_boost(&all), 0.085, epsilon = 1e-12);
    }
}
