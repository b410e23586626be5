//! Running state for one scenario during projection

use crate::params::SimulationParameters;

/// State of the book at the end of a month
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection month (0 = starting position)
    pub month: u32,

    /// Policies in force
    pub policies: f64,

    /// Customers (households) in force
    pub customers: f64,

    /// Cumulative cash since month 0
    pub cumulative_cash: f64,

    /// First month cumulative cash turned strictly positive
    pub break_even_month: Option<u32>,

    /// Whether the capacity hard cap has bound in any month so far
    pub capacity_bound: bool,
}

impl ProjectionState {
    /// Initialize state from the current book of business
    pub fn from_params(params: &SimulationParameters) -> Self {
        Self {
            month: 0,
            policies: params.current_policies,
            customers: params.current_customers,
            cumulative_cash: 0.0,
            break_even_month: None,
            capacity_bound: false,
        }
    }

    /// Live policies-per-customer ratio, or `fallback` with no customers
    pub fn policies_per_customer(&self, fallback: f64) -> f64 {
        if self.customers > 0.0 {
            self.policies / self.customers
        } else {
            fallback
        }
    }

    /// Book one month of cash and record break-even the first time only
    pub fn book_cash(&mut self, cash_flow: f64) {
        self.cumulative_cash += cash_flow;
        if self.break_even_month.is_none() && self.cumulative_cash > 0.0 {
            self.break_even_month = Some(self.month);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_break_even_recorded_once() {
        let mut state = ProjectionState::from_params(&SimulationParameters::default_agency());

        state.month = 1;
        state.book_cash(-100.0);
        assert_eq!(state.break_even_month, None);

        state.month = 2;
        state.book_cash(150.0);
        assert_eq!(state.break_even_month, Some(2));

        state.month = 3;
        state.book_cash(-200.0);
        state.month = 4;
        state.book_cash(500.0);
        assert_eq!(state.break_even_month, Some(2));
    }

    #[test]
    fn test_zero_cumulative_cash_is_not_break_even() {
        let mut state = ProjectionState::from_params(&SimulationParameters::default_agency());
        state.month = 1;
        state.book_cash(0.0);
        assert_eq!(state.break_even_month, None);
    }

    #[test]
    fn test_live_ppc_falls_back_without_customers() {
        let mut params = SimulationParameters::default_agency();
        params.current_policies = 300.0;
        params.current_customers = 200.0;
        let state = ProjectionState::from_params(&params);
        assert_eq!(state.policies_per_customer(9.0), 1.5);

        params.current_customers = 0.0;
        let state = ProjectionState::from_params(&params);
        assert_eq!(state.policies_per_customer(1.15), 1.15);
    }
}
