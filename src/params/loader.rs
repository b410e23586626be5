//! Load parameter bundles (JSON) and sweep override tables (CSV)

use csv::Reader;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::SimulationParameters;
use crate::error::PlannerResult;

/// One named row of a sensitivity sweep; empty cells keep the base value
#[derive(Debug, Clone, Deserialize)]
pub struct SweepOverride {
    pub label: String,
    pub target_retention_rate: Option<f64>,
    pub target_conversion_rate: Option<f64>,
    pub additional_lead_spend: Option<f64>,
    pub additional_staff: Option<f64>,
    pub projection_months: Option<u32>,
}

impl SweepOverride {
    /// Overlay this row onto a base bundle
    pub fn apply(&self, base: &SimulationParameters) -> SimulationParameters {
        let mut params = base.clone();
        if let Some(rate) = self.target_retention_rate {
            params.target_retention_rate = rate;
        }
        if let Some(rate) = self.target_conversion_rate {
            params.target_conversion_rate = rate;
        }
        if let Some(spend) = self.additional_lead_spend {
            params.additional_lead_spend = spend;
        }
        if let Some(staff) = self.additional_staff {
            params.additional_staff = staff;
        }
        if let Some(months) = self.projection_months {
            params.projection_months = months;
        }
        params
    }
}

/// Load a parameter bundle from a JSON file; missing fields take the defaults
pub fn load_parameters<P: AsRef<Path>>(path: P) -> PlannerResult<SimulationParameters> {
    let file = File::open(path)?;
    load_parameters_from_reader(BufReader::new(file))
}

/// Load a parameter bundle from any reader
pub fn load_parameters_from_reader<R: std::io::Read>(reader: R) -> PlannerResult<SimulationParameters> {
    let params = serde_json::from_reader(reader)?;
    Ok(params)
}

/// Load sweep override rows from a CSV file
pub fn load_sweep<P: AsRef<Path>>(path: P) -> PlannerResult<Vec<SweepOverride>> {
    let file = File::open(path)?;
    load_sweep_from_reader(file)
}

/// Load sweep override rows from any reader
pub fn load_sweep_from_reader<R: std::io::Read>(reader: R) -> PlannerResult<Vec<SweepOverride>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: SweepOverride = result?;
        rows.push(row);
    }

    Ok(rows)
}
