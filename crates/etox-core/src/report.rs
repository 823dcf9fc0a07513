// crates/etox-core/src/report.rs

use serde::Serialize;

use crate::error::Result;
use crate::row_filter::RowFilterStats;
use crate::time_normalizer::UnmatchedUnits;
use crate::value_converter::UnitConversion;
use crate::weights::LookupFailure;

/// What a cleaning pass dropped, converted and left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows: RowFilterStats,
    pub unmatched_animal_age_units: UnmatchedUnits,
    pub unmatched_timepoint_units: UnmatchedUnits,
    pub non_concentration_units: Vec<String>,
    pub malformed_units: Vec<String>,
    pub units: Vec<UnitConversion>,
    pub substances_looked_up: usize,
    pub substances_without_weight: Vec<String>,
    pub failed_lookups: Vec<LookupFailure>,
}

impl CleaningReport {
    pub fn rows_converted(&self) -> usize {
        self.units.iter().map(|unit| unit.converted).sum()
    }

    pub fn unit(&self, unit: &str) -> Option<&UnitConversion> {
        self.units.iter().find(|summary| summary.unit == unit)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
