use std::collections::BTreeMap;

use etox_units::{DayConversions, TimeAxis};
use polars::prelude::*;
use serde::Serialize;

use crate::config::ColumnNames;
use crate::frame::{self, FrameError};
use crate::schema::{AGE_AT_START_DAYS, TIMEPOINT_AGE_DAYS, TIMEPOINT_DAYS};

/// Unit strings on one axis that no table rule recognised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnmatchedUnits {
    pub by_unit: BTreeMap<String, usize>,
    pub null_unit_rows: usize,
}

impl UnmatchedUnits {
    pub fn total_rows(&self) -> usize {
        self.by_unit.values().sum::<usize>() + self.null_unit_rows
    }

    fn record(&mut self, unit: Option<&str>) {
        match unit {
            Some(unit) => *self.by_unit.entry(unit.to_string()).or_insert(0) += 1,
            None => self.null_unit_rows += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeNormalizationStats {
    pub unmatched_animal_age: UnmatchedUnits,
    pub unmatched_timepoint: UnmatchedUnits,
}

/// Adds `age_at_start_days`, `timepoint_days` and their sum `timepoint_age_days`.
///
/// Rows whose unit matches no variant get a null day value, and the sum is
/// null whenever either addend is.
pub fn normalize_time_columns(
    df: &mut DataFrame,
    columns: &ColumnNames,
    days: &DayConversions,
) -> Result<TimeNormalizationStats, FrameError> {
    let mut stats = TimeNormalizationStats::default();

    let (age_days, timepoint_days) = {
        let ages = frame::float_values(df, &columns.animal_age)?;
        let age_units = frame::string_column(df, &columns.animal_age_unit)?;
        let timepoints = frame::float_values(df, &columns.timepoint)?;
        let timepoint_units = frame::string_column(df, &columns.timepoint_unit)?;

        let age_days = convert_axis(
            days,
            TimeAxis::AnimalAge,
            &ages,
            age_units,
            &mut stats.unmatched_animal_age,
        );
        let timepoint_days = convert_axis(
            days,
            TimeAxis::Timepoint,
            &timepoints,
            timepoint_units,
            &mut stats.unmatched_timepoint,
        );
        (age_days, timepoint_days)
    };

    let totals: Vec<Option<f64>> = age_days
        .iter()
        .zip(timepoint_days.iter())
        .map(|(age, timepoint)| match (age, timepoint) {
            (Some(age), Some(timepoint)) => Some(age + timepoint),
            _ => None,
        })
        .collect();

    frame::set_f64_column(df, AGE_AT_START_DAYS, age_days)?;
    frame::set_f64_column(df, TIMEPOINT_DAYS, timepoint_days)?;
    frame::set_f64_column(df, TIMEPOINT_AGE_DAYS, totals)?;

    Ok(stats)
}

fn convert_axis(
    days: &DayConversions,
    axis: TimeAxis,
    values: &[Option<f64>],
    units: &StringChunked,
    unmatched: &mut UnmatchedUnits,
) -> Vec<Option<f64>> {
    values
        .iter()
        .zip(units.into_iter())
        .map(|(value, unit)| {
            let scale = unit.and_then(|unit| days.scale(axis, unit));
            if scale.is_none() {
                unmatched.record(unit);
            }
            match (value, scale) {
                (Some(value), Some(scale)) => Some(scale.apply(*value)),
                _ => None,
            }
        })
        .collect()
}
