// crates/etox-core/src/cleaner.rs

use etox_units::{is_concentration_unit, DayConversions, Decomposition};
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{CleanerConfig, ColumnNames};
use crate::error::Result;
use crate::frame::{self, FrameError};
use crate::report::CleaningReport;
use crate::row_filter::remove_invalid_rows;
use crate::substances::substances_for_units;
use crate::time_normalizer::normalize_time_columns;
use crate::value_converter::{convert_values, ClassifiedUnit};
use crate::weights::{MolecularWeightLookup, WeightResolver};

/// Distinct value units of a dataset, split by whether they are convertible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitClassification {
    pub concentration: Vec<ClassifiedUnit>,
    pub other: Vec<String>,
}

impl UnitClassification {
    pub fn concentration_units(&self) -> Vec<&str> {
        self.concentration
            .iter()
            .map(|classified| classified.unit.as_str())
            .collect()
    }
}

pub fn classify_units(
    df: &DataFrame,
    columns: &ColumnNames,
) -> std::result::Result<UnitClassification, FrameError> {
    let mut classification = UnitClassification::default();
    for unit in frame::distinct_strings(df, &columns.value_unit)? {
        if is_concentration_unit(&unit) {
            let classified = ClassifiedUnit::new(unit);
            match &classified.decomposition {
                Decomposition::Tokens(tokens) => {
                    debug!(unit = %classified.unit, %tokens, "concentration unit");
                }
                Decomposition::Malformed(reason) => {
                    warn!(
                        unit = %classified.unit,
                        ?reason,
                        "malformed concentration unit left unconverted"
                    );
                }
            }
            classification.concentration.push(classified);
        } else {
            classification.other.push(unit);
        }
    }
    Ok(classification)
}

#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub dataframe: DataFrame,
    pub report: CleaningReport,
}

/// Runs row filtering, time normalization, unit classification and value
/// conversion over one dataset.
///
/// The weight resolver lives as long as the cleaner, so substances resolved
/// in one pass are not looked up again in the next.
pub struct Cleaner<L> {
    config: CleanerConfig,
    days: DayConversions,
    resolver: WeightResolver<L>,
}

impl<L: MolecularWeightLookup> Cleaner<L> {
    pub fn new(config: CleanerConfig, lookup: L) -> Result<Self> {
        config.validate()?;
        let days = config
            .time_units
            .compile()
            .map_err(crate::config::ConfigError::from)?;
        let resolver = WeightResolver::new(lookup).with_attempts(config.lookup_attempts);
        Ok(Self {
            config,
            days,
            resolver,
        })
    }

    pub fn with_defaults(lookup: L) -> Result<Self> {
        Self::new(CleanerConfig::default(), lookup)
    }

    pub fn resolver(&self) -> &WeightResolver<L> {
        &self.resolver
    }

    pub fn clean(&mut self, df: DataFrame) -> Result<CleaningOutcome> {
        let columns = &self.config.columns;
        let mut report = CleaningReport::default();

        let filtered = remove_invalid_rows(df, &columns.timepoint, &columns.animal_age)?;
        report.rows = filtered.stats;
        info!(
            rows_in = report.rows.rows_in,
            dropped_negative_timepoint = report.rows.dropped_negative_timepoint,
            dropped_missing = report.rows.dropped_missing,
            rows_out = report.rows.rows_out,
            "Filtered invalid rows"
        );
        let mut df = filtered.dataframe;

        let time_stats = normalize_time_columns(&mut df, columns, &self.days)?;
        info!(
            unmatched_animal_age_rows = time_stats.unmatched_animal_age.total_rows(),
            unmatched_timepoint_rows = time_stats.unmatched_timepoint.total_rows(),
            "Normalized time columns to days"
        );
        report.unmatched_animal_age_units = time_stats.unmatched_animal_age;
        report.unmatched_timepoint_units = time_stats.unmatched_timepoint;

        let classification = classify_units(&df, columns)?;
        let concentration_units = classification.concentration_units();
        let substances = substances_for_units(
            &df,
            &columns.parameter,
            &columns.value_unit,
            &concentration_units,
        )?;
        info!(
            concentration_units = concentration_units.len(),
            other_units = classification.other.len(),
            substances = substances.len(),
            "Classified value units"
        );

        let resolution = self.resolver.resolve(substances.iter().map(String::as_str));
        info!(
            resolved = resolution.table.len(),
            not_found = resolution.not_found.len(),
            failed = resolution.failures.len(),
            "Resolved molecular weights"
        );

        let conversions = convert_values(
            &mut df,
            columns,
            &classification.concentration,
            &resolution.table,
            self.config.unit_label_policy,
        )?;

        report.malformed_units = classification
            .concentration
            .iter()
            .filter(|classified| matches!(classified.decomposition, Decomposition::Malformed(_)))
            .map(|classified| classified.unit.clone())
            .collect();
        report.non_concentration_units = classification.other;
        report.substances_looked_up = substances.len();
        report.substances_without_weight = resolution
            .not_found
            .into_iter()
            .chain(resolution.failures.iter().map(|failure| failure.substance.clone()))
            .collect();
        report.failed_lookups = resolution.failures;
        report.units = conversions;

        info!(rows_converted = report.rows_converted(), "Converted concentration values to mM");

        Ok(CleaningOutcome {
            dataframe: df,
            report,
        })
    }
}
