use std::collections::HashMap;

use etox_units::{to_millimolar, uses_molecular_weight, Decomposition, MalformedUnit, TokenSet};
use polars::prelude::*;
use serde::Serialize;

use crate::config::{ColumnNames, UnitLabelPolicy};
use crate::frame::{self, FrameError};
use crate::schema::{AVERAGE_VALUE_FIXED, MILLIMOLAR, UNIT_FIXED};
use crate::weights::MolecularWeightTable;

/// A concentration-like unit string together with its decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedUnit {
    pub unit: String,
    pub decomposition: Decomposition,
}

impl ClassifiedUnit {
    pub fn new(unit: impl Into<String>) -> Self {
        let unit = unit.into();
        let decomposition = etox_units::decompose(&unit);
        Self {
            unit,
            decomposition,
        }
    }
}

/// Per-unit outcome of a conversion pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitConversion {
    pub unit: String,
    pub tokens: Option<TokenSet>,
    pub malformed: Option<MalformedUnit>,
    pub uses_molecular_weight: bool,
    pub rows: usize,
    pub converted: usize,
    pub skipped_unknown_weight: usize,
    pub skipped_missing_value: usize,
    pub skipped_malformed: usize,
}

impl UnitConversion {
    fn for_unit(classified: &ClassifiedUnit) -> Self {
        let tokens = classified.decomposition.tokens().cloned();
        let malformed = match classified.decomposition {
            Decomposition::Malformed(reason) => Some(reason),
            Decomposition::Tokens(_) => None,
        };
        Self {
            unit: classified.unit.clone(),
            uses_molecular_weight: tokens.as_ref().is_some_and(uses_molecular_weight),
            tokens,
            malformed,
            rows: 0,
            converted: 0,
            skipped_unknown_weight: 0,
            skipped_missing_value: 0,
            skipped_malformed: 0,
        }
    }
}

/// Writes `average_value_fixed` (mM) and `unit_fixed` for rows carrying one of `units`.
///
/// A row is converted only when its unit decomposed cleanly, its value is
/// present and its parameter has a weight in `weights`. The `value_unit`
/// column is never modified, so running the pass again on its own output
/// reproduces the same values.
pub fn convert_values(
    df: &mut DataFrame,
    columns: &ColumnNames,
    units: &[ClassifiedUnit],
    weights: &MolecularWeightTable,
    policy: UnitLabelPolicy,
) -> Result<Vec<UnitConversion>, FrameError> {
    let mut summaries: Vec<UnitConversion> = units.iter().map(UnitConversion::for_unit).collect();
    let by_unit: HashMap<&str, usize> = units
        .iter()
        .enumerate()
        .map(|(idx, classified)| (classified.unit.as_str(), idx))
        .collect();

    let (fixed_values, fixed_units) = {
        let values = frame::float_values(df, &columns.value)?;
        let value_units = frame::string_column(df, &columns.value_unit)?;
        let parameters = frame::string_column(df, &columns.parameter)?;

        let mut fixed_values: Vec<Option<f64>> = Vec::with_capacity(values.len());
        let mut fixed_units: Vec<Option<&str>> = Vec::with_capacity(values.len());

        for ((value, unit), parameter) in values
            .iter()
            .zip(value_units.into_iter())
            .zip(parameters.into_iter())
        {
            let Some(idx) = unit.and_then(|unit| by_unit.get(unit).copied()) else {
                fixed_values.push(None);
                fixed_units.push(None);
                continue;
            };
            let summary = &mut summaries[idx];
            summary.rows += 1;

            let Decomposition::Tokens(tokens) = &units[idx].decomposition else {
                summary.skipped_malformed += 1;
                fixed_values.push(None);
                fixed_units.push(None);
                continue;
            };

            let weight = parameter.and_then(|parameter| weights.get(parameter));
            let converted = match (value, weight) {
                (Some(value), Some(weight)) => {
                    summary.converted += 1;
                    Some(to_millimolar(*value, weight, tokens))
                }
                (_, None) => {
                    summary.skipped_unknown_weight += 1;
                    None
                }
                (None, Some(_)) => {
                    summary.skipped_missing_value += 1;
                    None
                }
            };

            let label = match policy {
                UnitLabelPolicy::Tied => converted.map(|_| MILLIMOLAR),
                UnitLabelPolicy::LabelAllRows => Some(MILLIMOLAR),
            };
            fixed_values.push(converted);
            fixed_units.push(label);
        }

        (fixed_values, fixed_units)
    };

    frame::set_f64_column(df, AVERAGE_VALUE_FIXED, fixed_values)?;
    frame::set_str_column(df, UNIT_FIXED, fixed_units)?;

    Ok(summaries)
}
