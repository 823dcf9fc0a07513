use std::collections::HashSet;

use polars::prelude::*;

use crate::frame::{self, FrameError};

/// Distinct substance names measured in any of `units`, in first-seen order.
pub fn substances_for_units(
    df: &DataFrame,
    parameter_column: &str,
    value_unit_column: &str,
    units: &[&str],
) -> Result<Vec<String>, FrameError> {
    let parameters = frame::string_column(df, parameter_column)?;
    let value_units = frame::string_column(df, value_unit_column)?;
    let wanted: HashSet<&str> = units.iter().copied().collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut substances = Vec::new();
    for (parameter, unit) in parameters.into_iter().zip(value_units.into_iter()) {
        let (Some(parameter), Some(unit)) = (parameter, unit) else {
            continue;
        };
        if wanted.contains(unit) && seen.insert(parameter) {
            substances.push(parameter.to_string());
        }
    }

    Ok(substances)
}
