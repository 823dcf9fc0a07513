//! Typed column access for the cleaning stages.

use std::collections::HashSet;

use polars::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("column {0} is missing from the dataset")]
    MissingColumn(String),
    #[error("column {column} has dtype {found}, expected {expected}")]
    UnexpectedType {
        column: String,
        expected: &'static str,
        found: String,
    },
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, FrameError> {
    df.column(name)
        .map_err(|_| FrameError::MissingColumn(name.to_string()))
}

pub fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, FrameError> {
    let column = column(df, name)?;
    match column.dtype() {
        DataType::String => Ok(column.str()?),
        other => Err(FrameError::UnexpectedType {
            column: name.to_string(),
            expected: "str",
            found: other.to_string(),
        }),
    }
}

/// Reads a numeric column as `f64`. NaN is reported as missing.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, FrameError> {
    let column = column(df, name)?;
    if matches!(column.dtype(), DataType::String | DataType::Boolean) {
        return Err(FrameError::UnexpectedType {
            column: name.to_string(),
            expected: "numeric",
            found: column.dtype().to_string(),
        });
    }

    let casted = column.as_materialized_series().cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect();
    Ok(values)
}

/// Distinct non-null values of a string column, in first-seen order.
pub fn distinct_strings(df: &DataFrame, name: &str) -> Result<Vec<String>, FrameError> {
    let values = string_column(df, name)?;
    let mut seen: HashSet<&str> = HashSet::new();
    let mut distinct = Vec::new();
    for value in values.into_iter().flatten() {
        if seen.insert(value) {
            distinct.push(value.to_string());
        }
    }
    Ok(distinct)
}

pub fn set_f64_column(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<f64>>,
) -> Result<(), FrameError> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub fn set_str_column(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<&str>>,
) -> Result<(), FrameError> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}
