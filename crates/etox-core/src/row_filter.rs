use polars::prelude::*;
use serde::Serialize;

use crate::frame::{self, FrameError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowFilterStats {
    pub rows_in: usize,
    pub dropped_negative_timepoint: usize,
    pub dropped_missing: usize,
    pub rows_out: usize,
}

#[derive(Debug, Clone)]
pub struct RowFilterResult {
    pub dataframe: DataFrame,
    pub stats: RowFilterStats,
}

/// Drops rows with a negative timepoint, then rows missing a timepoint or an animal age.
///
/// Zero timepoints are kept. Negative animal ages are not inspected.
pub fn remove_invalid_rows(
    df: DataFrame,
    timepoint_column: &str,
    animal_age_column: &str,
) -> Result<RowFilterResult, FrameError> {
    let timepoints = frame::float_values(&df, timepoint_column)?;
    let ages = frame::float_values(&df, animal_age_column)?;

    let mut stats = RowFilterStats {
        rows_in: df.height(),
        ..RowFilterStats::default()
    };
    let mut keep = Vec::with_capacity(df.height());

    for (timepoint, age) in timepoints.iter().zip(ages.iter()) {
        let retained = match (timepoint, age) {
            (Some(t), _) if *t < 0.0 => {
                stats.dropped_negative_timepoint += 1;
                false
            }
            (Some(_), Some(_)) => true,
            _ => {
                stats.dropped_missing += 1;
                false
            }
        };
        keep.push(retained);
    }

    let mask = Series::new("keep".into(), keep);
    let dataframe = df.filter(mask.bool()?)?;
    stats.rows_out = dataframe.height();

    Ok(RowFilterResult { dataframe, stats })
}
