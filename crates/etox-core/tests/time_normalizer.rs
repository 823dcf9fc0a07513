use etox_core::schema::{AGE_AT_START_DAYS, TIMEPOINT_AGE_DAYS, TIMEPOINT_DAYS};
use etox_core::time_normalizer::normalize_time_columns;
use etox_core::ColumnNames;
use etox_units::TimeUnitTable;
use polars::prelude::*;

fn observations() -> PolarsResult<DataFrame> {
    df!(
        "timepoint" => &[3.0f64, 2.0, 1.0, 4.0, 0.0],
        "timepoint_unit" => &[Some("Hours"), Some("Weeks"), Some("Fortnights"), Some("Days"), Some("Minutes")],
        "animal_age" => &[2.0f64, 1.0, 6.0, 5.0, 1.0],
        "animal_age_unit" => &[Some("Weeks"), Some("Months"), Some("Weeka"), None, Some("Years")],
    )
}

#[test]
fn converts_both_axes_to_days() -> anyhow::Result<()> {
    let mut df = observations()?;
    let days = TimeUnitTable::default().compile()?;

    normalize_time_columns(&mut df, &ColumnNames::default(), &days)?;

    let age = df.column(AGE_AT_START_DAYS)?.f64()?;
    assert_eq!(age.get(0), Some(14.0));
    assert_eq!(age.get(1), Some(30.0));
    assert_eq!(age.get(2), Some(42.0));
    assert_eq!(age.get(3), None);
    assert_eq!(age.get(4), Some(360.0));

    let timepoint = df.column(TIMEPOINT_DAYS)?.f64()?;
    assert_eq!(timepoint.get(0), Some(0.125));
    assert_eq!(timepoint.get(1), Some(14.0));
    assert_eq!(timepoint.get(2), None);
    assert_eq!(timepoint.get(3), Some(4.0));
    assert_eq!(timepoint.get(4), Some(0.0));

    let total = df.column(TIMEPOINT_AGE_DAYS)?.f64()?;
    assert_eq!(total.get(0), Some(14.125));
    assert_eq!(total.get(1), Some(44.0));
    assert_eq!(total.get(2), None);
    assert_eq!(total.get(3), None);
    assert_eq!(total.get(4), Some(360.0));
    Ok(())
}

#[test]
fn total_is_sum_whenever_both_parts_exist() -> anyhow::Result<()> {
    let mut df = observations()?;
    let days = TimeUnitTable::default().compile()?;
    normalize_time_columns(&mut df, &ColumnNames::default(), &days)?;

    let age = df.column(AGE_AT_START_DAYS)?.f64()?;
    let timepoint = df.column(TIMEPOINT_DAYS)?.f64()?;
    let total = df.column(TIMEPOINT_AGE_DAYS)?.f64()?;

    for idx in 0..df.height() {
        match (age.get(idx), timepoint.get(idx)) {
            (Some(a), Some(t)) => assert_eq!(total.get(idx), Some(a + t)),
            _ => assert_eq!(total.get(idx), None),
        }
    }
    Ok(())
}

#[test]
fn counts_unmatched_units() -> anyhow::Result<()> {
    let mut df = observations()?;
    let days = TimeUnitTable::default().compile()?;

    let stats = normalize_time_columns(&mut df, &ColumnNames::default(), &days)?;

    assert_eq!(stats.unmatched_timepoint.by_unit.get("Fortnights"), Some(&1));
    assert_eq!(stats.unmatched_timepoint.total_rows(), 1);
    assert!(stats.unmatched_animal_age.by_unit.is_empty());
    assert_eq!(stats.unmatched_animal_age.null_unit_rows, 1);
    Ok(())
}

#[test]
fn case_variants_outside_the_table_stay_unmatched() -> anyhow::Result<()> {
    let mut df = df!(
        "timepoint" => &[1.0f64, 1.0],
        "timepoint_unit" => &["weeks", "hours"],
        "animal_age" => &[1.0f64, 1.0],
        "animal_age_unit" => &["WEEKS", "weeks"],
    )?;
    let days = TimeUnitTable::default().compile()?;

    let stats = normalize_time_columns(&mut df, &ColumnNames::default(), &days)?;

    let age = df.column(AGE_AT_START_DAYS)?.f64()?;
    assert_eq!(age.get(0), None);
    assert_eq!(age.get(1), Some(7.0));
    assert_eq!(df.column(TIMEPOINT_DAYS)?.null_count(), 2);
    assert_eq!(stats.unmatched_timepoint.total_rows(), 2);
    Ok(())
}

#[test]
fn rerunning_replaces_derived_columns() -> anyhow::Result<()> {
    let mut df = observations()?;
    let days = TimeUnitTable::default().compile()?;
    let columns = ColumnNames::default();

    normalize_time_columns(&mut df, &columns, &days)?;
    let width = df.width();
    let first = df.clone();
    normalize_time_columns(&mut df, &columns, &days)?;

    assert_eq!(df.width(), width);
    assert!(df.equals_missing(&first));
    Ok(())
}
