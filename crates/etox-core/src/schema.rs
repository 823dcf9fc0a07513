// crates/etox-core/src/schema.rs

pub const AGE_AT_START_DAYS: &str = "age_at_start_days";
pub const TIMEPOINT_DAYS: &str = "timepoint_days";
pub const TIMEPOINT_AGE_DAYS: &str = "timepoint_age_days";
pub const AVERAGE_VALUE_FIXED: &str = "average_value_fixed";
pub const UNIT_FIXED: &str = "unit_fixed";

/// Label written to [`UNIT_FIXED`] for converted rows.
pub const MILLIMOLAR: &str = "mM";

pub const DERIVED_COLUMNS: [&str; 5] = [
    AGE_AT_START_DAYS,
    TIMEPOINT_DAYS,
    TIMEPOINT_AGE_DAYS,
    AVERAGE_VALUE_FIXED,
    UNIT_FIXED,
];
