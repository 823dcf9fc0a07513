//! Day conversion tables for timepoint and animal-age units.
//!
//! Matching is exact: only the listed variants (misspellings included) are
//! recognised, and case is significant.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::TimeUnitTableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAxis {
    AnimalAge,
    Timepoint,
}

impl TimeAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeAxis::AnimalAge => "animal_age",
            TimeAxis::Timepoint => "timepoint",
        }
    }
}

impl fmt::Display for TimeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arithmetic turning a value in some unit into days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayScale {
    Multiply(f64),
    Divide(f64),
}

impl DayScale {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            DayScale::Multiply(factor) => value * factor,
            DayScale::Divide(divisor) => value / divisor,
        }
    }

    fn is_valid(&self) -> bool {
        let operand = match *self {
            DayScale::Multiply(factor) => factor,
            DayScale::Divide(divisor) => divisor,
        };
        operand.is_finite() && operand > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeUnitRule {
    pub name: String,
    pub scale: DayScale,
    pub variants: Vec<String>,
}

impl TimeUnitRule {
    pub fn new(name: &str, scale: DayScale, variants: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            scale,
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Editable unit-string → day-scale mapping for both time axes.
///
/// An axis left out of a deserialized table keeps its default rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeUnitTable {
    pub animal_age: Vec<TimeUnitRule>,
    pub timepoint: Vec<TimeUnitRule>,
}

static DEFAULT_TABLE: Lazy<TimeUnitTable> = Lazy::new(|| TimeUnitTable {
    animal_age: vec![
        TimeUnitRule::new(
            "weeks",
            DayScale::Multiply(7.0),
            &["Weeks", "Week", "weeks", "Weels", "Weeka"],
        ),
        TimeUnitRule::new(
            "months",
            DayScale::Multiply(30.0),
            &["Months", "Month", "Moths", "Monhts"],
        ),
        TimeUnitRule::new("years", DayScale::Multiply(360.0), &["Years", "Year"]),
        TimeUnitRule::new("days", DayScale::Multiply(1.0), &["Days", "Day", "0"]),
    ],
    timepoint: vec![
        TimeUnitRule::new(
            "weeks",
            DayScale::Multiply(7.0),
            &["Weeks", "Week", "WEEK", "week"],
        ),
        TimeUnitRule::new("months", DayScale::Multiply(30.0), &["Months", "Month"]),
        TimeUnitRule::new("years", DayScale::Multiply(360.0), &["Years"]),
        TimeUnitRule::new("hours", DayScale::Divide(24.0), &["Hours"]),
        TimeUnitRule::new("minutes", DayScale::Divide(1440.0), &["Minutes"]),
        TimeUnitRule::new(
            "days",
            DayScale::Multiply(1.0),
            &["Days", "Day", "Day(s)", "day"],
        ),
    ],
});

impl Default for TimeUnitTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl TimeUnitTable {
    pub fn rules(&self, axis: TimeAxis) -> &[TimeUnitRule] {
        match axis {
            TimeAxis::AnimalAge => &self.animal_age,
            TimeAxis::Timepoint => &self.timepoint,
        }
    }

    pub fn validate(&self) -> Result<(), TimeUnitTableError> {
        for axis in [TimeAxis::AnimalAge, TimeAxis::Timepoint] {
            index_axis(axis, self.rules(axis))?;
        }
        Ok(())
    }

    /// Builds the lookup maps used during normalization.
    pub fn compile(&self) -> Result<DayConversions, TimeUnitTableError> {
        Ok(DayConversions {
            animal_age: index_axis(TimeAxis::AnimalAge, &self.animal_age)?,
            timepoint: index_axis(TimeAxis::Timepoint, &self.timepoint)?,
        })
    }
}

fn index_axis(
    axis: TimeAxis,
    rules: &[TimeUnitRule],
) -> Result<HashMap<String, DayScale>, TimeUnitTableError> {
    let mut index = HashMap::new();
    for rule in rules {
        if !rule.scale.is_valid() {
            return Err(TimeUnitTableError::InvalidScale {
                axis,
                rule: rule.name.clone(),
            });
        }
        for variant in &rule.variants {
            if index.insert(variant.clone(), rule.scale).is_some() {
                return Err(TimeUnitTableError::DuplicateVariant {
                    axis,
                    variant: variant.clone(),
                });
            }
        }
    }
    Ok(index)
}

#[derive(Debug, Clone)]
pub struct DayConversions {
    animal_age: HashMap<String, DayScale>,
    timepoint: HashMap<String, DayScale>,
}

impl DayConversions {
    pub fn scale(&self, axis: TimeAxis, unit: &str) -> Option<DayScale> {
        let index = match axis {
            TimeAxis::AnimalAge => &self.animal_age,
            TimeAxis::Timepoint => &self.timepoint,
        };
        index.get(unit).copied()
    }

    /// Converts `value` to days, or `None` when `unit` is not a known variant.
    pub fn to_days(&self, axis: TimeAxis, value: f64, unit: &str) -> Option<f64> {
        self.scale(axis, unit).map(|scale| scale.apply(value))
    }
}
