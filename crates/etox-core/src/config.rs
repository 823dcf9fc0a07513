// crates/etox-core/src/config.rs

use std::path::{Path, PathBuf};

use etox_units::{TimeUnitTable, TimeUnitTableError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::DERIVED_COLUMNS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid time unit table: {0}")]
    TimeUnits(#[from] TimeUnitTableError),
    #[error("lookup_attempts must be at least 1")]
    InvalidLookupAttempts,
    #[error("column {0} is configured for more than one input field")]
    DuplicateColumn(String),
    #[error("input column {0} collides with a derived output column")]
    ReservedColumn(String),
}

/// Names of the seven input fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub timepoint: String,
    pub timepoint_unit: String,
    pub animal_age: String,
    pub animal_age_unit: String,
    pub parameter: String,
    pub value: String,
    pub value_unit: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            timepoint: "timepoint".to_string(),
            timepoint_unit: "timepoint_unit".to_string(),
            animal_age: "animal_age".to_string(),
            animal_age_unit: "animal_age_unit".to_string(),
            parameter: "parameter".to_string(),
            value: "value".to_string(),
            value_unit: "value_unit".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn all(&self) -> [&str; 7] {
        [
            self.timepoint.as_str(),
            self.timepoint_unit.as_str(),
            self.animal_age.as_str(),
            self.animal_age_unit.as_str(),
            self.parameter.as_str(),
            self.value.as_str(),
            self.value_unit.as_str(),
        ]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let names = self.all();
        for (idx, name) in names.iter().enumerate() {
            if names[..idx].contains(name) {
                return Err(ConfigError::DuplicateColumn(name.to_string()));
            }
            if DERIVED_COLUMNS.contains(name) {
                return Err(ConfigError::ReservedColumn(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Which rows of a concentration-like unit receive the "mM" label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitLabelPolicy {
    /// Label only rows that also receive a converted value.
    #[default]
    Tied,
    /// Label every row carrying the unit, converted or not.
    LabelAllRows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub columns: ColumnNames,
    pub time_units: TimeUnitTable,
    pub unit_label_policy: UnitLabelPolicy,
    pub lookup_attempts: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            time_units: TimeUnitTable::default(),
            unit_label_policy: UnitLabelPolicy::default(),
            lookup_attempts: 1,
        }
    }
}

impl CleanerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CleanerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup_attempts == 0 {
            return Err(ConfigError::InvalidLookupAttempts);
        }
        self.columns.validate()?;
        self.time_units.validate()?;
        Ok(())
    }
}
