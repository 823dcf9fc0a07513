pub mod cleaner;
pub mod config;
pub mod error;
pub mod frame;
pub mod report;
pub mod row_filter;
pub mod schema;
pub mod substances;
pub mod time_normalizer;
pub mod value_converter;
pub mod weights;

pub use cleaner::{classify_units, Cleaner, CleaningOutcome, UnitClassification};
pub use config::{CleanerConfig, ColumnNames, ConfigError, UnitLabelPolicy};
pub use error::{CleanerError, Result};
pub use report::CleaningReport;
pub use weights::{
    CompoundRecord, LookupAnswer, MolecularWeightLookup, MolecularWeightTable,
    StaticWeightLookup, WeightLookupError, WeightResolver,
};
