pub mod classifier;
pub mod conversion;
pub mod errors;
pub mod time_units;
pub mod tokens;

pub use classifier::{
    concentration_units, decompose, is_concentration_unit, Decomposition, MalformedUnit,
};
pub use conversion::{to_millimolar, uses_molecular_weight};
pub use errors::TimeUnitTableError;
pub use time_units::{DayConversions, DayScale, TimeAxis, TimeUnitRule, TimeUnitTable};
pub use tokens::{TokenSet, UnitToken};

#[cfg(test)]
mod tests;
