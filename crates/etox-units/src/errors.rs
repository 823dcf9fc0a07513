use thiserror::Error;

use crate::time_units::TimeAxis;

#[derive(Debug, Error)]
pub enum TimeUnitTableError {
    #[error("{axis} rule {rule} must scale by a finite, positive number")]
    InvalidScale { axis: TimeAxis, rule: String },

    #[error("{axis} unit variant {variant:?} is listed more than once")]
    DuplicateVariant { axis: TimeAxis, variant: String },
}
