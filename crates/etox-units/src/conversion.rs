use crate::tokens::{TokenSet, UnitToken};

const MICRO: f64 = 1e-3;
const NANO: f64 = 1e-6;
const PICO: f64 = 1e-9;
const GRAM_TO_MILLIGRAM: f64 = 1000.0;
const MOLE_TO_MILLIMOLE: f64 = 1000.0;
const PER_MILLILITER: f64 = 1e-3;
const PER_DECILITER: f64 = 1e-1;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Converts `value` to millimolar for a unit with the given tokens.
///
/// Steps run in a fixed order: scale, basis, volume divisor, time divisor.
/// Within a step the first listed token present wins, so conflicting tokens
/// on one axis resolve deterministically. Axes without a token pass the value
/// through unchanged.
pub fn to_millimolar(value: f64, molecular_weight: f64, tokens: &TokenSet) -> f64 {
    let mut converted = value;

    if tokens.contains(UnitToken::Micro) {
        converted *= MICRO;
    } else if tokens.contains(UnitToken::Nano) {
        converted *= NANO;
    } else if tokens.contains(UnitToken::Pico) {
        converted *= PICO;
    }

    if tokens.contains(UnitToken::Gram) {
        converted = (converted * GRAM_TO_MILLIGRAM) / molecular_weight;
    } else if tokens.contains(UnitToken::Mole) {
        converted *= MOLE_TO_MILLIMOLE;
    } else if tokens.contains(UnitToken::Milligram) {
        converted /= molecular_weight;
    }

    if tokens.contains(UnitToken::Milliliter) {
        converted *= PER_MILLILITER;
    } else if tokens.contains(UnitToken::Deciliter) {
        converted *= PER_DECILITER;
    }

    if tokens.contains(UnitToken::Minute) {
        converted *= SECONDS_PER_MINUTE;
    }

    converted
}

/// Whether the basis step divides by the molecular weight.
pub fn uses_molecular_weight(tokens: &TokenSet) -> bool {
    tokens.contains(UnitToken::Gram)
        || (!tokens.contains(UnitToken::Mole) && tokens.contains(UnitToken::Milligram))
}
