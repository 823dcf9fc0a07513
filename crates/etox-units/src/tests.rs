use crate::classifier::{concentration_units, decompose, is_concentration_unit};
use crate::conversion::{to_millimolar, uses_molecular_weight};
use crate::time_units::{DayScale, TimeAxis, TimeUnitRule, TimeUnitTable};
use crate::tokens::{TokenSet, UnitToken};
use crate::{Decomposition, MalformedUnit, TimeUnitTableError};

use UnitToken::*;

fn tokens_of(unit: &str) -> TokenSet {
    match decompose(unit) {
        Decomposition::Tokens(tokens) => tokens,
        Decomposition::Malformed(reason) => panic!("{unit:?} was malformed: {reason:?}"),
    }
}

fn set(tokens: &[UnitToken]) -> TokenSet {
    tokens.iter().copied().collect()
}

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-12_f64.max(expected.abs() * 1e-12);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn detects_concentration_units() {
    for unit in [
        "mg/dL", "g/dL", "(g/L)", "mmol/L", "ng/mL", "ug/mL", "pg/mL", "ratio", "mcg/mL",
        "MNOL/L", "nrnol/L", "mEq/L", "MAEQ/L", "ME Q/L", "pmoi/L", "umol/L", "nmol/L",
    ] {
        assert!(is_concentration_unit(unit), "{unit} should be concentration-like");
    }
}

#[test]
fn detects_spelled_out_and_spaced_units() {
    // Each of these is caught by exactly one detection rule.
    for unit in ["microg/mL", "m g /dL", "milligrams/dL", "mcm/L"] {
        assert!(is_concentration_unit(unit), "{unit} should be concentration-like");
    }
}

#[test]
fn leaves_other_units_alone() {
    for unit in ["U/L", "%", "IU/L", "sec", "10^3/uL", "x10E9/L", ""] {
        assert!(!is_concentration_unit(unit), "{unit} should not be concentration-like");
    }
}

#[test]
fn typo_matchers_are_case_sensitive() {
    assert!(is_concentration_unit("MNOL/L"));
    assert!(!is_concentration_unit("mnol/L"));
    assert!(is_concentration_unit("nrnol/L"));
    assert!(!is_concentration_unit("NRNOL/L"));
}

#[test]
fn concentration_units_dedupes_in_first_seen_order() {
    let units = ["U/L", "mg/dL", "ng/mL", "mg/dL", "%"];
    assert_eq!(concentration_units(units), vec!["mg/dL", "ng/mL"]);
}

#[test]
fn decomposes_numerator_denominator_units() {
    assert_eq!(tokens_of("mg/dL"), set(&[Milligram, Deciliter]));
    assert_eq!(tokens_of("ug/mL"), set(&[Micro, Milliliter]));
    assert_eq!(tokens_of("ng/mL"), set(&[Nano, Milliliter]));
    assert_eq!(tokens_of("pg/mL"), set(&[Pico, Milliliter]));
    assert_eq!(tokens_of("mcg/mL"), set(&[Micro, Milliliter]));
    assert_eq!(tokens_of("g/L"), set(&[Gram]));
    assert_eq!(tokens_of("(g/L)"), set(&[Gram]));
    assert_eq!(tokens_of("mol/L"), set(&[Mole]));
    assert_eq!(tokens_of("*mol/L"), set(&[Mole]));
    assert_eq!(tokens_of("umol/L"), set(&[Micro]));
    assert_eq!(tokens_of("gm/100 mL"), set(&[Milligram, Deciliter]));
    assert_eq!(tokens_of("mg/deciliter"), set(&[Milligram, Deciliter]));
}

#[test]
fn decomposes_irregular_milligram_spellings() {
    assert_eq!(tokens_of("m g /dL"), set(&[Milligram, Deciliter]));
    assert_eq!(tokens_of("milligrams/dL"), set(&[Milligram, Deciliter]));
    assert_eq!(tokens_of("mkg/L"), set(&[Milligram]));
    assert_eq!(tokens_of("microg/mL"), set(&[Micro, Milliliter]));
}

#[test]
fn millimolar_units_decompose_to_nothing() {
    assert!(tokens_of("mmol/L").is_empty());
    assert!(tokens_of("mEq/L").is_empty());
}

#[test]
fn decomposes_rate_units() {
    assert_eq!(tokens_of("nmol/min/mg"), set(&[Nano, Minute]));
    assert_eq!(tokens_of("umol/min/g"), set(&[Micro, Minute, Gram]));
    assert_eq!(tokens_of("ug/mL/min"), set(&[Micro, Milliliter, Minute]));
}

#[test]
fn decomposes_single_part_units() {
    assert_eq!(tokens_of("mg%"), set(&[Milligram, Deciliter]));
    assert_eq!(tokens_of("g%"), set(&[Gram, Deciliter]));
    assert_eq!(tokens_of("ng"), set(&[Nano]));
    assert_eq!(tokens_of("microg"), set(&[Micro]));
    assert_eq!(tokens_of("mg per 100 ml"), set(&[Milligram, Deciliter]));
}

#[test]
fn malformed_units_are_reported() {
    assert_eq!(decompose(""), Decomposition::Malformed(MalformedUnit::Empty));
    assert_eq!(decompose("   "), Decomposition::Malformed(MalformedUnit::Empty));
    assert_eq!(
        decompose("mg/kg/day/mL"),
        Decomposition::Malformed(MalformedUnit::TooManyParts(4))
    );
}

#[test]
fn decomposition_is_stable() {
    for unit in ["mg/dL", "umol/min/g", "ng", "mmol/L", "a/b/c/d"] {
        assert_eq!(decompose(unit), decompose(unit));
    }
}

#[test]
fn converts_mass_per_volume_units() {
    let glucose = 180.16;
    assert_close(
        to_millimolar(50.0, glucose, &tokens_of("mg/dL")),
        50.0 / glucose * 1e-1,
    );
    assert!((to_millimolar(50.0, glucose, &tokens_of("mg/dL")) - 0.02775).abs() < 1e-5);

    assert_close(to_millimolar(1.8016, glucose, &tokens_of("g/L")), 10.0);
    assert_close(to_millimolar(10.0, 500.0, &tokens_of("ug/mL")), 10.0 * 1e-3 * 1e-3);
    assert_close(to_millimolar(10.0, 500.0, &tokens_of("ng/mL")), 10.0 * 1e-6 * 1e-3);
    let pico = to_millimolar(1.0, 500.0, &tokens_of("pg/mL"));
    assert!((pico - 1e-12).abs() < 1e-24, "expected 1e-12, got {pico}");
}

#[test]
fn converts_molar_and_rate_units() {
    assert_close(to_millimolar(0.5, 42.0, &tokens_of("mol/L")), 500.0);
    assert_close(to_millimolar(7.0, 42.0, &tokens_of("umol/L")), 7.0 * 1e-3);
    assert_close(to_millimolar(2.0, 100.0, &tokens_of("umol/min/g")), 1.2);
}

#[test]
fn empty_tokens_pass_the_value_through() {
    assert_close(to_millimolar(3.3, 180.16, &TokenSet::new()), 3.3);
}

#[test]
fn conflicting_tokens_resolve_by_precedence() {
    assert_close(
        to_millimolar(1.0, 10.0, &set(&[Milligram, Gram])),
        1000.0 / 10.0,
    );
    assert_close(to_millimolar(1.0, 10.0, &set(&[Nano, Micro])), 1e-3);
    assert_close(
        to_millimolar(1.0, 10.0, &set(&[Deciliter, Milliliter])),
        1e-3,
    );
}

#[test]
fn molecular_weight_usage_follows_basis() {
    assert!(uses_molecular_weight(&set(&[Gram])));
    assert!(uses_molecular_weight(&set(&[Milligram, Deciliter])));
    assert!(!uses_molecular_weight(&set(&[Mole, Milligram])));
    assert!(!uses_molecular_weight(&TokenSet::new()));
}

#[test]
fn default_time_table_converts_to_days() {
    let days = TimeUnitTable::default().compile().expect("default table compiles");

    assert_eq!(days.to_days(TimeAxis::AnimalAge, 2.0, "Weeks"), Some(14.0));
    assert_eq!(days.to_days(TimeAxis::AnimalAge, 3.0, "Monhts"), Some(90.0));
    assert_eq!(days.to_days(TimeAxis::AnimalAge, 1.0, "Year"), Some(360.0));
    assert_eq!(days.to_days(TimeAxis::AnimalAge, 5.0, "0"), Some(5.0));
    assert_eq!(days.to_days(TimeAxis::Timepoint, 3.0, "Hours"), Some(0.125));
    assert_eq!(days.to_days(TimeAxis::Timepoint, 1440.0, "Minutes"), Some(1.0));
    assert_eq!(days.to_days(TimeAxis::Timepoint, 2.0, "WEEK"), Some(14.0));
    assert_eq!(days.to_days(TimeAxis::Timepoint, 4.0, "Day(s)"), Some(4.0));
}

#[test]
fn time_variants_match_exactly() {
    let days = TimeUnitTable::default().compile().expect("default table compiles");

    assert_eq!(days.to_days(TimeAxis::Timepoint, 1.0, "weeks"), None);
    assert_eq!(days.to_days(TimeAxis::AnimalAge, 1.0, "WEEKS"), None);
    assert_eq!(days.to_days(TimeAxis::AnimalAge, 1.0, "Day(s)"), None);
    assert_eq!(days.to_days(TimeAxis::AnimalAge, 1.0, "Hours"), None);
}

#[test]
fn rejects_duplicate_variants() {
    let table = TimeUnitTable {
        animal_age: vec![
            TimeUnitRule::new("days", DayScale::Multiply(1.0), &["Days"]),
            TimeUnitRule::new("also_days", DayScale::Multiply(1.0), &["Days"]),
        ],
        timepoint: Vec::new(),
    };

    match table.validate() {
        Err(TimeUnitTableError::DuplicateVariant { axis, variant }) => {
            assert_eq!(axis, TimeAxis::AnimalAge);
            assert_eq!(variant, "Days");
        }
        other => panic!("expected duplicate variant error, got {other:?}"),
    }
}

#[test]
fn rejects_non_positive_scales() {
    let table = TimeUnitTable {
        animal_age: Vec::new(),
        timepoint: vec![TimeUnitRule::new("hours", DayScale::Divide(0.0), &["Hours"])],
    };

    assert!(matches!(
        table.compile(),
        Err(TimeUnitTableError::InvalidScale { axis: TimeAxis::Timepoint, .. })
    ));
}

#[test]
fn time_table_loads_from_toml() {
    let table: TimeUnitTable = toml::from_str(
        r#"
        [[animal_age]]
        name = "weeks"
        scale = { multiply = 7.0 }
        variants = ["Weeks", "wks"]

        [[timepoint]]
        name = "hours"
        scale = { divide = 24.0 }
        variants = ["Hours", "hrs"]
        "#,
    )
    .expect("table parses");

    let days = table.compile().expect("table compiles");
    assert_eq!(days.to_days(TimeAxis::AnimalAge, 2.0, "wks"), Some(14.0));
    assert_eq!(days.to_days(TimeAxis::Timepoint, 12.0, "hrs"), Some(0.5));
    assert_eq!(days.to_days(TimeAxis::Timepoint, 1.0, "Days"), None);
}
