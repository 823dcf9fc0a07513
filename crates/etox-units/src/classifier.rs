//! Free-text value units: concentration detection and token decomposition.
//!
//! Both stages are table driven. Detection is a flat list of [`Matcher`]s,
//! any of which marks a unit as concentration-like. Decomposition picks a
//! [`Layout`] by the number of `/`-separated parts and evaluates each of its
//! rule groups independently; within a group the first matching rule decides
//! the token.

use serde::Serialize;
use tracing::debug;

use crate::tokens::{TokenSet, UnitToken};

/// A single detection test against a raw unit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Substring of the lowercased unit.
    Contains(&'static str),
    /// Prefix of the lowercased unit.
    StartsWith(&'static str),
    /// Prefix of the lowercased unit once leading `(` are removed.
    StartsWithAfterParen(&'static str),
    /// Case-sensitive substring.
    ContainsExact(&'static str),
    /// Case-sensitive prefix.
    StartsWithExact(&'static str),
}

impl Matcher {
    fn matches(&self, raw: &str, lower: &str) -> bool {
        match *self {
            Matcher::Contains(needle) => lower.contains(needle),
            Matcher::StartsWith(prefix) => lower.starts_with(prefix),
            Matcher::StartsWithAfterParen(prefix) => {
                lower.trim_start_matches('(').starts_with(prefix)
            }
            Matcher::ContainsExact(needle) => raw.contains(needle),
            Matcher::StartsWithExact(prefix) => raw.starts_with(prefix),
        }
    }
}

// Misspellings ("pmoi", "nrnol/L", "MAEQ/L") occur in the source data and are
// matched literally.
pub const CONCENTRATION_MATCHERS: &[Matcher] = &[
    Matcher::Contains("mg"),
    Matcher::StartsWithAfterParen("g"),
    Matcher::Contains("mol"),
    Matcher::Contains("milligrams"),
    Matcher::StartsWith("ng"),
    Matcher::StartsWith("ug"),
    Matcher::Contains("pg"),
    Matcher::Contains("ratio"),
    Matcher::StartsWith("mm"),
    Matcher::StartsWith("mcg"),
    Matcher::Contains("m g "),
    Matcher::StartsWith("mcm"),
    Matcher::Contains("microg"),
    Matcher::StartsWith("um"),
    Matcher::StartsWith("nm"),
    Matcher::Contains("pmoi"),
    Matcher::StartsWithExact("MNOL"),
    Matcher::ContainsExact("nrnol/L"),
    Matcher::Contains("m e q"),
    Matcher::Contains("meq"),
    Matcher::ContainsExact("MAEQ/L"),
    Matcher::ContainsExact("ME Q/L"),
];

pub fn is_concentration_unit(unit: &str) -> bool {
    let lower = unit.to_lowercase();
    CONCENTRATION_MATCHERS
        .iter()
        .any(|matcher| matcher.matches(unit, &lower))
}

/// Returns the concentration-like units among `units`, deduplicated, in first-seen order.
pub fn concentration_units<'a, I>(units: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut selected: Vec<&'a str> = Vec::new();
    for unit in units {
        if !selected.contains(&unit) && is_concentration_unit(unit) {
            selected.push(unit);
        }
    }
    selected
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Numerator,
    Middle,
    Denominator,
}

/// How a part is rewritten before it is tested. Every form starts from the
/// lowercased part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Lower,
    /// Strips each listed character from the front, one after another.
    TrimLeading(&'static [char]),
    /// Spaces removed.
    Compact,
    /// Spaces removed, then `gm` rewritten to `mg`.
    CompactMg,
}

impl Form {
    fn apply(&self, lower: &str) -> String {
        match *self {
            Form::Lower => lower.to_string(),
            Form::TrimLeading(chars) => chars
                .iter()
                .fold(lower, |acc, c| acc.trim_start_matches(*c))
                .to_string(),
            Form::Compact => lower.replace(' ', ""),
            Form::CompactMg => lower.replace(' ', "").replace("gm", "mg"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Test {
    Contains(&'static str),
    StartsWith(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    part: Part,
    form: Form,
    test: Test,
    token: UnitToken,
}

impl Rule {
    fn matches(&self, parts: &[String]) -> bool {
        let index = match self.part {
            Part::Numerator => 0,
            Part::Middle => 1,
            Part::Denominator => parts.len() - 1,
        };
        let Some(part) = parts.get(index) else {
            return false;
        };
        let probed = self.form.apply(part);
        match self.test {
            Test::Contains(needle) => probed.contains(needle),
            Test::StartsWith(prefix) => probed.starts_with(prefix),
        }
    }
}

const fn rule(part: Part, form: Form, test: Test, token: UnitToken) -> Rule {
    Rule {
        part,
        form,
        test,
        token,
    }
}

/// Rules competing for one decision; the first match wins.
#[derive(Debug)]
struct RuleGroup {
    name: &'static str,
    rules: &'static [Rule],
}

impl RuleGroup {
    fn decide(&self, parts: &[String]) -> Option<UnitToken> {
        self.rules
            .iter()
            .find(|rule| rule.matches(parts))
            .map(|rule| rule.token)
    }
}

#[derive(Debug)]
struct Layout {
    arity: usize,
    groups: &'static [RuleGroup],
}

use Form::{Compact, CompactMg, Lower, TrimLeading};
use Part::{Denominator, Middle, Numerator};
use Test::{Contains, StartsWith};
use UnitToken::{Deciliter, Gram, Micro, Milligram, Milliliter, Minute, Mole, Nano, Pico};

const NO_PAREN: &[char] = &['('];
const NO_MARKERS: &[char] = &['?', '*', '<'];

static SINGLE: Layout = Layout {
    arity: 1,
    groups: &[
        RuleGroup {
            name: "scale",
            rules: &[
                rule(Numerator, Lower, StartsWith("n"), Nano),
                rule(Numerator, Lower, StartsWith("u"), Micro),
                rule(Numerator, Lower, Contains("micro"), Micro),
            ],
        },
        RuleGroup {
            name: "mass",
            rules: &[
                rule(Numerator, Lower, StartsWith("g"), Gram),
                rule(Numerator, Lower, StartsWith("mg"), Milligram),
            ],
        },
        RuleGroup {
            name: "divisor",
            rules: &[
                rule(Numerator, Lower, Contains("%"), Deciliter),
                rule(Numerator, Compact, Contains("100ml"), Deciliter),
            ],
        },
    ],
};

static RATIO: Layout = Layout {
    arity: 2,
    groups: &[
        RuleGroup {
            name: "scale",
            rules: &[
                rule(Numerator, Lower, Contains("u"), Micro),
                rule(Numerator, Lower, StartsWith("mc"), Micro),
                rule(Numerator, Lower, Contains("micro"), Micro),
                rule(Numerator, Lower, StartsWith("p"), Pico),
                rule(Numerator, Lower, StartsWith("n"), Nano),
            ],
        },
        RuleGroup {
            name: "molar",
            rules: &[rule(Numerator, TrimLeading(NO_MARKERS), StartsWith("mol"), Mole)],
        },
        RuleGroup {
            name: "mass",
            rules: &[
                rule(Numerator, CompactMg, StartsWith("mg"), Milligram),
                rule(Numerator, Lower, StartsWith("mk"), Milligram),
                rule(Numerator, Lower, Contains("milligrams"), Milligram),
                rule(Numerator, TrimLeading(NO_PAREN), StartsWith("g"), Gram),
            ],
        },
        RuleGroup {
            name: "volume",
            rules: &[
                rule(Denominator, Lower, Contains("dl"), Deciliter),
                rule(Denominator, Lower, Contains("deciliter"), Deciliter),
                rule(Denominator, Compact, Contains("100ml"), Deciliter),
                rule(Denominator, Lower, Contains("ml"), Milliliter),
            ],
        },
    ],
};

static RATE: Layout = Layout {
    arity: 3,
    groups: &[
        RuleGroup {
            name: "scale",
            rules: &[
                rule(Numerator, Lower, Contains("n"), Nano),
                rule(Numerator, Lower, Contains("u"), Micro),
            ],
        },
        RuleGroup {
            name: "middle",
            rules: &[
                rule(Middle, Lower, Contains("min"), Minute),
                rule(Middle, Lower, Contains("ml"), Milliliter),
            ],
        },
        RuleGroup {
            name: "last",
            rules: &[
                rule(Denominator, Lower, Contains("min"), Minute),
                rule(Denominator, Lower, StartsWith("g"), Gram),
            ],
        },
    ],
};

static LAYOUTS: [&Layout; 3] = [&SINGLE, &RATIO, &RATE];

/// Why a unit string could not be decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "parts")]
pub enum MalformedUnit {
    Empty,
    TooManyParts(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decomposition {
    Tokens(TokenSet),
    Malformed(MalformedUnit),
}

impl Decomposition {
    pub fn tokens(&self) -> Option<&TokenSet> {
        match self {
            Decomposition::Tokens(tokens) => Some(tokens),
            Decomposition::Malformed(_) => None,
        }
    }
}

/// Splits a concentration-like unit on `/` and decides its tokens.
///
/// Axes with no matching rule contribute nothing, so a well-formed unit may
/// yield an empty [`TokenSet`]. Blank strings and strings with more than
/// three parts are reported as [`Decomposition::Malformed`].
pub fn decompose(unit: &str) -> Decomposition {
    if unit.trim().is_empty() {
        return Decomposition::Malformed(MalformedUnit::Empty);
    }

    let parts: Vec<String> = unit.split('/').map(str::to_lowercase).collect();
    let Some(layout) = LAYOUTS.iter().find(|layout| layout.arity == parts.len()) else {
        return Decomposition::Malformed(MalformedUnit::TooManyParts(parts.len()));
    };

    let mut tokens = TokenSet::new();
    for group in layout.groups {
        if let Some(token) = group.decide(&parts) {
            debug!(unit, group = group.name, token = token.as_str(), "unit token decided");
            tokens.insert(token);
        }
    }

    Decomposition::Tokens(tokens)
}
