use std::fmt;

use serde::Serialize;

/// One component of a decomposed concentration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitToken {
    Micro,
    Nano,
    Pico,
    Gram,
    Milligram,
    Mole,
    Milliliter,
    Deciliter,
    Minute,
}

impl UnitToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitToken::Micro => "micro",
            UnitToken::Nano => "nano",
            UnitToken::Pico => "pico",
            UnitToken::Gram => "gram",
            UnitToken::Milligram => "milligram",
            UnitToken::Mole => "mole",
            UnitToken::Milliliter => "milliliter",
            UnitToken::Deciliter => "deciliter",
            UnitToken::Minute => "minute",
        }
    }
}

impl fmt::Display for UnitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens decided for a unit string, in the order they were decided.
///
/// A token appears at most once. Conflicting tokens for the same step are kept
/// side by side; [`crate::conversion`] resolves them by a fixed precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenSet(Vec<UnitToken>);

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: UnitToken) {
        if !self.0.contains(&token) {
            self.0.push(token);
        }
    }

    pub fn contains(&self, token: UnitToken) -> bool {
        self.0.contains(&token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UnitToken> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<UnitToken> for TokenSet {
    fn from_iter<I: IntoIterator<Item = UnitToken>>(iter: I) -> Self {
        let mut set = TokenSet::new();
        for token in iter {
            set.insert(token);
        }
        set
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|token| token.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
