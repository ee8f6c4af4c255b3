//! Italian fiscal codes

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static FISCAL_CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{6}[0-9LMNPQRSTUV]{2}[ABCDEHLMPRST][0-9LMNPQRSTUV]{2}[A-Z][0-9LMNPQRSTUV]{3}[A-Z]$")
        .expect("Invalid fiscal code regex")
});

/// A string that is not a well-formed fiscal code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not a valid fiscal code")]
pub struct InvalidFiscalCode(pub String);

/// A syntactically valid fiscal code
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalCode(String);

impl FiscalCode {
    /// Parse and validate a fiscal code
    pub fn parse(value: &str) -> Result<Self, InvalidFiscalCode> {
        if FISCAL_CODE_PATTERN.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidFiscalCode(value.to_string()))
        }
    }

    /// Assemble a code whose place of birth is the reserved `Y` sentinel
    ///
    /// `letters` must be uppercase ASCII letters and `digits` ASCII digits;
    /// the result then matches the fiscal code grammar by construction.
    pub(crate) fn synthetic(letters: [char; 6], digits: [char; 7]) -> Self {
        let d = digits;
        let code: String = letters
            .iter()
            .chain([d[0], d[1], 'A', d[2], d[3], 'Y', d[4], d[5], d[6], 'X'].iter())
            .collect();
        debug_assert!(FISCAL_CODE_PATTERN.is_match(&code), "{} is not a fiscal code", code);
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The four characters encoding the place of birth
    pub fn place_code(&self) -> &str {
        &self.0[11..15]
    }

    /// Whether the place code can denote a real place
    ///
    /// Italian municipalities use `A`..`M`, foreign states `Z`.
    pub fn has_genuine_place_code(&self) -> bool {
        matches!(self.0.as_bytes()[11], b'A'..=b'M' | b'Z')
    }
}

impl TryFrom<String> for FiscalCode {
    type Error = InvalidFiscalCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FiscalCode> for String {
    fn from(code: FiscalCode) -> Self {
        code.0
    }
}

impl FromStr for FiscalCode {
    type Err = InvalidFiscalCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for FiscalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FiscalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
