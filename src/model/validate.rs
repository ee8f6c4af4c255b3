//! Decode and validation layer for fixture payloads

use std::fmt;
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex"));

/// One failed field of a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the field, `$` for the payload itself
    pub path: String,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Every field-level failure found while decoding a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct DecodeReport {
    pub entity: &'static str,
    pub errors: Vec<FieldError>,
}

impl fmt::Display for DecodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot decode {} payload:", self.entity)?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

/// Schema constraints serde alone cannot express
pub trait Validate {
    fn validate(&self, violations: &mut Violations);
}

/// Collects field errors while a value is validated
#[derive(Debug, Default)]
pub struct Violations {
    prefix: Vec<String>,
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix.join("."), field)
        }
    }

    /// Record a failure on a field
    pub fn push(&mut self, field: &str, reason: impl Into<String>) {
        let path = self.path(field);
        self.errors.push(FieldError {
            path,
            reason: reason.into(),
        });
    }

    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        }
    }

    pub fn in_range<T: PartialOrd + fmt::Display>(&mut self, field: &str, value: T, min: T, max: T) {
        if value < min || value > max {
            self.push(field, format!("{} is outside [{}, {}]", value, min, max));
        }
    }

    /// Length in characters, not bytes
    pub fn char_length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.push(field, format!("length {} is outside [{}, {}]", len, min, max));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !EMAIL_PATTERN.is_match(value) {
            self.push(field, format!("{:?} is not an email address", value));
        }
    }

    pub fn http_url(&mut self, field: &str, value: &str) {
        match url::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => self.push(field, format!("{:?} is not an absolute http(s) url", value)),
        }
    }

    pub fn cidr(&mut self, field: &str, value: &str) {
        if !is_cidr(value) {
            self.push(field, format!("{:?} is not a CIDR block", value));
        }
    }

    /// Validate a nested value with its errors reported under `field`
    pub fn nested<V: Validate + ?Sized>(&mut self, field: &str, value: &V) {
        self.prefix.push(field.to_string());
        value.validate(self);
        self.prefix.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

fn is_cidr(value: &str) -> bool {
    let Some((address, prefix)) = value.split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => prefix <= 32,
        Ok(IpAddr::V6(_)) => prefix <= 128,
        Err(_) => false,
    }
}

/// Decode a JSON payload into `T` and check its constraints
pub fn decode<T>(entity: &'static str, payload: Value) -> Result<T, DecodeReport>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(payload).map_err(|err| DecodeReport {
        entity,
        errors: vec![FieldError {
            path: "$".to_string(),
            reason: err.to_string(),
        }],
    })?;

    let mut violations = Violations::new();
    value.validate(&mut violations);
    if violations.is_empty() {
        Ok(value)
    } else {
        Err(DecodeReport {
            entity,
            errors: violations.into_errors(),
        })
    }
}
