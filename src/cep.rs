//! Postal code (CEP) validation
//!
//! A CEP is five digits, an optional hyphen, then three digits
//! (`01310-100` or `01310100`). Validation runs at the handler boundary
//! before any upstream call is made.

use std::sync::LazyLock;

use regex::Regex;

use crate::TemperatureError;

// ASCII classes on purpose: `\d` in `regex` also matches non-ASCII digits.
static CEP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}-?[0-9]{3}$").expect("CEP pattern is valid"));

/// Whether `cep` is a syntactically valid postal code
#[must_use]
pub fn is_valid(cep: &str) -> bool {
    CEP_REGEX.is_match(cep)
}

/// Gate a raw postal code, signalling [`TemperatureError::InvalidInput`] when malformed
pub fn validate(cep: &str) -> crate::Result<&str> {
    if is_valid(cep) {
        Ok(cep)
    } else {
        Err(TemperatureError::InvalidInput)
    }
}
