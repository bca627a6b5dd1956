//! Product code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum ProductCodeError {
    /// The input string is empty or whitespace only.
    #[error("product code cannot be empty")]
    Empty,
}

/// A business identifier for one catalog item.
///
/// Codes come from the source table's code column (or its first column when
/// no code column exists), so they are free-form strings. The only structural
/// guarantee is that a code is never empty: the loader skips rows whose code
/// would be blank.
///
/// ## Examples
///
/// ```
/// use resale_core::ProductCode;
///
/// assert!(ProductCode::parse("T-0042").is_ok());
/// assert!(ProductCode::parse("  T-0042  ").is_ok()); // trimmed
/// assert!(ProductCode::parse("").is_err());
/// assert!(ProductCode::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    /// Parse a `ProductCode` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ProductCodeError::Empty`] if the trimmed input is empty.
    pub fn parse(s: &str) -> Result<Self, ProductCodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ProductCodeError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims() {
        let code = ProductCode::parse("  T-0042 ").unwrap();
        assert_eq!(code.as_str(), "T-0042");
    }

    #[test]
    fn rejects_empty() {
        assert!(ProductCode::parse("").is_err());
        assert!(ProductCode::parse(" \t ").is_err());
    }

    #[test]
    fn display_matches_inner() {
        let code = ProductCode::parse("abc_123").unwrap();
        assert_eq!(code.to_string(), "abc_123");
    }
}
