use std::{fmt, str::FromStr};

use serde::Serialize;

/// The prefix every requirement identifier starts with.
pub const PREFIX: &str = "REQ-";

/// A stable requirement identifier of the form `REQ-<digits>`.
///
/// The digits are kept exactly as written, so `REQ-001` and `REQ-1` are
/// different identifiers and leading zeros survive conversion.
///
/// Examples: `REQ-1`, `REQ-042`, `REQ-1000`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct RequirementId(String);

impl RequirementId {
    /// Returns the identifier as written, including the `REQ-` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digit part of the identifier, without the prefix.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0[PREFIX.len()..]
    }
}

impl AsRef<str> for RequirementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RequirementId> for String {
    fn from(id: RequirementId) -> Self {
        id.0
    }
}

/// Errors that can occur when parsing a requirement identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The string does not start with `REQ-`.
    #[error("Invalid requirement identifier '{0}': expected the prefix 'REQ-'")]
    Prefix(String),

    /// The part after the prefix is empty or not made of ASCII digits.
    #[error("Invalid requirement identifier '{0}': expected digits after 'REQ-'")]
    Digits(String),
}

impl FromStr for RequirementId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| Error::Prefix(s.to_string()))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Digits(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<&str> for RequirementId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("REQ-1", "1"; "single digit")]
    #[test_case("REQ-042", "042"; "leading zeros kept")]
    #[test_case("REQ-100000", "100000"; "many digits")]
    fn parses_valid_identifiers(input: &str, digits: &str) {
        let id = RequirementId::try_from(input).unwrap();
        assert_eq!(id.as_str(), input);
        assert_eq!(id.digits(), digits);
        assert_eq!(id.to_string(), input);
    }

    #[test_case("REQ-"; "no digits")]
    #[test_case("REQ-12a"; "trailing letter")]
    #[test_case("REQ--1"; "double dash")]
    #[test_case("REQ-1 "; "trailing space")]
    fn rejects_bad_digits(input: &str) {
        assert_eq!(
            input.parse::<RequirementId>(),
            Err(Error::Digits(input.to_string()))
        );
    }

    #[test_case("USR-001"; "other kind")]
    #[test_case("req-001"; "lowercase prefix")]
    #[test_case(""; "empty")]
    fn rejects_bad_prefix(input: &str) {
        assert_eq!(
            input.parse::<RequirementId>(),
            Err(Error::Prefix(input.to_string()))
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let id: RequirementId = "REQ-007".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"REQ-007\"");
    }
}
