use std::{fmt, str::FromStr};

use serde::Serialize;

/// The severity attached to a requirement.
///
/// Only the two exact tokens `CRITICAL` and `IMPORTANT` are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Criticality {
    /// Failure to meet the requirement is unacceptable.
    ///
    /// Rendered with a `[!]` marker on the primary requirement bullet.
    Critical,
    /// The requirement matters but carries no marker.
    Important,
}

impl Criticality {
    /// Returns the canonical token for this criticality.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Important => "IMPORTANT",
        }
    }

    /// Whether this criticality is rendered with the `[!]` marker.
    #[must_use]
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criticality {
    type Err = UnknownCriticality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CRITICAL" => Ok(Self::Critical),
            "IMPORTANT" => Ok(Self::Important),
            other => Err(UnknownCriticality(other.to_string())),
        }
    }
}

/// Error returned when a token is neither `CRITICAL` nor `IMPORTANT`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown criticality '{0}': expected CRITICAL or IMPORTANT")]
pub struct UnknownCriticality(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("CRITICAL", Criticality::Critical; "critical")]
    #[test_case("IMPORTANT", Criticality::Important; "important")]
    fn parses_known_tokens(input: &str, expected: Criticality) {
        assert_eq!(input.parse::<Criticality>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test_case("critical"; "lowercase")]
    #[test_case("HIGH"; "unknown token")]
    #[test_case(" CRITICAL"; "leading whitespace")]
    #[test_case(""; "empty")]
    fn rejects_other_tokens(input: &str) {
        assert_eq!(
            input.parse::<Criticality>(),
            Err(UnknownCriticality(input.to_string()))
        );
    }

    #[test]
    fn only_critical_is_marked() {
        assert!(Criticality::Critical.is_critical());
        assert!(!Criticality::Important.is_critical());
    }

    #[test]
    fn serializes_as_token() {
        let json = serde_json::to_string(&Criticality::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
