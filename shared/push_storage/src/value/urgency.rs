//! RFC 8030 urgency hint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string does not name a valid urgency level.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid urgency: {0}")]
pub struct InvalidUrgencyError(pub String);

/// RFC 8030 urgency hint attached to a Web Push request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    /// The `VeryLow` variant.
    VeryLow,
    /// The `Low` variant.
    Low,
    /// The `Normal` variant.
    Normal,
    /// The `High` variant.
    High,
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::VeryLow => "very-low",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Urgency {
    type Err = InvalidUrgencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "very-low" => Ok(Self::VeryLow),
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(InvalidUrgencyError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_normal() {
        assert_eq!(Urgency::default(), Urgency::Normal);
    }

    #[test]
    fn round_trips_through_string_form() {
        for urgency in [Urgency::VeryLow, Urgency::Low, Urgency::Normal, Urgency::High] {
            assert_eq!(urgency, urgency.to_string().parse().unwrap());
        }
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("urgent".parse::<Urgency>().is_err());
    }
}
