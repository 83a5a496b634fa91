//! Push subscription endpoint: the URL a push service assigns a user-agent at subscribe time.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Hosts a subscription endpoint is allowed to point at.
///
/// Matched as a substring of the endpoint's host, mirroring the original implementation's
/// `strings.Contains(host, provider)` check rather than exact equality — some push services
/// front their endpoints behind regional subdomains (e.g. `fcm.googleapis.com` vs.
/// `some-region.fcm.googleapis.com`).
const ALLOWED_HOSTS: &[&str] = &[
    "fcm.googleapis.com",
    "android.googleapis.com",
    "updates.push.services.mozilla.com",
    "web.push.apple.com",
];

/// Errors rejecting a candidate push endpoint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The endpoint string was empty.
    #[error("endpoint cannot be empty")]
    Empty,
    /// The endpoint did not parse as an absolute URL.
    #[error("invalid endpoint URL: {0}")]
    Unparseable(String),
    /// The endpoint's scheme was not `https`.
    #[error("endpoint must use HTTPS")]
    NotHttps,
    /// The endpoint's host did not match any allowed push service.
    #[error("unknown push service provider: {0}")]
    UnknownProvider(String),
}

/// A validated, absolute `https://` push subscription endpoint on an allowlisted host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushEndpoint(String);

impl PushEndpoint {
    /// Parses and validates a candidate endpoint string.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] if the string is empty, not a well-formed URL, not `https`, or
    /// not hosted on an allowlisted push service.
    pub fn parse(candidate: &str) -> Result<Self, EndpointError> {
        if candidate.is_empty() {
            return Err(EndpointError::Empty);
        }

        let parsed = Url::parse(candidate).map_err(|e| EndpointError::Unparseable(e.to_string()))?;

        if parsed.scheme() != "https" {
            return Err(EndpointError::NotHttps);
        }

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        if !ALLOWED_HOSTS.iter().any(|provider| host.contains(provider)) {
            return Err(EndpointError::UnknownProvider(host));
        }

        Ok(Self(candidate.to_string()))
    }

    /// Returns the endpoint's string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PushEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_providers() {
        for endpoint in [
            "https://fcm.googleapis.com/fcm/send/ABC",
            "https://android.googleapis.com/gcm/send/XYZ",
            "https://updates.push.services.mozilla.com/wpush/v2/abc",
            "https://web.push.apple.com/QB3",
        ] {
            assert!(PushEndpoint::parse(endpoint).is_ok(), "{endpoint}");
        }
    }

    #[test]
    fn rejects_http_scheme() {
        assert_eq!(
            PushEndpoint::parse("http://fcm.googleapis.com/fcm/send/ABC"),
            Err(EndpointError::NotHttps)
        );
    }

    #[test]
    fn rejects_unknown_host() {
        assert!(matches!(
            PushEndpoint::parse("https://evil.example.com/send/ABC"),
            Err(EndpointError::UnknownProvider(_))
        ));
    }

    #[test]
    fn rejects_empty_string() {
        assert_eq!(PushEndpoint::parse(""), Err(EndpointError::Empty));
    }

    #[test]
    fn round_trips_through_string_form() {
        let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/ABC").unwrap();
        let reparsed = PushEndpoint::parse(endpoint.as_str()).unwrap();
        assert_eq!(endpoint, reparsed);
    }
}
