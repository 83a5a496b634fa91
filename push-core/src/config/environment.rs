//! Process environment configuration.

use std::env;

/// Default HTTP listen port, used when `PORT` is unset or unparsable.
const DEFAULT_PORT: u16 = 8080;

/// Default VAPID subscriber contact URI, used when `VAPID_SUBJECT` is unset.
const DEFAULT_VAPID_SUBJECT: &str = "mailto:support@example.com";

/// Process-wide configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Environment {
    port: u16,
    vapid_subject: String,
}

impl Environment {
    /// Reads configuration from `PORT` and `VAPID_SUBJECT`, falling back to documented
    /// defaults for either variable that is unset or malformed.
    #[must_use]
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let vapid_subject =
            env::var("VAPID_SUBJECT").unwrap_or_else(|_| DEFAULT_VAPID_SUBJECT.to_string());

        Self { port, vapid_subject }
    }

    /// The HTTP listen port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The VAPID subscriber contact URI attached to every signed JWT.
    #[must_use]
    pub fn vapid_subject(&self) -> &str {
        &self.vapid_subject
    }
}
