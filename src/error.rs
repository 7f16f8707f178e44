//! Error types for the Revenuebase MCP server

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Environment variable {var} is not set")]
    MissingCredential { var: &'static str },

    #[error("Upstream API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Upstream API returned HTTP {status} with a non-JSON body ({reason}): {body}")]
    InvalidResponse {
        status: u16,
        body: String,
        reason: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// True when the call was rejected before reaching the network.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Error::MissingCredential { .. })
    }

    /// HTTP status reported by the upstream, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } | Error::InvalidResponse { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message_names_variable() {
        let err = Error::MissingCredential {
            var: "REVENUEBASE_API_KEY",
        };
        assert_eq!(
            err.to_string(),
            "Environment variable REVENUEBASE_API_KEY is not set"
        );
        assert!(err.is_missing_credential());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_upstream_error_carries_status_and_body() {
        let err = Error::Upstream {
            status: 402,
            body: r#"{"detail":"out of credits"}"#.to_string(),
        };
        assert_eq!(err.status(), Some(402));
        assert!(err.to_string().contains("HTTP 402"));
        assert!(err.to_string().contains("out of credits"));
        assert!(!err.is_missing_credential());
    }
}
