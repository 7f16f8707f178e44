//! Single authenticated request/response call against the upstream API

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde_json::Value;

use crate::config::{Config, API_KEY_ENV};
use crate::error::{Error, Result};
use crate::types::Operation;

/// Header the upstream reads the API key from
pub const API_KEY_HEADER: &str = "x-key";

/// Client for the Revenuebase REST API
#[derive(Clone)]
pub struct RevenuebaseClient {
    http: reqwest::Client,
    config: Config,
}

impl std::fmt::Debug for RevenuebaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevenuebaseClient")
            .field("base_url", &self.config.base_url)
            .field("has_api_key", &self.config.has_api_key())
            .finish()
    }
}

impl RevenuebaseClient {
    pub fn new(config: &Config) -> Result<Self> {
        if config.accept_invalid_certs {
            tracing::warn!(
                "TLS certificate verification is disabled for upstream calls to {}",
                config.base_url
            );
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Send one request and return the decoded JSON body.
    ///
    /// Fails with [`Error::MissingCredential`] before touching the network when no
    /// API key is configured, and with [`Error::Upstream`] for any status >= 400.
    pub async fn invoke(&self, method: Method, path: &str, payload: Option<&Value>) -> Result<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(Error::MissingCredential { var: API_KEY_ENV })?;

        let mut key = HeaderValue::from_str(api_key).map_err(|_| {
            Error::Config(format!("{} contains characters not allowed in a header", API_KEY_ENV))
        })?;
        key.set_sensitive(true);

        let url = self.config.endpoint_url(path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(API_KEY_HEADER, key)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("revenuebase-mcp/", env!("CARGO_PKG_VERSION")));

        if let Some(body) = payload {
            request = request.header(CONTENT_TYPE, "application/json").json(body);
        }

        tracing::debug!(%method, %url, "Calling upstream");
        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() >= 400 {
            let body = upstream_body(response.text().await);
            tracing::warn!(%method, %url, status = status.as_u16(), "Upstream call failed");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse {
            status: status.as_u16(),
            body,
            reason: e.to_string(),
        })
    }

    /// Dispatch an operation through [`invoke`](Self::invoke)
    pub async fn call(&self, operation: &Operation) -> Result<Value> {
        let payload = operation.payload();
        tracing::debug!(operation = operation.name(), "Invoking operation");
        self.invoke(operation.method(), operation.path(), payload.as_ref())
            .await
    }

    /// Status of a batch email processing job
    pub async fn batch_process_email_status(&self, process_id: i64) -> Result<Value> {
        self.call(&Operation::BatchProcessEmailStatus { process_id })
            .await
    }

    /// All queued batch jobs
    pub async fn queued_process(&self) -> Result<Value> {
        self.call(&Operation::QueuedProcess).await
    }

    /// Remaining credits for the authenticated user
    pub async fn get_credits(&self) -> Result<Value> {
        self.call(&Operation::GetCredits).await
    }

    /// Generate a new API key
    pub async fn new_api_key(&self) -> Result<Value> {
        self.call(&Operation::NewApiKey).await
    }

    /// Verify a single email address
    pub async fn real_time_email_verification(&self, email: &str) -> Result<Value> {
        self.call(&Operation::RealTimeEmailVerification {
            email: email.to_string(),
        })
        .await
    }

    /// Submit a previously uploaded file for batch verification
    pub async fn batch_email_submission(&self, filename: &str) -> Result<Value> {
        self.call(&Operation::BatchEmailSubmission {
            filename: filename.to_string(),
        })
        .await
    }

    /// Cancel a queued or running batch job
    pub async fn cancel_process(&self, process_id: i64) -> Result<Value> {
        self.call(&Operation::CancelProcess { process_id }).await
    }
}

/// Error body for diagnostics; a failed read is reported rather than dropped
fn upstream_body(read: reqwest::Result<String>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => format!("<failed to read response body: {}>", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config(api_key: Option<&str>) -> Config {
        Config {
            api_key: api_key.map(str::to_string),
            // Nothing listens here; any attempted call would fail with a connect error
            base_url: "http://127.0.0.1:9/v1".to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let client = RevenuebaseClient::new(&offline_config(None)).unwrap();

        let err = client.get_credits().await.unwrap_err();
        assert!(err.is_missing_credential());
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[tokio::test]
    async fn test_invalid_header_key_is_config_error() {
        let client = RevenuebaseClient::new(&offline_config(Some("bad\nkey"))).unwrap();

        let err = client.queued_process().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_upstream_body_reports_read_failure() {
        assert_eq!(upstream_body(Ok("{\"detail\":\"x\"}".to_string())), "{\"detail\":\"x\"}");

        let read_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let body = upstream_body(Err(read_err));
        assert!(body.starts_with("<failed to read response body:"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = RevenuebaseClient::new(&offline_config(Some("super-secret"))).unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("has_api_key: true"));
    }
}
