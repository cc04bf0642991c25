//! Authenticated HTTP client for the ARL REST API

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::ArlConfig;
use crate::{Error, Result};

/// Timeout for read/list calls.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for task submission and export calls.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam between the tool logic and the ARL backend.
///
/// Everything above the wire (pagination, status evaluation, aggregation)
/// talks to this trait so tests can script a backend in memory.
#[async_trait]
pub trait ArlApi: Send + Sync {
    /// GET a relative path with query parameters, decoded as JSON.
    async fn get_json(&self, path: &str, query: &[(&str, String)], timeout: Duration)
    -> Result<Value>;

    /// POST a JSON body to a relative path, decoded as JSON.
    async fn post_json(&self, path: &str, body: Value, timeout: Duration) -> Result<Value>;

    /// GET a relative path returning the raw body and whether it parsed as
    /// JSON. Used by the export endpoint, which may hand back non-JSON data.
    async fn get_raw(&self, path: &str, timeout: Duration) -> Result<String>;
}

/// reqwest-backed client holding the base URL and auth token.
pub struct ArlClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ArlClient {
    pub fn new(config: &ArlConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            // ARL installs ship self-signed certificates; validation is a
            // deliberate opt-in via `verify_tls`.
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Error::Transport(format!("connection failed: {err}"))
        } else {
            Error::Transport(err.to_string())
        }
    }

    /// Check the status and pull the body; non-2xx keeps the raw body for
    /// diagnosis instead of failing opaquely.
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.map_err(Self::transport_error)?;
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn decode(body: &str) -> Result<Value> {
        serde_json::from_str(body).map_err(|e| Error::Decode(format!("{e}; body: {body:.200}")))
    }
}

#[async_trait]
impl ArlApi for ArlClient {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value> {
        debug!(path, "GET {}", self.url(path));
        let response = self
            .http
            .get(self.url(path))
            .header("Token", &self.token)
            .header("Accept", "application/json")
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let body = Self::read_body(response).await?;
        Self::decode(&body)
    }

    async fn post_json(&self, path: &str, body: Value, timeout: Duration) -> Result<Value> {
        debug!(path, "POST {}", self.url(path));
        let response = self
            .http
            .post(self.url(path))
            .header("Token", &self.token)
            .header("Accept", "application/json")
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(Self::transport_error)?;
        let body = Self::read_body(response).await?;
        Self::decode(&body)
    }

    async fn get_raw(&self, path: &str, timeout: Duration) -> Result<String> {
        debug!(path, "GET {}", self.url(path));
        let response = self
            .http
            .get(self.url(path))
            .header("Token", &self.token)
            .timeout(timeout)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_config() {
        let config = ArlConfig::new("https://127.0.0.1:5192", "token");
        let client = ArlClient::new(&config).unwrap();
        assert_eq!(client.url("/api/task/"), "https://127.0.0.1:5192/api/task/");
    }

    #[test]
    fn test_decode_reports_malformed_body() {
        let result = ArlClient::decode("<html>not json</html>");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_valid_json() {
        let value = ArlClient::decode(r#"{"items": [], "total": 0, "code": 200}"#).unwrap();
        assert_eq!(value["code"], 200);
    }
}
