//! HTTP access to the node's own API.
//!
//! # Responsibilities
//! - Write and delete the marker instance
//! - Query module readiness
//! - Attach the User-Agent and optional server identity header
//!
//! Non-2xx responses surface as [`ApiError::Status`] carrying the body, so
//! callers can classify on both status and message text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use thiserror::Error;
use url::Url;

use crate::config::{AuthConfig, NodeConfig};
use crate::watchdog::marker::MarkerRecord;

/// A successful (2xx) response from the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// HTTP status, when the node answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Operations the watchdog needs from the node.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Write `marker` through the durable (consensus) path.
    async fn register_marker(&self, marker: &MarkerRecord) -> Result<ApiResponse, ApiError>;

    /// Remove `marker` again.
    async fn delete_marker(&self, marker: &MarkerRecord) -> Result<ApiResponse, ApiError>;

    /// Ask the node for its module readiness. `None` when no endpoint is known.
    async fn readiness(&self) -> Option<Result<ApiResponse, ApiError>>;
}

/// [`NodeApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpNodeClient {
    http: Client,
    headers: HeaderMap,
    instance_url: Url,
    readiness_url: Option<Url>,
}

impl HttpNodeClient {
    pub fn new(node: &NodeConfig, auth: &AuthConfig, timeout: Duration) -> Result<Self, ApiError> {
        let instance_url = endpoint(&node.api_base_url, &node.instance_path)?;
        let readiness_url = node
            .readiness_path
            .as_deref()
            .map(|path| endpoint(&node.api_base_url, path))
            .transpose()?;

        let http = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            headers: auth_headers(&node.user_agent, auth)?,
            instance_url,
            readiness_url,
        })
    }

    pub fn instance_url(&self) -> &Url {
        &self.instance_url
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        marker: Option<&MarkerRecord>,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = self
            .http
            .request(method, url.clone())
            .headers(self.headers.clone());
        if let Some(marker) = marker {
            request = request.query(&marker.query_pairs());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(ApiResponse { status: status.as_u16(), body })
        } else {
            Err(ApiError::Status { status: status.as_u16(), body })
        }
    }
}

#[async_trait]
impl NodeApi for HttpNodeClient {
    async fn register_marker(&self, marker: &MarkerRecord) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, &self.instance_url, Some(marker)).await
    }

    async fn delete_marker(&self, marker: &MarkerRecord) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, &self.instance_url, Some(marker)).await
    }

    async fn readiness(&self) -> Option<Result<ApiResponse, ApiError>> {
        let url = self.readiness_url.as_ref()?;
        Some(self.send(Method::GET, url, None).await)
    }
}

fn endpoint(base: &str, path: &str) -> Result<Url, ApiError> {
    Ok(Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?)
}

/// User-Agent plus the server identity pair, if one is configured.
fn auth_headers(user_agent: &str, auth: &AuthConfig) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .map_err(|e| ApiError::InvalidHeader(format!("User-Agent: {}", e)))?,
    );

    if let Some((key, value)) = auth.identity_header() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ApiError::InvalidHeader(format!("{}: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidHeader(format!("{}: {}", key, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let url = endpoint("http://127.0.0.1:8848/", "/nacos/v1/ns/instance").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8848/nacos/v1/ns/instance");
    }

    #[test]
    fn test_client_instance_url_from_config() {
        let node = NodeConfig {
            api_base_url: "http://10.0.0.7:8848/".into(),
            ..NodeConfig::default()
        };
        let client =
            HttpNodeClient::new(&node, &AuthConfig::default(), Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.instance_url().as_str(),
            "http://10.0.0.7:8848/nacos/v1/ns/instance"
        );
    }

    #[test]
    fn test_headers_without_identity() {
        let headers = auth_headers("watchdog-test", &AuthConfig::default()).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[USER_AGENT], "watchdog-test");
    }

    #[test]
    fn test_headers_with_identity() {
        let auth = AuthConfig {
            server_identity_key: "serverIdentity".into(),
            server_identity_value: "security".into(),
        };
        let headers = auth_headers("watchdog-test", &auth).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["serveridentity"], "security");
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let auth = AuthConfig {
            server_identity_key: "bad header".into(),
            server_identity_value: "x".into(),
        };
        assert!(matches!(
            auth_headers("watchdog-test", &auth),
            Err(ApiError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_status_error_exposes_status() {
        let err = ApiError::Status { status: 500, body: "boom".into() };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }
}
