//! The gateway relay client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use telecare_auth::TokenIssuer;
use telecare_emr::{Device, Metadata};

use crate::error::{RelayError, Result};

/// `Authorization` scheme token for platform → gateway calls.
pub const AUTH_HEADER_TYPE: &str = "Telecare_Bearer";

/// Relay client configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Production posture: when set, stored `insecure_connection` flags
    /// are ignored and every gateway is dialed over https.
    pub enforce_tls: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            enforce_tls: false,
        }
    }
}

/// A verbatim upstream response, for proxy-style endpoints.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Upstream HTTP status.
    pub status: u16,
    /// Upstream content type.
    pub content_type: String,
    /// Upstream body, untouched.
    pub body: Vec<u8>,
}

/// HTTP client scoped to one configured gateway device.
pub struct GatewayClient {
    http: reqwest::Client,
    host: String,
    insecure: bool,
    issuer: Arc<TokenIssuer>,
    timeout_secs: u64,
}

impl GatewayClient {
    /// Build a client from a gateway device record.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::NotConfigured("endpoint_address")` when the
    /// gateway metadata has no endpoint address.
    pub fn from_device(
        gateway: &Device,
        issuer: Arc<TokenIssuer>,
        config: &RelayConfig,
    ) -> Result<Self> {
        let host = gateway
            .metadata_str("endpoint_address")
            .ok_or(RelayError::NotConfigured("endpoint_address"))?
            .to_string();

        let insecure = if config.enforce_tls {
            false
        } else {
            gateway.metadata_bool("insecure_connection", false)
        };

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        Ok(Self {
            http,
            host,
            insecure,
            issuer,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Base URL the client dials.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.insecure { "http" } else { "https" };
        format!("{scheme}://{}", self.host)
    }

    /// GET a gateway endpoint and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] describing the failure mode; a non-2xx
    /// upstream status becomes `UpstreamError` carrying status and body.
    pub async fn get_json(&self, path: &str, query: Option<&Metadata>) -> Result<Value> {
        let response = self.request(Method::GET, path, query, None).await?;
        Self::decode(response).await
    }

    /// POST a JSON body to a gateway endpoint and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::get_json`].
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self.request(Method::POST, path, None, Some(body)).await?;
        Self::decode(response).await
    }

    /// GET a gateway endpoint, forwarding the response verbatim.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] on transport failure; upstream status
    /// codes pass through untouched inside the [`RawResponse`].
    pub async fn get_raw(&self, path: &str, query: Option<&Metadata>) -> Result<RawResponse> {
        let response = self.request(Method::GET, path, query, None).await?;
        Self::passthrough(response).await
    }

    /// POST to a gateway endpoint, forwarding the response verbatim.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::get_raw`].
    pub async fn post_raw(&self, path: &str, body: &Value) -> Result<RawResponse> {
        let response = self.request(Method::POST, path, None, Some(body)).await?;
        Self::passthrough(response).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Metadata>,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.base_url());
        let token = self
            .issuer
            .sign()
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("{AUTH_HEADER_TYPE} {token}"))
            .header(ACCEPT, "application/json");
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| self.map_transport_error(&e))
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> RelayError {
        if err.is_timeout() {
            RelayError::Timeout {
                seconds: self.timeout_secs,
            }
        } else if err.is_connect() || err.is_redirect() {
            tracing::error!(host = %self.host, error = %err, "Gateway connection error");
            RelayError::Unreachable(err.to_string())
        } else {
            tracing::error!(host = %self.host, error = %err, "Unexpected gateway request error");
            RelayError::Internal(err.to_string())
        }
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        if status.as_u16() >= 400 {
            return Err(RelayError::UpstreamError {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|_| RelayError::InvalidResponse)
    }

    async fn passthrough(response: reqwest::Response) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?
            .to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
