//! Configuration for the service client.

use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_AUTH_URL: &str = "https://services.sentinel-hub.com/oauth/token";

/// Configuration for `ShClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token sent to authenticated endpoints.
    pub auth_token: Option<String>,
    /// OAuth client id, used by `ShClient::authenticate`.
    pub client_id: Option<String>,
    /// OAuth client secret, used by `ShClient::authenticate`.
    pub client_secret: Option<String>,
    /// OAuth token endpoint.
    pub auth_url: String,
    /// Replaces every dataset hostname in outgoing requests. Ends with `/`.
    pub service_hostname: Option<String>,
    /// Request timeout.
    pub request_timeout: Duration,
    /// User agent header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            client_id: None,
            client_secret: None,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            service_hostname: None,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn with_trailing_slash(s: impl Into<String>) -> String {
    let mut s = s.into();
    if !s.ends_with('/') {
        s.push('/');
    }
    s
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SH_AUTH_TOKEN`: bearer token
    /// - `SH_CLIENT_ID` / `SH_CLIENT_SECRET`: OAuth client credentials
    /// - `SH_AUTH_URL`: OAuth token endpoint (default: services.sentinel-hub.com)
    /// - `SH_SERVICE_HOSTNAME`: hostname override for all datasets
    /// - `SH_REQUEST_TIMEOUT_MS`: request timeout in milliseconds (default: 30000)
    pub fn from_env() -> Result<Self> {
        let request_timeout_ms: u64 = std::env::var("SH_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .map_err(|e| Error::Config(format!("invalid SH_REQUEST_TIMEOUT_MS: {}", e)))?;

        Ok(Self {
            auth_token: non_empty_var("SH_AUTH_TOKEN"),
            client_id: non_empty_var("SH_CLIENT_ID"),
            client_secret: non_empty_var("SH_CLIENT_SECRET"),
            auth_url: non_empty_var("SH_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            service_hostname: non_empty_var("SH_SERVICE_HOSTNAME").map(with_trailing_slash),
            request_timeout: Duration::from_millis(request_timeout_ms),
            ..Self::default()
        })
    }

    /// Set the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set OAuth client credentials.
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set the OAuth token endpoint.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Route every dataset request to `hostname`.
    pub fn with_service_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.service_hostname = Some(with_trailing_slash(hostname));
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
