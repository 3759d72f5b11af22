//! OAuth client-credentials token exchange.
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::io::client::check_status;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchange client credentials for a bearer token.
pub async fn request_auth_token(
    http: &reqwest::Client,
    auth_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String> {
    debug!("POST {}", auth_url);
    let response = http
        .post(auth_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await?;
    let response = check_status(response).await?;
    let token: TokenResponse = response.json().await?;
    debug!("Received auth token (expires in {:?}s)", token.expires_in);
    Ok(token.access_token)
}
