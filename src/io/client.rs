//! `ShClient`: the single HTTP transport shared by every layer.
//!
//! Holds the `reqwest` client, the bearer token and the optional hostname override.
//! All service endpoints go through here so that status handling and logging stay
//! in one place.
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use crate::core::bbox::BBox;
use crate::core::dataset::Dataset;
use crate::core::processing::ProcessingPayload;
use crate::core::time::{parse_utc, to_iso_millis};
use crate::error::{Error, Result};
use crate::io::auth::request_auth_token;
use crate::io::config::ClientConfig;
use crate::io::responses::{
    ConfiguredLayer, LayerParams, TileSearchRequest, TileSearchResponse,
};

pub const PROCESSING_API_PATH: &str = "api/v1/process";

/// Turn a non-2xx response into `Error::Status`.
///
/// The message is the service's `error.message` (or top-level `message`) when the body
/// is JSON, otherwise the raw body text.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or(body);
    Err(Error::Status {
        status: status.as_u16(),
        url,
        message,
    })
}

#[derive(Debug, Clone)]
pub struct ShClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ShClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    /// Client configured from `SH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.config.auth_token.as_deref()
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.config.auth_token = Some(token.into());
    }

    /// Obtain a token with the configured client credentials and keep it.
    pub async fn authenticate(&mut self) -> Result<()> {
        let (Some(client_id), Some(client_secret)) = (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
        ) else {
            return Err(Error::missing("client id and client secret"));
        };
        let token =
            request_auth_token(&self.http, &self.config.auth_url, client_id, client_secret).await?;
        info!("Authenticated against {}", self.config.auth_url);
        self.config.auth_token = Some(token);
        Ok(())
    }

    /// Hostname requests for `dataset` go to; the configured override wins.
    pub fn service_hostname<'a>(&'a self, dataset: &'a Dataset) -> &'a str {
        self.config
            .service_hostname
            .as_deref()
            .unwrap_or(dataset.sh_service_hostname)
    }

    pub fn service_url(&self, dataset: &Dataset, path: &str) -> String {
        format!("{}{}", self.service_hostname(dataset), path)
    }

    /// True when `url` points at a catalog hostname or at the hostname override.
    pub fn is_service_url(&self, url: &str) -> bool {
        if let Some(hostname) = self.config.service_hostname.as_deref() {
            if url.starts_with(hostname) {
                return true;
            }
        }
        crate::core::dataset::ALL_DATASETS
            .iter()
            .any(|d| url.starts_with(d.sh_service_hostname))
    }

    fn bearer(&self, what: &'static str) -> Result<&str> {
        self.auth_token().ok_or(Error::NotAuthenticated(what))
    }

    /// Unauthenticated GET returning the body bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = check_status(self.http.get(url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Unauthenticated GET returning the body text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = check_status(self.http.get(url).send().await?).await?;
        Ok(response.text().await?)
    }

    /// Unauthenticated GET decoding a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let text = self.get_text(url).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let mut request = self.http.post(url).json(body);
        // search endpoints are public, but a token lifts rate limits
        if let Some(token) = self.auth_token() {
            request = request.bearer_auth(token);
        }
        let response = check_status(request.send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Render an image through the Processing API.
    #[instrument(skip(self, payload), fields(dataset = dataset.id))]
    pub async fn processing_get_map(
        &self,
        dataset: &Dataset,
        payload: &ProcessingPayload,
    ) -> Result<Vec<u8>> {
        let token = self.bearer("Processing API")?;
        let url = self.service_url(dataset, PROCESSING_API_PATH);
        debug!("POST {} with {} datasource(s)", url, payload.input.data.len());
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "*/*")
            .body(serde_json::to_vec(payload)?)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Settings of `layer_id` as stored in the configuration service.
    #[instrument(skip(self), fields(dataset = dataset.id))]
    pub async fn fetch_layer_params(
        &self,
        dataset: &Dataset,
        instance_id: &str,
        layer_id: &str,
    ) -> Result<LayerParams> {
        let token = self.bearer("the configuration service")?;
        let url = self.service_url(
            dataset,
            &format!("configuration/v1/wms/instances/{instance_id}/layers"),
        );
        debug!("GET {}", url);
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let layers: Vec<ConfiguredLayer> = check_status(response).await?.json().await?;
        let layer = layers
            .into_iter()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| Error::LayerNotFound {
                layer_id: layer_id.to_string(),
            })?;
        info!("Fetched service defaults of layer {}", layer_id);
        Ok(layer.into())
    }

    /// One page of the dataset's search index.
    #[instrument(skip(self, request), fields(dataset = dataset.id, offset = request.offset))]
    pub async fn fetch_tiles(
        &self,
        dataset: &Dataset,
        request: &TileSearchRequest,
    ) -> Result<TileSearchResponse> {
        let path = dataset
            .search_index_path
            .ok_or(Error::NotSupported("dataset has no search index"))?;
        let response: TileSearchResponse =
            self.post_json(&self.service_url(dataset, path), request).await?;
        debug!("{} tile(s), has_more={}", response.tiles.len(), response.has_more);
        Ok(response)
    }

    /// Dates with available data, as reported by the dataset's find-dates endpoint.
    #[instrument(skip(self, bbox, additional), fields(dataset = dataset.id))]
    pub async fn fetch_dates(
        &self,
        dataset: &Dataset,
        bbox: &BBox,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
        additional: Map<String, Value>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let path = dataset
            .find_dates_utc_path
            .ok_or(Error::NotSupported("dataset has no find-dates endpoint"))?;
        let mut body = Map::new();
        body.insert("queryArea".to_string(), bbox.to_geojson());
        body.insert("from".to_string(), json!(to_iso_millis(from)));
        body.insert("to".to_string(), json!(to_iso_millis(to)));
        body.extend(additional);

        let raw: Vec<String> = self
            .post_json(&self.service_url(dataset, path), &Value::Object(body))
            .await?;
        raw.iter().map(|s| parse_utc(s)).collect()
    }
}
