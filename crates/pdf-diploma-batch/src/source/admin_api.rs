//! Admin API asset source

use super::AssetSource;
use crate::signatures::SignatureEntry;
use crate::types::{BatchError, Result};
use pdf_diploma::LayoutConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for admin API calls
pub const API_TIMEOUT_SECS: u64 = 30;

/// Timeout for template, roster and signature downloads
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 90;

/// Header the admin server reads the API key from
pub const DEFAULT_API_KEY_HEADER: &str = "api-key-pohualizcalli";

/// Connection settings for the admin API
#[derive(Debug, Clone)]
pub struct AdminApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_header: String,
}

impl AdminApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }

    pub fn with_api_key(mut self, header: impl Into<String>, key: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self.api_key = Some(key.into());
        self
    }
}

/// Fetches the layout, template and signature registry from the admin API.
/// Roster and image locations are plain URLs downloaded without the key.
#[derive(Debug, Clone)]
pub struct AdminApiSource {
    client: Client,
    config: AdminApiConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationResponse {
    field_mappings: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct SignaturesResponse {
    #[serde(default)]
    signatures: Vec<SignatureEntry>,
}

#[derive(Deserialize)]
struct ActiveTemplateResponse {
    template: Option<TemplateRef>,
}

#[derive(Deserialize)]
struct TemplateRef {
    url: Option<String>,
}

impl AdminApiSource {
    pub fn new(config: AdminApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .user_agent(concat!("pdf-diploma-batch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, mut config: AdminApiConfig) -> Self {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Self { client, config }
    }

    pub fn config(&self) -> &AdminApiConfig {
        &self.config
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Attach the API key header, when one is configured
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(self.config.api_key_header.as_str(), key.as_str()),
            None => request,
        }
    }

    async fn api_get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.api_url(path);
        info!(url = %url, "GET");
        let request = self
            .authorize(self.client.get(&url))
            .timeout(Duration::from_secs(API_TIMEOUT_SECS));
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        info!(url = %url, "Downloading");
        let request = self
            .client
            .get(url)
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS));
        let response = check_status(request.send().await?).await?;
        let bytes = response.bytes().await?;
        debug!(url = %url, bytes = bytes.len(), "Downloaded");
        Ok(bytes.to_vec())
    }
}

/// Turn a non-success response into [`BatchError::ApiError`].
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(BatchError::ApiError {
        status: status.as_u16(),
        message: response.text().await.unwrap_or_default(),
    })
}

impl AssetSource for AdminApiSource {
    async fn layout(&self) -> Result<LayoutConfig> {
        let response: ConfigurationResponse = self.api_get("/configuration").await?;
        let mappings = response
            .field_mappings
            .filter(|v| !v.is_null())
            .ok_or_else(|| BatchError::Asset("no fieldMappings in /configuration".to_string()))?;
        Ok(LayoutConfig::from_value(mappings)?)
    }

    async fn template(&self) -> Result<Vec<u8>> {
        let response: ActiveTemplateResponse = self.api_get("/templates/active").await?;
        let url = response
            .template
            .and_then(|t| t.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                BatchError::Asset("no active template URL in /templates/active".to_string())
            })?;
        let bytes = self.download(&url).await?;
        info!(bytes = bytes.len(), "Loaded active template");
        Ok(bytes)
    }

    async fn signatures(&self) -> Result<Vec<SignatureEntry>> {
        let response: SignaturesResponse = self.api_get("/signatures").await?;
        info!(count = response.signatures.len(), "Loaded signatures");
        Ok(response.signatures)
    }

    async fn signature_bytes(&self, location: &str) -> Result<Vec<u8>> {
        self.download(location).await
    }

    async fn roster(&self, location: &str) -> Result<Vec<u8>> {
        self.download(location).await
    }
}
