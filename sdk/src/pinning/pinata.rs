use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::PinningService;
use crate::{
    config::PinningConfig,
    core::{SdkError, SdkResult},
};

const API_KEY_HEADER: &str = "pinata_api_key";
const SECRET_KEY_HEADER: &str = "pinata_secret_api_key";

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata REST client
pub struct PinataClient {
    http: reqwest::Client,
    config: PinningConfig,
}

impl PinataClient {
    pub fn new(config: PinningConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_http_client(config: PinningConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// `{gateway}/ipfs/{hash}`
    pub fn gateway_url(&self, ipfs_hash: &str) -> String {
        format!(
            "{}/ipfs/{}",
            self.config.gateway_url.trim_end_matches('/'),
            ipfs_hash
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/pinning/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn credentials(&self) -> SdkResult<(&str, &str)> {
        if !self.config.has_credentials() {
            return Err(SdkError::Config(
                "pinning api_key and secret_api_key are required".to_string(),
            ));
        }
        Ok((&self.config.api_key, &self.config.secret_api_key))
    }

    async fn read_hash(response: reqwest::Response) -> SdkResult<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SdkError::Rpc(format!("pinning service returned {}: {}", status, body)));
        }
        let pinned: PinResponse = response.json().await?;
        Ok(pinned.ipfs_hash)
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> SdkResult<String> {
        let (api_key, secret) = self.credentials()?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| SdkError::Upload(format!("invalid content type: {}", e)))?;

        let response = self
            .http
            .post(self.endpoint("pinFileToIPFS"))
            .header(API_KEY_HEADER, api_key)
            .header(SECRET_KEY_HEADER, secret)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;

        let hash = Self::read_hash(response).await?;
        debug!(%hash, file_name, "Pinned file");
        Ok(self.gateway_url(&hash))
    }

    async fn pin_json(&self, document: &serde_json::Value) -> SdkResult<String> {
        let (api_key, secret) = self.credentials()?;
        let response = self
            .http
            .post(self.endpoint("pinJSONToIPFS"))
            .header(API_KEY_HEADER, api_key)
            .header(SECRET_KEY_HEADER, secret)
            .json(document)
            .send()
            .await?;

        let hash = Self::read_hash(response).await?;
        debug!(%hash, "Pinned JSON document");
        Ok(self.gateway_url(&hash))
    }
}
