//! HTTP implementation of the remote photo service.

use crate::error::classify_api_error;
use crate::{
    AssetUpload, ProviderError, RemoteLibrary, StatusReport, UntaggedRecord, UploadReceipt,
};
use reqwest::Client;
use serde::Deserialize;

#[derive(Clone)]
pub struct HttpConfig {
    pub base_url: String,
}

#[derive(Clone)]
pub struct HttpRemoteLibrary {
    client: Client,
    cfg: HttpConfig,
}

impl HttpRemoteLibrary {
    pub fn new(cfg: HttpConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }

    /// Passes 2xx responses through; anything else is drained and classified.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ProviderError::Api {
            status: status.as_u16(),
            message: classify_api_error(status.as_u16(), status.canonical_reason(), &body),
        })
    }
}

#[derive(Deserialize)]
struct UntaggedResponse {
    #[serde(default)]
    photos: Vec<UntaggedRecord>,
}

#[async_trait::async_trait]
impl RemoteLibrary for HttpRemoteLibrary {
    async fn upload(
        &self,
        user_id: &str,
        asset: &AssetUpload,
    ) -> Result<UploadReceipt, ProviderError> {
        let bytes = tokio::fs::read(&asset.path).await.map_err(|e| {
            ProviderError::Transport(format!("read {}: {}", asset.path.display(), e))
        })?;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(asset.file_name.clone())
            .mime_str(&asset.content_type)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("user_id", user_id.to_string())
            .part("file", part);

        let resp = self
            .client
            .post(format!("{}/upload/", self.cfg.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let resp = Self::check(resp).await?;
        resp.json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn photo_status(&self, photo_id: &str) -> Result<StatusReport, ProviderError> {
        let resp = self
            .client
            .get(format!("{}/upload/{}/status", self.cfg.base_url, photo_id))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let resp = Self::check(resp).await?;
        resp.json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn untagged(&self, user_id: &str) -> Result<Vec<UntaggedRecord>, ProviderError> {
        let resp = self
            .client
            .get(format!("{}/untagged/{}", self.cfg.base_url, user_id))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let resp = Self::check(resp).await?;
        let parsed: UntaggedResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(parsed.photos)
    }
}
