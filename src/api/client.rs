/// HTTP client for the vault service
///
/// One `VaultClient` is created at startup and cloned into background
/// tasks. The only configuration is the service base address, taken from
/// the `IMAGE_VAULT_API` environment variable.

use reqwest::multipart;

use crate::api::types::{SearchEnvelope, UploadResponse};
use crate::error::VaultError;
use crate::state::data::{media_type_for, PendingFile};

/// Default deployment address, used when `IMAGE_VAULT_API` is unset
const DEFAULT_API_BASE: &str = "https://myapp2-736053828578.asia-south2.run.app";

/// Multipart field carrying the image binary
const FIELD_IMAGE: &str = "image";
/// Multipart field carrying the JSON-encoded label array
const FIELD_LABELS: &str = "custom_labels";

#[derive(Debug, Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    base: String,
}

impl VaultClient {
    /// Build a client for the given base address (no trailing slash kept)
    pub fn new(base: &str) -> Self {
        VaultClient {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    /// Build a client from `IMAGE_VAULT_API`, falling back to the default
    /// deployment address.
    pub fn from_env() -> Self {
        let base = std::env::var("IMAGE_VAULT_API")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned());

        Self::new(&base)
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Upload one image with optional labels.
    ///
    /// The body is multipart: the file bytes under `image` (with filename
    /// and media type), and, when labels were given, a JSON array string
    /// under `custom_labels`. The response body is parsed regardless of
    /// the HTTP status, since the service reports failures in-band.
    pub async fn upload(
        &self,
        file: &PendingFile,
        bytes: Vec<u8>,
        labels: &[String],
    ) -> Result<UploadResponse, VaultError> {
        let media_type = media_type_for(&file.path).unwrap_or("application/octet-stream");

        let part = multipart::Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(media_type)
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        let mut form = multipart::Form::new().part(FIELD_IMAGE, part);
        if !labels.is_empty() {
            let encoded = serde_json::to_string(labels)
                .map_err(|e| VaultError::BadResponse(e.to_string()))?;
            form = form.text(FIELD_LABELS, encoded);
        }

        let response = self
            .http
            .post(format!("{}/analyze", self.base))
            .multipart(form)
            .send()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| VaultError::BadResponse(e.to_string()))
    }

    /// Search images by label. The label is percent-encoded into the query.
    pub async fn search(&self, label: &str) -> Result<SearchEnvelope, VaultError> {
        let url = format!(
            "{}/get_images?label={}",
            self.base,
            urlencoding::encode(label)
        );

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VaultError::Transport(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json::<SearchEnvelope>()
            .await
            .map_err(|e| VaultError::BadResponse(e.to_string()))
    }

    /// Fetch raw image bytes for gallery thumbnails
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, VaultError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VaultError::Transport(format!(
                "HTTP {} fetching {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
