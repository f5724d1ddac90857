/// Wire types for the vault service
///
/// The search endpoint has shipped two response schemas over time and does
/// not version them, so the list shape is an untagged enum resolved by
/// structural probing at deserialization time. Everything downstream of
/// this module only ever sees the canonical `VaultImage`.

use serde::Deserialize;

use crate::state::data::VaultImage;

/// Body of a `POST /analyze` response
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub image: Option<WireImage>,
    #[serde(default)]
    pub error: Option<String>,
}

/// An image descriptor as the upload endpoint returns it
#[derive(Debug, Clone, Deserialize)]
pub struct WireImage {
    pub id: String,
    pub url: String,
    pub filename: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl From<WireImage> for VaultImage {
    fn from(wire: WireImage) -> Self {
        VaultImage {
            id: wire.id,
            url: wire.url,
            filename: wire.filename,
            uploaded_at: wire.uploaded_at,
            size: wire.size,
            labels: wire.labels,
        }
    }
}

/// Body of a `GET /get_images` response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    pub images: ImageList,
}

/// The two list shapes the search endpoint is known to return
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageList {
    /// Bare list of image URLs
    Urls(Vec<String>),
    /// List of URL + label pairs
    Labeled(Vec<LabeledImage>),
}

impl ImageList {
    pub fn len(&self) -> usize {
        match self {
            ImageList::Urls(urls) => urls.len(),
            ImageList::Labeled(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entry of the labeled search response shape
#[derive(Debug, Clone, Deserialize)]
pub struct LabeledImage {
    pub blob_url: String,
    pub label: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_url_list() {
        let body = r#"{"images":["https://x/a.jpg","https://x/b.jpg"]}"#;
        let envelope: SearchEnvelope = serde_json::from_str(body).unwrap();

        match envelope.images {
            ImageList::Urls(urls) => {
                assert_eq!(urls, vec!["https://x/a.jpg", "https://x/b.jpg"]);
            }
            ImageList::Labeled(_) => panic!("probed the wrong shape"),
        }
    }

    #[test]
    fn test_parses_labeled_list() {
        let body = r#"{"images":[{"blob_url":"https://x/a.jpg","label":["cat","pet"]}]}"#;
        let envelope: SearchEnvelope = serde_json::from_str(body).unwrap();

        match envelope.images {
            ImageList::Labeled(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].blob_url, "https://x/a.jpg");
                assert_eq!(items[0].label, vec!["cat", "pet"]);
            }
            ImageList::Urls(_) => panic!("probed the wrong shape"),
        }
    }

    #[test]
    fn test_parses_empty_list() {
        let envelope: SearchEnvelope = serde_json::from_str(r#"{"images":[]}"#).unwrap();
        assert!(envelope.images.is_empty());
    }

    #[test]
    fn test_rejects_missing_images_key() {
        assert!(serde_json::from_str::<SearchEnvelope>(r#"{"items":[]}"#).is_err());
    }

    #[test]
    fn test_parses_upload_success() {
        let body = r#"{
            "success": true,
            "image": {
                "id": "42",
                "url": "https://x/photo.jpg",
                "filename": "photo.jpg",
                "uploadedAt": "2024-05-01T12:00:00Z",
                "size": 2048,
                "labels": ["a", "b"]
            }
        }"#;
        let response: UploadResponse = serde_json::from_str(body).unwrap();

        assert!(response.success);
        let image: VaultImage = response.image.unwrap().into();
        assert_eq!(image.filename, "photo.jpg");
        assert_eq!(image.size, Some(2048));
        assert_eq!(image.labels.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[test]
    fn test_parses_upload_failure() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"success":false,"error":"too large"}"#).unwrap();

        assert!(!response.success);
        assert!(response.image.is_none());
        assert_eq!(response.error.as_deref(), Some("too large"));
    }
}
