/// Upload coordinator
///
/// Owns one upload attempt: the pending file selection, the raw label
/// string, the in-flight flag, and the displayed outcome. The contract is
/// that the user always ends up with something to look at: a well-formed
/// server response yields the server's image, anything else yields a
/// locally synthesized preview of the file they picked.

use chrono::Utc;
use std::path::Path;

use crate::api::client::VaultClient;
use crate::api::types::UploadResponse;
use crate::error::VaultError;
use crate::preview;
use crate::state::data::{media_type_for, mint_image_id, PendingFile, VaultImage};

/// The reconciled result of one upload attempt
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// What to display; either the server's descriptor or a local preview
    pub image: VaultImage,
    /// True when `image` was synthesized locally
    pub fallback: bool,
    /// The failure that forced the fallback, for the notice line
    pub error: Option<String>,
}

/// State of the upload tab
#[derive(Debug, Default)]
pub struct UploadState {
    /// File picked but not yet sent
    pub selected: Option<PendingFile>,
    /// Raw comma-separated label input
    pub labels_raw: String,
    /// Request in flight; gates duplicate submissions
    pub is_uploading: bool,
    /// Outcome of the most recent attempt
    pub result: Option<UploadOutcome>,
}

impl UploadState {
    pub fn select(&mut self, file: PendingFile) {
        self.selected = Some(file);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Whether the submit control should do anything right now
    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.is_uploading
    }

    /// Raise the in-flight flag and retire the previous outcome.
    /// A superseded fallback owns a preview file, which is released here.
    pub fn start(&mut self) {
        if let Some(previous) = self.result.take() {
            if previous.fallback && !previous.image.is_remote() {
                preview::revoke_preview(Path::new(&previous.image.url));
            }
        }
        self.is_uploading = true;
    }

    pub fn finish(&mut self, outcome: UploadOutcome) {
        self.is_uploading = false;
        self.result = Some(outcome);
    }
}

/// Check that the selection is an image before any request is sent.
/// Returns the media type to send with the multipart part.
pub fn validate(file: &PendingFile) -> Result<&'static str, VaultError> {
    match media_type_for(&file.path) {
        Some(media_type) if media_type.starts_with("image/") => Ok(media_type),
        _ => Err(VaultError::NotAnImage(file.name.clone())),
    }
}

/// Run one upload round-trip and reconcile it into a displayable outcome.
///
/// Failures never escape: a missing file, a dead network, a malformed body
/// and an in-band `success: false` all land in the same place, a local
/// preview of the original file with the reason attached.
pub async fn run_upload(
    client: VaultClient,
    file: PendingFile,
    labels: Vec<String>,
) -> UploadOutcome {
    let bytes = match tokio::fs::read(&file.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("⚠️  Could not read {}: {e}", file.path.display());
            return fallback_outcome(&file, &[], Some(format!("could not read file: {e}")));
        }
    };

    match client.upload(&file, bytes.clone(), &labels).await {
        Ok(UploadResponse {
            success: true,
            image: Some(image),
            ..
        }) => {
            println!("✅ Uploaded {} ({} labels)", file.name, labels.len());
            UploadOutcome {
                image: image.into(),
                fallback: false,
                error: None,
            }
        }
        Ok(response) => {
            let reason = response
                .error
                .unwrap_or_else(|| "server rejected the upload".to_string());
            eprintln!("❌ Upload failed: {reason}");
            fallback_outcome(&file, &bytes, Some(reason))
        }
        Err(e) => {
            eprintln!("❌ Upload error: {e}");
            fallback_outcome(&file, &bytes, Some(e.to_string()))
        }
    }
}

/// Synthesize a local stand-in for the image the server never returned
fn fallback_outcome(file: &PendingFile, bytes: &[u8], error: Option<String>) -> UploadOutcome {
    let id = mint_image_id();

    // Prefer an owned copy in the cache; fall back to the original path
    // if the bytes never made it into memory
    let url = match preview::store_preview(&id, &file.name, bytes) {
        Some(path) => path.display().to_string(),
        None => file.path.display().to_string(),
    };

    UploadOutcome {
        image: VaultImage {
            id,
            url,
            filename: file.name.clone(),
            uploaded_at: Utc::now().to_rfc3339(),
            size: Some(file.size),
            labels: None,
        },
        fallback: true,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn pending(name: &str) -> PendingFile {
        PendingFile {
            path: PathBuf::from(format!("/photos/{name}")),
            name: name.to_string(),
            size: 2048,
        }
    }

    #[test]
    fn test_validate_accepts_images() {
        assert_eq!(validate(&pending("photo.jpg")), Ok("image/jpeg"));
        assert_eq!(validate(&pending("anim.webp")), Ok("image/webp"));
    }

    #[test]
    fn test_validate_rejects_non_images() {
        assert_eq!(
            validate(&pending("notes.txt")),
            Err(VaultError::NotAnImage("notes.txt".to_string()))
        );
        assert_eq!(
            validate(&pending("clip.mp4")),
            Err(VaultError::NotAnImage("clip.mp4".to_string()))
        );
        // Unknown extensions are rejected too
        assert!(validate(&pending("mystery.xyz")).is_err());
    }

    #[test]
    fn test_rejected_selection_leaves_result_untouched() {
        let mut state = UploadState::default();
        let previous = fallback_outcome(&pending("old.png"), &[], None);
        state.result = Some(previous.clone());
        state.select(pending("notes.txt"));

        // The submit path validates before start(); a rejection means
        // neither the flag nor the displayed result moves
        assert!(validate(state.selected.as_ref().unwrap()).is_err());
        assert!(!state.is_uploading);
        assert_eq!(state.result, Some(previous));
    }

    #[test]
    fn test_start_gates_duplicate_submission() {
        let mut state = UploadState::default();
        state.select(pending("photo.jpg"));
        assert!(state.can_submit());

        state.start();
        assert!(state.is_uploading);
        assert!(!state.can_submit());

        state.finish(fallback_outcome(&pending("photo.jpg"), &[], None));
        assert!(!state.is_uploading);
        assert!(state.can_submit());
    }

    #[test]
    fn test_start_revokes_superseded_fallback_preview() {
        let dir = tempfile::tempdir().unwrap();
        let preview_path = dir.path().join("1-0.png");
        fs::write(&preview_path, b"preview bytes").unwrap();

        let mut state = UploadState::default();
        state.result = Some(UploadOutcome {
            image: VaultImage {
                id: "1-0".to_string(),
                url: preview_path.display().to_string(),
                filename: "old.png".to_string(),
                uploaded_at: String::new(),
                size: Some(13),
                labels: None,
            },
            fallback: true,
            error: Some("network down".to_string()),
        });

        state.start();

        assert!(!preview_path.exists());
        assert!(state.result.is_none());
    }

    #[test]
    fn test_start_leaves_server_results_alone() {
        let mut state = UploadState::default();
        state.result = Some(UploadOutcome {
            image: VaultImage {
                id: "42".to_string(),
                url: "https://host/a.jpg".to_string(),
                filename: "a.jpg".to_string(),
                uploaded_at: String::new(),
                size: None,
                labels: None,
            },
            fallback: false,
            error: None,
        });

        // Nothing local to release; just clears and raises the flag
        state.start();
        assert!(state.result.is_none());
        assert!(state.is_uploading);
    }

    #[test]
    fn test_fallback_outcome_mirrors_the_original_file() {
        let file = pending("photo.jpg");
        let outcome = fallback_outcome(&file, &[], Some("boom".to_string()));

        assert!(outcome.fallback);
        assert_eq!(outcome.error.as_deref(), Some("boom"));
        assert_eq!(outcome.image.filename, "photo.jpg");
        assert_eq!(outcome.image.size, Some(2048));
        // No bytes reached memory, so the locator is the original path
        assert_eq!(outcome.image.url, "/photos/photo.jpg");
        assert!(!outcome.image.is_remote());
    }
}
