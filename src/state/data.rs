/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the API layer and the UI layer.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Session-monotonic counter so same-millisecond mints stay unique
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// A single image as displayed anywhere in the app.
///
/// `url` is always a resolvable locator: a remote `http(s)` URL for images
/// the service knows about, or a local file path for fallback previews.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultImage {
    /// Unique within any displayed collection
    pub id: String,
    /// Remote URL or local preview path
    pub url: String,
    /// Display name, derived from the URL or the original file
    pub filename: String,
    /// RFC 3339 timestamp of when the client first saw this image
    pub uploaded_at: String,
    /// Size in bytes, when known
    pub size: Option<u64>,
    /// Labels in server order, when the response carried them
    pub labels: Option<Vec<String>>,
}

impl VaultImage {
    /// Whether `url` points at the vault service rather than a local file
    pub fn is_remote(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}

/// A file the user picked but has not uploaded yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFile {
    pub path: PathBuf,
    /// Filename only (e.g., "sunset.jpg")
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl PendingFile {
    /// Build a pending selection from a picked path.
    /// The size is read from file metadata; zero if the file vanished.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        PendingFile { path, name, size }
    }
}

/// Mint a client-side image id: millisecond timestamp plus a
/// session-monotonic sequence number.
pub fn mint_image_id() -> String {
    let seq = NEXT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", Utc::now().timestamp_millis(), seq)
}

/// Split a raw comma-separated label string into clean labels.
///
/// Whitespace around each label is trimmed and empty entries dropped,
/// so the result is stable under re-parsing its own joined output.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Derive a display filename from a URL: the final `/`-separated segment,
/// percent-decoded. A URL ending in `/` therefore yields an empty name.
pub fn filename_from_url(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);

    match urlencoding::decode(last) {
        Ok(decoded) => decoded.into_owned(),
        // Not valid UTF-8 once decoded; keep the raw segment
        Err(_) => last.to_owned(),
    }
}

/// Media type for a file, judged by extension the way the vault accepts
/// uploads. Returns None for extensions we do not recognize at all.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();

    let media_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        // Common non-image types, so validation can tell "not an image"
        // apart from "never heard of it"
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "zip" => "application/zip",
        _ => return None,
    };

    Some(media_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_trims_and_drops_empties() {
        let labels = parse_labels("a, b ,  , c");
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_labels_blank_input() {
        assert!(parse_labels("").is_empty());
        assert!(parse_labels("  ,  ,,  ").is_empty());
    }

    #[test]
    fn test_parse_labels_is_idempotent() {
        let once = parse_labels(" nature,  landscape ,sunset,, ");
        let again = parse_labels(&once.join(","));
        assert_eq!(once, again);
    }

    #[test]
    fn test_filename_decodes_percent_escapes() {
        assert_eq!(filename_from_url("https://x/a%20b.jpg"), "a b.jpg");
    }

    #[test]
    fn test_filename_takes_last_segment() {
        assert_eq!(
            filename_from_url("https://host/bucket/2024/cat.png"),
            "cat.png"
        );
        // No slashes at all: the whole string is the filename
        assert_eq!(filename_from_url("plain.gif"), "plain.gif");
        // Trailing slash yields an empty name
        assert_eq!(filename_from_url("https://host/dir/"), "");
    }

    #[test]
    fn test_media_type_classification() {
        assert_eq!(media_type_for(Path::new("photo.JPG")), Some("image/jpeg"));
        assert_eq!(
            media_type_for(Path::new("doc.pdf")),
            Some("application/pdf")
        );
        assert_eq!(media_type_for(Path::new("mystery.xyz")), None);
        assert_eq!(media_type_for(Path::new("no_extension")), None);
    }

    #[test]
    fn test_minted_ids_are_unique() {
        let a = mint_image_id();
        let b = mint_image_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_remote() {
        let mut image = VaultImage {
            id: "1".to_string(),
            url: "https://host/a.jpg".to_string(),
            filename: "a.jpg".to_string(),
            uploaded_at: String::new(),
            size: None,
            labels: None,
        };
        assert!(image.is_remote());

        image.url = "/home/user/.cache/image-vault/previews/1.jpg".to_string();
        assert!(!image.is_remote());
    }
}
