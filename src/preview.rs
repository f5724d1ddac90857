use image::imageops::FilterType;
use std::fs;
use std::path::{Path, PathBuf};

/// Longest edge of a stored fallback preview
const PREVIEW_MAX_DIM: u32 = 1280;

/// Get the preview cache directory
/// Returns ~/.cache/image-vault/previews on Linux
pub fn preview_cache_dir() -> PathBuf {
    let mut path = dirs_next::cache_dir()
        .or_else(dirs_next::home_dir)
        .expect("Could not determine cache directory");

    path.push("image-vault");
    path.push("previews");

    // Ensure the directory exists
    fs::create_dir_all(&path).expect("Failed to create preview cache directory");

    path
}

/// Store a fallback preview for a failed upload.
///
/// The bytes are written under the image id in the cache directory, so the
/// preview outlives the original selection but is ours to delete. Oversized
/// images are downscaled first; bytes that do not decode are written as-is
/// (the viewer may still know the format better than we do).
///
/// Returns the stored path, or None if nothing could be written.
pub fn store_preview(id: &str, filename: &str, bytes: &[u8]) -> Option<PathBuf> {
    if bytes.is_empty() {
        return None;
    }
    store_preview_in(&preview_cache_dir(), id, filename, bytes)
}

fn store_preview_in(dir: &Path, id: &str, filename: &str, bytes: &[u8]) -> Option<PathBuf> {
    if bytes.is_empty() {
        return None;
    }

    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "img".to_string());
    let path = dir.join(format!("{id}.{ext}"));

    match image::load_from_memory(bytes) {
        Ok(img) if img.width().max(img.height()) > PREVIEW_MAX_DIM => {
            let scaled = img.resize(PREVIEW_MAX_DIM, PREVIEW_MAX_DIM, FilterType::Lanczos3);
            scaled.save(&path).ok()?;
        }
        _ => fs::write(&path, bytes).ok()?,
    }

    println!("🖼  Stored fallback preview: {}", path.display());
    Some(path)
}

/// Remove previews left behind by earlier sessions.
/// A preview only matters while its upload outcome is on screen, so
/// anything found here at startup is garbage.
pub fn sweep_preview_cache() -> usize {
    sweep_dir(&preview_cache_dir())
}

fn sweep_dir(dir: &Path) -> usize {
    let mut removed = 0;

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            if fs::remove_file(entry.path()).is_ok() {
                removed += 1;
            }
        }
    }

    if removed > 0 {
        println!("🧹 Cleared {removed} stale preview(s)");
    }
    removed
}

/// Delete a preview that is no longer displayed.
/// Missing files are fine; anything else is worth a complaint.
pub fn revoke_preview(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => println!("🧹 Revoked fallback preview: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => eprintln!("⚠️  Could not revoke preview {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Tiny valid PNG for decode paths
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_store_writes_small_images_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = png_bytes(4, 4);

        let path = store_preview_in(dir.path(), "7-0", "tiny.png", &bytes).unwrap();

        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert_eq!(path.extension().unwrap(), "png");
    }

    #[test]
    fn test_store_downscales_oversized_images() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = png_bytes(PREVIEW_MAX_DIM + 600, 64);

        let path = store_preview_in(dir.path(), "7-1", "wide.png", &bytes).unwrap();

        let stored = image::open(&path).unwrap();
        assert!(stored.width() <= PREVIEW_MAX_DIM);
        assert!(stored.height() <= PREVIEW_MAX_DIM);
    }

    #[test]
    fn test_store_rejects_empty_bytes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_preview_in(dir.path(), "7-2", "gone.jpg", &[]).is_none());
    }

    #[test]
    fn test_store_keeps_undecodable_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = b"not really an image".to_vec();

        let path = store_preview_in(dir.path(), "7-3", "odd.webp", &bytes).unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_sweep_clears_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        store_preview_in(dir.path(), "8-0", "a.png", &png_bytes(2, 2)).unwrap();
        store_preview_in(dir.path(), "8-1", "b.png", &png_bytes(2, 2)).unwrap();

        assert_eq!(sweep_dir(dir.path()), 2);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        // An empty (or missing) directory sweeps to nothing
        assert_eq!(sweep_dir(dir.path()), 0);
        assert_eq!(sweep_dir(&dir.path().join("gone")), 0);
    }

    #[test]
    fn test_revoke_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_preview_in(dir.path(), "7-4", "temp.png", &png_bytes(2, 2)).unwrap();
        assert!(path.exists());

        revoke_preview(&path);
        assert!(!path.exists());

        // Revoking again is a no-op
        revoke_preview(&path);
    }
}
