/// Gallery view-state
///
/// Transient interaction state for the result grid: which item's overlay
/// is showing and which image the detail modal holds. Both are purely
/// local and reset whenever a new collection arrives.

use crate::state::data::VaultImage;

#[derive(Debug, Default)]
pub struct GalleryState {
    /// At most one item shows its overlay
    hovered_id: Option<String>,
    /// The image open in the detail modal
    selected: Option<VaultImage>,
}

impl GalleryState {
    /// Entering an item's region takes the overlay, whoever held it before
    pub fn hover_enter(&mut self, id: String) {
        self.hovered_id = Some(id);
    }

    /// Leaving only clears the overlay if that item still holds it;
    /// a stale leave after entering another item must not steal its overlay
    pub fn hover_leave(&mut self, id: &str) {
        if self.hovered_id.as_deref() == Some(id) {
            self.hovered_id = None;
        }
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered_id.as_deref() == Some(id)
    }

    /// Open the modal on this image, replacing whatever was open
    pub fn select(&mut self, image: VaultImage) {
        self.selected = Some(image);
    }

    /// Explicit close action
    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&VaultImage> {
        self.selected.as_ref()
    }

    /// Drop all interaction state, for when the collection changes
    pub fn reset(&mut self) {
        self.hovered_id = None;
        self.selected = None;
    }
}
