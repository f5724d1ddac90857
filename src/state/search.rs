/// Search coordinator
///
/// Owns one label search: the query string, the in-flight flag, and the
/// normalized result collection. `has_searched` distinguishes the initial
/// placeholder state from a completed search with zero hits.

use chrono::Utc;

use crate::api::client::VaultClient;
use crate::api::types::ImageList;
use crate::state::data::{filename_from_url, VaultImage};

/// The reconciled result of one search attempt
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Normalized results; empty on zero hits and on failure
    pub images: Vec<VaultImage>,
    /// Set when the request failed rather than matched nothing
    pub error: Option<String>,
}

/// State of the search tab
#[derive(Debug, Default)]
pub struct SearchState {
    /// Current query input
    pub query: String,
    /// Request in flight; input and submit are disabled meanwhile
    pub is_searching: bool,
    /// A search has completed (or failed) at least once
    pub has_searched: bool,
    /// The displayed collection
    pub images: Vec<VaultImage>,
}

impl SearchState {
    /// Whether the submit control should do anything right now
    pub fn can_submit(&self) -> bool {
        !self.is_searching && !self.query.trim().is_empty()
    }

    /// Gate one search attempt. A blank query or an in-flight request is a
    /// no-op that changes nothing, not even `has_searched`. Otherwise the
    /// flags are raised and the trimmed label to send is returned.
    pub fn begin(&mut self) -> Option<String> {
        if self.is_searching {
            return None;
        }

        let label = self.query.trim();
        if label.is_empty() {
            return None;
        }

        self.is_searching = true;
        self.has_searched = true;
        Some(label.to_owned())
    }

    /// Install the outcome. On failure the collection is emptied rather
    /// than left stale, and the error is handed back for the notice line.
    pub fn finish(&mut self, outcome: SearchOutcome) -> Option<String> {
        self.is_searching = false;
        self.images = outcome.images;
        outcome.error
    }
}

/// Normalize either wire shape into the canonical collection.
///
/// Ids are the batch stamp plus the item's position, unique within the
/// result set and stable in order. Labels from the labeled shape are kept
/// verbatim; the bare-URL shape has none.
pub fn normalize_results(list: ImageList, stamp: i64) -> Vec<VaultImage> {
    let seen_at = Utc::now().to_rfc3339();

    match list {
        ImageList::Urls(urls) => urls
            .into_iter()
            .enumerate()
            .map(|(index, url)| VaultImage {
                id: format!("{stamp}-{index}"),
                filename: filename_from_url(&url),
                url,
                uploaded_at: seen_at.clone(),
                size: None,
                labels: None,
            })
            .collect(),
        ImageList::Labeled(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| VaultImage {
                id: format!("{stamp}-{index}"),
                filename: filename_from_url(&item.blob_url),
                url: item.blob_url,
                uploaded_at: seen_at.clone(),
                size: None,
                labels: Some(item.label),
            })
            .collect(),
    }
}

/// Run one search round-trip and reconcile it.
/// Failures degrade to an empty collection plus a user-visible notice.
pub async fn run_search(client: VaultClient, label: String) -> SearchOutcome {
    match client.search(&label).await {
        Ok(envelope) => {
            let images = normalize_results(envelope.images, Utc::now().timestamp_millis());
            println!("🔎 Search '{label}' matched {} image(s)", images.len());
            SearchOutcome {
                images,
                error: None,
            }
        }
        Err(e) => {
            eprintln!("❌ Search '{label}' failed: {e}");
            SearchOutcome {
                images: Vec::new(),
                error: Some(format!("Failed to search images: {e}")),
            }
        }
    }
}
