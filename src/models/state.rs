//! Persisted watch state.

use serde::{Deserialize, Serialize};

/// The record surviving across runs: which post we saw last.
///
/// Once set, `last_post_id` is only ever overwritten with the identifier of
/// a post confirmed different from the stored value in the current run. It
/// is never cleared automatically.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchState {
    /// Identifier of the last processed post
    #[serde(default)]
    pub last_post_id: Option<String>,

    /// Publish date of the last processed post, verbatim from upstream
    #[serde(default)]
    pub last_published_at: Option<String>,
}

impl WatchState {
    /// State recording the given post as the last one seen.
    pub fn seen(post_id: impl Into<String>, published_at: impl Into<String>) -> Self {
        Self {
            last_post_id: Some(post_id.into()),
            last_published_at: Some(published_at.into()),
        }
    }
}
