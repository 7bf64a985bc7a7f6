//! Storage abstractions for watch-state persistence.
//!
//! The watcher keeps exactly one small record between runs: the identifier
//! and publish date of the last processed post. It is read once at the
//! start of a run and written at most once at the end.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::WatchState;

// Re-export for convenience
pub use local::LocalStateStore;

/// On-disk envelope for the watch state.
///
/// Adds a write timestamp next to the state fields. A legacy bare record
/// (or an empty `{}`) still parses because every field is defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    /// ISO 8601 timestamp of the last write
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// The persisted state fields
    #[serde(flatten)]
    pub state: WatchState,
}

impl StateRecord {
    pub fn new(state: WatchState) -> Self {
        Self {
            updated_at: Some(Utc::now()),
            state,
        }
    }
}

/// Trait for watch-state storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state.
    ///
    /// An absent or unparseable record yields the default (empty) state;
    /// corrupt state is treated as "no state", never as a fatal error.
    async fn load_state(&self) -> Result<WatchState>;

    /// Persist the state as a full, valid record.
    async fn save_state(&self, state: &WatchState) -> Result<()>;
}
