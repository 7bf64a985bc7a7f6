// src/models/mod.rs

//! Domain models for the watcher application.

mod config;
mod post;
mod state;

// Re-export all public types
pub use config::{Config, FeedConfig, FeedSourceKind, FetchConfig, MailConfig, PublicationConfig, TicketRules};
pub use post::Post;
pub use state::WatchState;
