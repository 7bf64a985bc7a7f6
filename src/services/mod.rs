//! Service layer for the watcher application.
//!
//! This module contains the business logic for:
//! - Feed fetching (`FeedClient`)
//! - Ticket-link extraction (`tickets`)
//! - Email notification (`Notifier`)

mod feed;
mod notify;
pub mod tickets;

pub use feed::FeedClient;
pub use notify::{MailCredentials, Notifier};
