// src/pipeline/watch.rs

//! The single-shot watch run.
//!
//! Fetch latest post → compare identifier to stored state → if unchanged,
//! stop → else extract ticket link from the body → send notification →
//! persist the new identifier and date.
//!
//! Notification failure does not stop state persistence: the run records
//! the post as seen even when the email could not be delivered. The post
//! will not be flagged as new again, so a delivery failure can silently
//! lose a notification. Known risk, kept to match the original behavior.

use crate::error::Result;
use crate::models::{Config, Post, TicketRules, WatchState};
use crate::services::{FeedClient, Notifier, tickets};
use crate::storage::StateStore;

use super::novelty::is_new;

/// What a run found for a post judged new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Best-effort booking link from the post body, if any
    pub ticket_link: Option<String>,
}

/// Summary of a watch run, for logging and tests.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// A post was available from the upstream feed
    pub fetched: bool,
    /// The fetched post was previously unseen
    pub new_post: bool,
    /// Ticket link found in the new post's body
    pub ticket_link: Option<String>,
    /// The notification was delivered (or dry-run logged)
    pub notified: bool,
}

/// Decide whether a fetched post is new, and extract its ticket link.
///
/// Pure decision core of the run: no I/O, deterministic for a given post,
/// state and rule set. Returns `None` when the post has been seen before.
pub fn evaluate(post: &Post, state: &WatchState, rules: &TicketRules) -> Option<Detection> {
    if !is_new(&post.id, state.last_post_id.as_deref()) {
        return None;
    }

    Some(Detection {
        ticket_link: tickets::extract_ticket_link(rules, &post.body_html),
    })
}

/// Run the watcher once.
pub async fn run_watch(
    config: &Config,
    store: &dyn StateStore,
    notifier: &Notifier,
    client: &reqwest::Client,
) -> Result<RunOutcome> {
    let mut outcome = RunOutcome::default();

    let state = store.load_state().await?;

    let feed = FeedClient::new(config, client.clone());
    let Some(post) = feed.fetch_latest().await else {
        // Cause already logged; end cleanly without touching state.
        return Ok(outcome);
    };
    outcome.fetched = true;

    let Some(detection) = evaluate(&post, &state, &config.tickets) else {
        log::info!("No new posts.");
        return Ok(outcome);
    };
    outcome.new_post = true;

    log::info!("New post detected: {}", post.title);

    match &detection.ticket_link {
        Some(link) => log::info!("Found ticket link: {}", link),
        None => log::info!("No ticket link found in post body."),
    }
    outcome.ticket_link = detection.ticket_link.clone();

    match notifier
        .notify(&post, detection.ticket_link.as_deref())
        .await
    {
        Ok(()) => outcome.notified = true,
        Err(e) => log::error!("Failed to send email: {}", e),
    }

    // State advances even when delivery failed; see module docs.
    store
        .save_state(&WatchState::seen(&post.id, &post.published_at))
        .await?;

    Ok(outcome)
}
