// src/services/feed.rs

//! Feed source adapter.
//!
//! Produces a single [`Post`] for the most recently published item, from
//! whichever upstream shape is configured:
//!
//! - `rss`: the publication's own RSS/XML document
//! - `rss2json`: the rss2json.com conversion proxy (the direct feed answers
//!   403 behind Cloudflare for some deployments)
//! - `archive`: the publication's JSON archive listing plus the per-post
//!   detail endpoint
//!
//! Every upstream failure (network, non-2xx, malformed body, empty item
//! list) is soft: it is logged and surfaces to the caller as "no post
//! available this run" so the run ends without touching stored state.

use reqwest::Client;
use rss::Channel;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, FeedSourceKind, Post};

const RSS2JSON_ENDPOINT: &str = "https://api.rss2json.com/v1/api.json";

/// Client for fetching the latest post of the watched publication.
pub struct FeedClient {
    client: Client,
    domain: String,
    feed_path: String,
    source: FeedSourceKind,
}

impl FeedClient {
    /// Create a new feed client for the configured publication.
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            domain: config.publication.domain.clone(),
            feed_path: config.feed.feed_path.clone(),
            source: config.feed.source,
        }
    }

    /// Fetch the most recently published post.
    ///
    /// Returns `None` when no post is available this run, for whatever
    /// reason; the cause has already been logged.
    pub async fn fetch_latest(&self) -> Option<Post> {
        let result = match self.source {
            FeedSourceKind::Rss => self.fetch_rss().await,
            FeedSourceKind::Rss2Json => self.fetch_rss2json().await,
            FeedSourceKind::Archive => self.fetch_archive().await,
        };

        match result {
            Ok(Some(post)) => Some(post),
            Ok(None) => {
                log::info!("No items found in feed.");
                None
            }
            Err(e) => {
                log::warn!("Failed to fetch feed: {}", e);
                None
            }
        }
    }

    /// Fetch and parse the publication's own RSS document.
    async fn fetch_rss(&self) -> Result<Option<Post>> {
        let url = format!("https://{}{}", self.domain, self.feed_path);
        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let channel = Channel::read_from(&bytes[..])?;
        Ok(latest_from_channel(&channel))
    }

    /// Fetch the feed through the rss2json conversion proxy.
    async fn fetch_rss2json(&self) -> Result<Option<Post>> {
        let feed_url = format!("https://{}{}", self.domain, self.feed_path);
        let api_url = Url::parse_with_params(RSS2JSON_ENDPOINT, &[("rss_url", feed_url)])?;

        let response: Rss2JsonResponse = self
            .client
            .get(api_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "ok" {
            return Err(AppError::feed(
                "rss2json",
                response.message.unwrap_or_else(|| "status not ok".into()),
            ));
        }

        Ok(latest_from_rss2json(response))
    }

    /// Fetch the latest post from the publication's JSON archive API.
    async fn fetch_archive(&self) -> Result<Option<Post>> {
        let archive_url = Url::parse_with_params(
            &format!("https://{}/api/v1/archive", self.domain),
            &[("sort", "new"), ("limit", "1")],
        )?;

        let entries: Vec<ArchiveEntry> = self
            .client
            .get(archive_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(entry) = entries.into_iter().next() else {
            return Ok(None);
        };

        let detail_url = format!("https://{}/api/v1/posts/{}", self.domain, entry.slug);
        let detail: PostDetail = self
            .client
            .get(&detail_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Some(post_from_archive(entry, detail)))
    }
}

/// Map the first channel item to a [`Post`].
fn latest_from_channel(channel: &Channel) -> Option<Post> {
    let item = channel.items().first()?;

    let title = item.title().unwrap_or_default().to_string();
    let published_at = item.pub_date().unwrap_or_default().to_string();

    // content:encoded carries the full body; description is the short
    // fallback.
    let body_html = item
        .content()
        .or_else(|| item.description())
        .unwrap_or_default()
        .to_string();

    let id = item
        .guid()
        .map(|g| g.value().to_string())
        .or_else(|| item.link().map(|l| l.to_string()))
        .unwrap_or_else(|| fallback_id(&title, &published_at));

    Some(Post {
        id,
        title,
        published_at,
        body_html,
    })
}

/// Map the first rss2json item to a [`Post`].
fn latest_from_rss2json(response: Rss2JsonResponse) -> Option<Post> {
    let item = response.items.into_iter().next()?;

    let body_html = if item.content.is_empty() {
        item.description
    } else {
        item.content
    };

    let id = if !item.guid.is_empty() {
        item.guid
    } else if !item.link.is_empty() {
        item.link
    } else {
        fallback_id(&item.title, &item.pub_date)
    };

    Some(Post {
        id,
        title: item.title,
        published_at: item.pub_date,
        body_html,
    })
}

/// Combine an archive entry with its detail body into a [`Post`].
fn post_from_archive(entry: ArchiveEntry, detail: PostDetail) -> Post {
    let id = match &entry.id {
        serde_json::Value::String(s) if !s.is_empty() => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => fallback_id(&entry.title, &entry.post_date),
    };

    let body_html = detail
        .body_html
        .filter(|b| !b.is_empty())
        .or(detail.description)
        .unwrap_or_default();

    Post {
        id,
        title: entry.title,
        published_at: entry.post_date,
        body_html,
    }
}

/// Stable identifier for items that carry neither guid nor link.
fn fallback_id(title: &str, published_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\n");
    hasher.update(published_at.as_bytes());
    hex::encode(hasher.finalize())
}

/// Envelope returned by the rss2json proxy.
#[derive(Debug, Deserialize)]
struct Rss2JsonResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<Rss2JsonItem>,
}

/// A single feed item as rendered by rss2json.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Rss2JsonItem {
    title: String,
    link: String,
    #[serde(rename = "pubDate")]
    pub_date: String,
    guid: String,
    content: String,
    description: String,
}

/// One row of the publication's archive listing.
#[derive(Debug, Deserialize)]
struct ArchiveEntry {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    slug: String,
    #[serde(default)]
    post_date: String,
}

/// Per-post detail payload; only the body matters here.
#[derive(Debug, Deserialize)]
struct PostDetail {
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_item_prefers_content_encoded() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
              <channel>
                <title>Pint of View</title>
                <link>https://pintofviewclub.substack.com</link>
                <description>a club</description>
                <item>
                  <title>June guest</title>
                  <link>https://pintofviewclub.substack.com/p/june-guest</link>
                  <guid>guid-june</guid>
                  <pubDate>Mon, 01 Jun 2026 10:00:00 GMT</pubDate>
                  <description>short teaser</description>
                  <content:encoded><![CDATA[<p>full <a href="https://lu.ma/x">body</a></p>]]></content:encoded>
                </item>
              </channel>
            </rss>"#;

        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        let post = latest_from_channel(&channel).unwrap();

        assert_eq!(post.id, "guid-june");
        assert_eq!(post.title, "June guest");
        assert_eq!(post.published_at, "Mon, 01 Jun 2026 10:00:00 GMT");
        assert!(post.body_html.contains("https://lu.ma/x"));
    }

    #[test]
    fn channel_item_without_guid_uses_link() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
              <title>t</title><link>https://x</link><description>d</description>
              <item>
                <title>No guid</title>
                <link>https://pintofviewclub.substack.com/p/no-guid</link>
                <description>body</description>
              </item>
            </channel></rss>"#;

        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        let post = latest_from_channel(&channel).unwrap();

        assert_eq!(post.id, "https://pintofviewclub.substack.com/p/no-guid");
        assert_eq!(post.body_html, "body");
    }

    #[test]
    fn empty_channel_yields_no_post() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
              <title>t</title><link>https://x</link><description>d</description>
            </channel></rss>"#;

        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        assert!(latest_from_channel(&channel).is_none());
    }

    #[test]
    fn rss2json_item_maps_to_post() {
        let json = r#"{
            "status": "ok",
            "items": [{
                "title": "July guest",
                "link": "https://pintofviewclub.substack.com/p/july-guest",
                "pubDate": "2026-07-01 10:00:00",
                "guid": "guid-july",
                "content": "<p>full body</p>",
                "description": "teaser"
            }]
        }"#;

        let response: Rss2JsonResponse = serde_json::from_str(json).unwrap();
        let post = latest_from_rss2json(response).unwrap();

        assert_eq!(post.id, "guid-july");
        assert_eq!(post.body_html, "<p>full body</p>");
    }

    #[test]
    fn rss2json_falls_back_to_description_then_link_id() {
        let json = r#"{
            "status": "ok",
            "items": [{
                "title": "No content",
                "link": "https://pintofviewclub.substack.com/p/no-content",
                "pubDate": "2026-07-02",
                "description": "only a teaser"
            }]
        }"#;

        let response: Rss2JsonResponse = serde_json::from_str(json).unwrap();
        let post = latest_from_rss2json(response).unwrap();

        assert_eq!(post.id, "https://pintofviewclub.substack.com/p/no-content");
        assert_eq!(post.body_html, "only a teaser");
    }

    #[test]
    fn rss2json_empty_items_yields_no_post() {
        let json = r#"{"status": "ok", "items": []}"#;
        let response: Rss2JsonResponse = serde_json::from_str(json).unwrap();
        assert!(latest_from_rss2json(response).is_none());
    }

    #[test]
    fn archive_entry_with_numeric_id_maps_to_post() {
        let entry: ArchiveEntry = serde_json::from_str(
            r#"{"id": 174233951, "title": "August guest", "slug": "august-guest",
                "post_date": "2026-08-01T09:00:00.000Z"}"#,
        )
        .unwrap();
        let detail: PostDetail = serde_json::from_str(
            r#"{"body_html": "<p>see you there</p>", "description": "teaser"}"#,
        )
        .unwrap();

        let post = post_from_archive(entry, detail);

        assert_eq!(post.id, "174233951");
        assert_eq!(post.title, "August guest");
        assert_eq!(post.body_html, "<p>see you there</p>");
    }

    #[test]
    fn archive_detail_without_body_uses_description() {
        let entry: ArchiveEntry =
            serde_json::from_str(r#"{"id": 1, "title": "t", "slug": "s", "post_date": "d"}"#)
                .unwrap();
        let detail: PostDetail = serde_json::from_str(r#"{"description": "teaser"}"#).unwrap();

        assert_eq!(post_from_archive(entry, detail).body_html, "teaser");
    }

    #[test]
    fn fallback_id_is_stable() {
        assert_eq!(fallback_id("a", "b"), fallback_id("a", "b"));
        assert_ne!(fallback_id("a", "b"), fallback_id("a", "c"));
    }
}
