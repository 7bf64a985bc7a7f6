//! Application configuration structures.
//!
//! All fields are defaulted so the watcher runs with no config file at all;
//! the defaults reproduce the original pintofviewclub deployment.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Watched publication identity
    #[serde(default)]
    pub publication: PublicationConfig,

    /// Upstream feed shape selection
    #[serde(default)]
    pub feed: FeedConfig,

    /// HTTP client behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Ticket-link classification rules
    #[serde(default)]
    pub tickets: TicketRules,

    /// Mail delivery settings (credentials come from the environment)
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.publication.domain.trim().is_empty() {
            return Err(AppError::validation("publication.domain is empty"));
        }
        if self.publication.slug.trim().is_empty() {
            return Err(AppError::validation("publication.slug is empty"));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if !self.feed.feed_path.starts_with('/') {
            return Err(AppError::validation("feed.feed_path must start with '/'"));
        }
        if self.mail.smtp_host.trim().is_empty() {
            return Err(AppError::validation("mail.smtp_host is empty"));
        }
        if self.mail.smtp_port == 0 {
            return Err(AppError::validation("mail.smtp_port must be > 0"));
        }
        Ok(())
    }
}

/// Identity of the watched publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationConfig {
    /// Full hostname of the publication (e.g. "pintofviewclub.substack.com")
    #[serde(default = "defaults::domain")]
    pub domain: String,

    /// Publication slug used to recognize self-referential links
    #[serde(default = "defaults::slug")]
    pub slug: String,
}

impl Default for PublicationConfig {
    fn default() -> Self {
        Self {
            domain: defaults::domain(),
            slug: defaults::slug(),
        }
    }
}

/// Which upstream shape to fetch the latest post from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSourceKind {
    /// RSS/XML document served by the publication itself
    Rss,
    /// rss2json.com proxy (avoids 403s on the direct feed)
    #[serde(rename = "rss2json")]
    Rss2Json,
    /// Publication JSON archive listing plus per-post detail endpoint
    Archive,
}

/// Upstream feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Upstream shape to use for this deployment
    #[serde(default = "defaults::feed_source")]
    pub source: FeedSourceKind,

    /// Path of the RSS document on the publication host
    #[serde(default = "defaults::feed_path")]
    pub feed_path: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: defaults::feed_source(),
            feed_path: defaults::feed_path(),
        }
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Immutable classification rules for ticket-booking links.
///
/// Passed into the classifier as data so the classification function stays
/// pure and independently testable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRules {
    /// Platform domain token for the self-referential exclusion
    #[serde(default = "defaults::self_domain")]
    pub self_domain: String,

    /// Publication slug token for the self-referential exclusion
    #[serde(default = "defaults::self_slug")]
    pub self_slug: String,

    /// Social-platform domains, always excluded
    #[serde(default = "defaults::social_domains")]
    pub social_domains: Vec<String>,

    /// Known ticketing-platform domain substrings
    #[serde(default = "defaults::ticketing_domains")]
    pub ticketing_domains: Vec<String>,

    /// Fallback keywords matched anywhere in the URL
    #[serde(default = "defaults::ticket_keywords")]
    pub keywords: Vec<String>,
}

impl Default for TicketRules {
    fn default() -> Self {
        Self {
            self_domain: defaults::self_domain(),
            self_slug: defaults::self_slug(),
            social_domains: defaults::social_domains(),
            ticketing_domains: defaults::ticketing_domains(),
            keywords: defaults::ticket_keywords(),
        }
    }
}

/// Outbound mail settings.
///
/// The sender address, app password and recipient are read from the
/// `EMAIL_ADDRESS`, `EMAIL_APP_PASSWORD` and `EMAIL_TO` environment
/// variables; absence of any of them disables delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP submission host
    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    /// SMTP submission port (implicit TLS)
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// Fixed subject line for notifications
    #[serde(default = "defaults::mail_subject")]
    pub subject: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: defaults::smtp_host(),
            smtp_port: defaults::smtp_port(),
            subject: defaults::mail_subject(),
        }
    }
}

mod defaults {
    use super::FeedSourceKind;

    // Publication defaults
    pub fn domain() -> String {
        "pintofviewclub.substack.com".into()
    }
    pub fn slug() -> String {
        "pintofviewclub".into()
    }

    // Feed defaults
    pub fn feed_source() -> FeedSourceKind {
        FeedSourceKind::Rss2Json
    }
    pub fn feed_path() -> String {
        "/feed.xml".into()
    }

    // Fetch defaults. The browser user agent avoids 403s from the
    // publication host.
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        15
    }

    // Ticket classification defaults
    pub fn self_domain() -> String {
        "substack.com".into()
    }
    pub fn self_slug() -> String {
        "pintofviewclub".into()
    }
    pub fn social_domains() -> Vec<String> {
        vec![
            "facebook.com".into(),
            "twitter.com".into(),
            "instagram.com".into(),
            "linkedin.com".into(),
        ]
    }
    pub fn ticketing_domains() -> Vec<String> {
        vec![
            "eventbrite".into(),
            "ticket".into(),
            "lu.ma".into(),
            "ra.co".into(),
            "razorpay.com".into(),
            "bookmyshow".into(),
        ]
    }
    pub fn ticket_keywords() -> Vec<String> {
        vec![
            "ticket".into(),
            "book".into(),
            "rsvp".into(),
            "register".into(),
        ]
    }

    // Mail defaults
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        465
    }
    pub fn mail_subject() -> String {
        "New Pint of View guest announced".into()
    }
}
