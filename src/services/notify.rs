// src/services/notify.rs

//! Email notification delivery.
//!
//! Sends a fixed-subject plain-text summary of a detected post to a single
//! preconfigured recipient over authenticated SMTP. When any of the three
//! credentials is absent the notifier runs in dry-run mode: it logs what it
//! would have sent and reports success.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::Result;
use crate::models::{MailConfig, Post};

/// Environment variable holding the sender address.
pub const ENV_EMAIL_ADDRESS: &str = "EMAIL_ADDRESS";
/// Environment variable holding the sender app password.
pub const ENV_EMAIL_APP_PASSWORD: &str = "EMAIL_APP_PASSWORD";
/// Environment variable holding the recipient address.
pub const ENV_EMAIL_TO: &str = "EMAIL_TO";

/// Externally supplied mail credentials.
#[derive(Debug, Clone)]
pub struct MailCredentials {
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

impl MailCredentials {
    /// Read credentials from the environment.
    ///
    /// Returns `None` unless all three variables are set and non-empty;
    /// that is a valid configuration meaning "notifications disabled".
    pub fn from_env() -> Option<Self> {
        let get = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            sender: get(ENV_EMAIL_ADDRESS)?,
            password: get(ENV_EMAIL_APP_PASSWORD)?,
            recipient: get(ENV_EMAIL_TO)?,
        })
    }
}

enum Mode {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
        to: Mailbox,
    },
    DryRun,
}

/// Notification dispatcher for detected posts.
pub struct Notifier {
    mode: Mode,
    subject: String,
}

impl Notifier {
    /// Create a notifier from config plus optional credentials.
    pub fn new(config: &MailConfig, credentials: Option<MailCredentials>) -> Result<Self> {
        let mode = match credentials {
            Some(creds) => {
                let from: Mailbox = creds.sender.parse()?;
                let to: Mailbox = creds.recipient.parse()?;

                // Implicit TLS on the submission port (465 for Gmail).
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
                    .port(config.smtp_port)
                    .credentials(Credentials::new(creds.sender, creds.password))
                    .build();

                Mode::Smtp {
                    transport,
                    from,
                    to,
                }
            }
            None => Mode::DryRun,
        };

        Ok(Self {
            mode,
            subject: config.subject.clone(),
        })
    }

    /// Create a notifier with credentials taken from the environment.
    pub fn from_env(config: &MailConfig) -> Result<Self> {
        Self::new(config, MailCredentials::from_env())
    }

    /// Whether this notifier only logs instead of delivering.
    pub fn is_dry_run(&self) -> bool {
        matches!(self.mode, Mode::DryRun)
    }

    /// Deliver (or log) the notification for a detected post.
    pub async fn notify(&self, post: &Post, ticket_link: Option<&str>) -> Result<()> {
        match &self.mode {
            Mode::DryRun => {
                log::info!("Email credentials not set. Skipping email.");
                log::info!(
                    "Would have sent: {} - {}",
                    post.title,
                    ticket_link.unwrap_or("<no link>")
                );
                Ok(())
            }
            Mode::Smtp {
                transport,
                from,
                to,
            } => {
                let message = Message::builder()
                    .from(from.clone())
                    .to(to.clone())
                    .subject(self.subject.clone())
                    .header(ContentType::TEXT_PLAIN)
                    .body(compose_body(post, ticket_link))?;

                transport.send(message).await?;
                log::info!("Email sent successfully.");
                Ok(())
            }
        }
    }
}

/// Render the plain-text message body.
pub fn compose_body(post: &Post, ticket_link: Option<&str>) -> String {
    format!(
        "New post published: {}\nDate: {}\n\nTicket Link: {}\n",
        post.title,
        post.published_at,
        ticket_link.unwrap_or("No specific booking link found.")
    )
}
