//! Post data structure.

use serde::{Deserialize, Serialize};

/// The most recent post of the watched publication, rebuilt on every run
/// from whichever upstream shape is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Opaque stable identifier (guid, permalink or numeric id).
    /// Used only for equality comparison across runs, never parsed.
    pub id: String,

    /// Post title
    pub title: String,

    /// Publish date, stored and emailed verbatim
    pub published_at: String,

    /// HTML body (may be empty when the upstream has no content field)
    pub body_html: String,
}

impl Post {
    /// Format the post for display using a template.
    ///
    /// Supported placeholders: `{id}`, `{title}`, `{date}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id)
            .replace("{title}", &self.title)
            .replace("{date}", &self.published_at)
    }
}
