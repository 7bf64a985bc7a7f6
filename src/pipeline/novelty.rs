//! Novelty check for fetched posts.
//!
//! Decides whether the freshly fetched post identifier differs from the one
//! recorded in the watch state. Identifiers are opaque tokens from
//! upstream: comparison is exact string equality, with no case folding or
//! trimming.

/// True when the fetched post has not been seen before.
///
/// An absent stored identifier means this is the first-ever run, so any
/// fetched post counts as new.
pub fn is_new(fetched_id: &str, stored_id: Option<&str>) -> bool {
    match stored_id {
        None => true,
        Some(stored) => fetched_id != stored,
    }
}
