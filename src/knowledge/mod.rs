pub mod categories;
pub mod error;
pub mod history;
pub mod name_index;
pub mod references;
pub mod relations;
pub mod stats;
pub mod topics;
pub mod transfer;
pub mod types;

pub use error::KnowledgeError;

/// Derive a URL-safe slug: lowercase alphanumerics, every other run of
/// characters collapsed to a single `-`, no leading or trailing dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name_index::fold(name) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Current time as an RFC 3339 string, the timestamp format of every table.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
