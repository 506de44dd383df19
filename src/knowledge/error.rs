//! Knowledge-base error types.

use thiserror::Error;

/// Domain errors surfaced by topic, category, history, and relation operations.
///
/// Storage and I/O failures travel as [`anyhow::Error`]; these variants are the
/// conditions a caller can act on, and can be recovered with `downcast_ref`.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("version {version} not found for topic {topic_id}")]
    VersionNotFound { topic_id: i64, version: i64 },

    /// Another topic in the same category already owns this slug.
    #[error("name {name:?} collides with existing topic {existing:?} (same slug {slug:?})")]
    NameConflict {
        name: String,
        existing: String,
        slug: String,
    },

    /// Name is empty or yields an empty slug.
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("strength must be between 0.0 and 1.0, got {0}")]
    InvalidStrength(f64),

    #[error("a topic cannot relate to itself (topic {0})")]
    SelfRelation(i64),

    #[error("relation type must not be empty")]
    EmptyRelationType,

    #[error("unknown content type: {0} (expected markdown, text, code, json or html)")]
    InvalidContentType(String),
}
