//! Error types surfaced by the search engine.

/// Errors the engine can report. Both variants leave the engine unchanged:
/// a failing `add` never mutates the index, and a failing lookup never
/// mutates anything (lookups are read-only).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchEngineError {
    /// Malformed input detected synchronously: a negative or duplicate
    /// document id, a control character in a stop word or indexed token,
    /// or a malformed query token (empty, double-hyphen, hyphen-only).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Lookup of a document id or index position that does not exist.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, SearchEngineError>;
