use thiserror::Error;

/// Failure to interpret a single log line.
///
/// Never fatal: the engine turns these into `LineRejected` diagnostics and
/// moves on to the next line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("zone change without an entity id")]
    MissingEntityId,

    #[error("malformed entity id {raw:?}")]
    MalformedEntityId { raw: String },

    #[error("malformed {tag} value {raw:?}")]
    MalformedTagValue { tag: &'static str, raw: String },
}
