use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors from the mapping/reconciliation pipeline.
///
/// Resolution failures never surface here; the only fatal condition a
/// pipeline pass can hit is failing to persist its output.
#[derive(Error, Debug)]
pub enum EngineError {
    /// List file read/write failed.
    #[error("list error: {0}")]
    List(#[from] droplist_core::CoreError),
}
