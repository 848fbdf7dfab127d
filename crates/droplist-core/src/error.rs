use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors from core list-file handling.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Writing an output file failed. Fatal for the run.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
