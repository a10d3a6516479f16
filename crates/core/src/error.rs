use thiserror::Error;

/// Shared error type used across all Mintpulse crates.
///
/// `Chain` and `Indexer` errors are recovered close to where they occur
/// (stale-data fallback, skipped catalog backfill); `Storage` errors
/// propagate to the request handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Chain read error: {0}")]
    Chain(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] eyre::Error),
}
