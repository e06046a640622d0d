use std::path::PathBuf;

/// Failure taxonomy for the meter-ledger store.
///
/// `Validation`, `MissingMeter` and `NotImplemented` are ordinary
/// outcomes a front end is expected to handle (show a message, let the
/// user retry). `Storage` wraps the underlying SQLite fault with its
/// cause intact and is not recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("store not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported store version {found}, this build supports version {supported}")]
    UnsupportedVersion { found: i32, supported: i32 },

    #[error("{0}")]
    Validation(String),

    #[error("meter has no stored identifier (never added, or already removed)")]
    MissingMeter,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("storage fault")]
    Storage(#[from] sqlx::Error),
}
