use std::path::PathBuf;

/// Errors produced by utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error("date parse error: {0}")]
    DateParse(String),

    #[error("signature parse error: {0}")]
    SignatureParse(String),

    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors produced by the lock-file protocol.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("lock file already held: {path}")]
    AlreadyLocked { path: PathBuf },

    #[error("cannot create lock file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot commit lock file {path}: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
