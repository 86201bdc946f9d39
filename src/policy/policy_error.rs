use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("{0} is not set")]
    MissingSetting(&'static str),

    #[error(
        "CRAWLGATE_DENYLIST_PATH is not set; point it at the operator-maintained denylist file (one domain per line)"
    )]
    MissingDenylistPath,

    #[error("Denylist file not found: {}", .0.display())]
    DenylistNotFound(PathBuf),

    #[error("semaphore_count {requested} exceeds the maximum of {max}")]
    SemaphoreCapExceeded { requested: usize, max: usize },

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
