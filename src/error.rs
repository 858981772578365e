use std::io;
use std::path::PathBuf;

/// Failure categories for a single replay-saved event. The dispatcher logs
/// these and drops the event; nothing here is allowed to take the process
/// down.
#[derive(Debug, thiserror::Error)]
pub enum XtenderError {
    #[error("focus query failed: {0}")]
    FocusQuery(anyhow::Error),

    #[error("failed to create bucket directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to move replay {from:?} -> {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}
