//! Error types shared by the game binary and the launcher.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown game `{0}`")]
    UnknownGame(String),

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
