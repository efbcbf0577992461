use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a maintenance command.
///
/// All variants are terminal for the current invocation; each command
/// performs at most one filesystem mutation, so there is nothing to roll
/// back.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad, contradictory or unparseable duration arguments.
    #[error("{0}")]
    Validation(String),

    /// The flag file, or the directory it would be created in, is read-only.
    #[error("{} is not writable", .0.display())]
    NotWritable(PathBuf),

    /// Maintenance mode is currently on and `--force` was not given.
    #[error("maintenance mode is already enabled, pass --force to change its duration")]
    AlreadyEnabled,

    /// The flag file exists but does not hold valid flag data.
    #[error("malformed maintenance flag {}: {source}", .path.display())]
    MalformedFlag {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
