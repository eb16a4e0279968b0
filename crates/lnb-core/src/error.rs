use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::EntryKind;

pub type Result<T, E = LnbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LnbError {
    #[error("file '{}' does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("file '{}' is not executable: no execute permission bits are set", path.display())]
    NotExecutable { path: PathBuf },

    #[error("command must not be empty")]
    EmptyCommand,

    #[error("command '{command}' not found: {}", resolved.display())]
    CommandNotFound { command: String, resolved: PathBuf },

    #[error("command '{command}' contains potentially dangerous characters")]
    DangerousCharacters { command: String },

    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("{kind} '{name}' is already installed; use '{}' first to reinstall", kind.remove_hint(name))]
    AlreadyInstalled { kind: EntryKind, name: String },

    #[error(
        "file already exists at {}; remove it manually or use '{}' if it was installed by lnb",
        path.display(),
        kind.remove_hint(name)
    )]
    TargetExists {
        kind: EntryKind,
        name: String,
        path: PathBuf,
    },

    #[error("launcher {} is already recorded for '{owner}'", path.display())]
    TargetClaimed { path: PathBuf, owner: String },

    #[error("{kind} '{name}' was not installed by lnb")]
    NotInstalled { kind: EntryKind, name: String },

    #[error(
        "{kind} '{name}' target path mismatch: expected {}, found {}",
        expected.display(),
        found.display()
    )]
    TargetMismatch {
        kind: EntryKind,
        name: String,
        expected: PathBuf,
        found: PathBuf,
    },

    #[error("failed to {operation} {}", path.display())]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("manifest {} is not valid", path.display())]
    ManifestCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LnbError {
    pub fn filesystem(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }
}
