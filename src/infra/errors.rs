// src/infra/errors.rs — Error types for sheetlink

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetlinkError {
    // Validation errors (client-detected, no network call made)
    #[error("{0}")]
    Validation(String),

    // Identity provider rejected the credentials. The provider's own message
    // is kept for logs; user-facing code shows a generic constant instead.
    #[error("sign-in rejected: {detail}")]
    SignInRejected { detail: String },

    // Challenge confirmation failed. The provider detail is actionable here
    // (e.g. password policy) and is surfaced to the user.
    #[error("password update failed: {detail}")]
    ChallengeRejected { detail: String },

    #[error("no active session")]
    NoSession,

    // Per-file transfer errors, isolated to one file's task
    #[error("{file}: upload URL request failed: {message}")]
    Destination { file: String, message: String },

    #[error("{file}: transfer failed: {message}")]
    Transfer { file: String, message: String },

    #[error("identity provider unreachable: {0}")]
    IdentityTransport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SheetlinkError {
    /// Whether this error was detected locally, without any collaborator call.
    pub fn is_validation(&self) -> bool {
        matches!(self, SheetlinkError::Validation(_))
    }

    /// The file name for per-file transfer errors.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            SheetlinkError::Destination { file, .. } | SheetlinkError::Transfer { file, .. } => {
                Some(file)
            }
            _ => None,
        }
    }
}
