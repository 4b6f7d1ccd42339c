// src/auth/session.rs — Session state and the persisted token store
//
// Tokens are stored as plaintext JSON on disk (chmod 600 on Unix), the same
// way other CLI tools (gh, aws-cli, gcloud) store credentials. This is the
// CLI counterpart of the browser original keeping provider tokens in local
// storage: a session survives process restarts until it expires or the user
// signs out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infra::errors::SheetlinkError;
use crate::infra::paths;

/// Whether the current user holds an established session.
///
/// `Unknown` covers the window between startup and the first session query,
/// so the shell can gate rendering on it instead of a separate loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Absent,
    Established,
}

impl SessionState {
    pub fn is_established(&self) -> bool {
        matches!(self, SessionState::Established)
    }
}

/// Tokens persisted to ~/.sheetlink/auth.json after a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    pub identifier: String,
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds). 0 means "never expires".
    pub expires_at: u64,
    /// When the sign-in that produced these tokens happened.
    pub obtained_at: DateTime<Utc>,
}

impl StoredTokens {
    /// Whether the access token has expired. Includes a 60-second grace
    /// period so a token about to expire is not used for a request that
    /// would outlive it.
    pub fn is_expired(&self) -> bool {
        if self.expires_at == 0 {
            return false;
        }
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        now >= self.expires_at.saturating_sub(60)
    }
}

/// File-backed token store.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self {
            path: paths::auth_file_path(),
        }
    }
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store rooted at an explicit path (tests).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load stored tokens. Returns `None` if the file doesn't exist or no
    /// longer parses (a stale format is treated as signed out).
    pub fn load(&self) -> Option<StoredTokens> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Save tokens atomically (write to .tmp then rename, chmod 600).
    pub fn save(&self, tokens: &StoredTokens) -> Result<(), SheetlinkError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(tokens)
            .map_err(|e| SheetlinkError::Config(format!("failed to encode tokens: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Remove stored tokens. Missing file is not an error.
    pub fn clear(&self) -> Result<(), SheetlinkError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
