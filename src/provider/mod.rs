// src/provider/mod.rs — External collaborator layer
//
// The three network collaborators the client talks to: the identity provider
// (sign-in, challenge, session, sign-out), the destination issuer (presigned
// upload URLs) and the storage sink (raw PUT of file bytes). Each sits behind
// a trait so the state machines in `auth` and `upload` never see HTTP.

pub mod cognito;
pub mod presign;
pub mod storage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::SheetlinkError;

/// Identity collaborator: sign in, confirm the forced-password challenge,
/// query/revoke the current session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, identifier: &str, secret: &str)
        -> Result<SignInResult, SheetlinkError>;

    /// Confirm the pending challenge with a new secret. Only meaningful after
    /// a `sign_in` that returned `next_challenge`.
    async fn confirm_challenge(&self, new_secret: &str) -> Result<SignInResult, SheetlinkError>;

    /// Returns the current session if the provider still recognizes one.
    async fn current_session(&self) -> Result<Option<SessionInfo>, SheetlinkError>;

    /// Revoke the current session. Callers treat failure as best-effort.
    async fn sign_out(&self) -> Result<(), SheetlinkError>;
}

/// Outcome of a sign-in or challenge-confirmation call.
#[derive(Debug, Clone, Default)]
pub struct SignInResult {
    pub established: bool,
    pub next_challenge: Option<Challenge>,
}

impl SignInResult {
    pub fn established() -> Self {
        Self {
            established: true,
            next_challenge: None,
        }
    }

    pub fn challenge(challenge: Challenge) -> Self {
        Self {
            established: false,
            next_challenge: Some(challenge),
        }
    }
}

/// Provider-mandated step interposed before a session is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    /// First login with a temporary password: a replacement must be set.
    NewSecretRequired,
}

/// What the provider knows about an established session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub identifier: String,
}

/// Destination issuer: file name + MIME type in, single-use upload URL out.
#[async_trait]
pub trait DestinationIssuer: Send + Sync {
    async fn issue(&self, file_name: &str, file_type: &str) -> Result<String, SheetlinkError>;
}

/// Storage sink: write raw bytes to an issued destination.
#[async_trait]
pub trait StorageSink: Send + Sync {
    async fn put(
        &self,
        destination: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), SheetlinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_result_established() {
        let r = SignInResult::established();
        assert!(r.established);
        assert!(r.next_challenge.is_none());
    }

    #[test]
    fn test_sign_in_result_challenge() {
        let r = SignInResult::challenge(Challenge::NewSecretRequired);
        assert!(!r.established);
        assert_eq!(r.next_challenge, Some(Challenge::NewSecretRequired));
    }
}
