// src/auth/mod.rs — Authentication flow controller
//
// Drives the sign-in state machine, including the forced-password-change
// sub-flow a pool can mandate on first login:
//
//   AwaitingCredentials → ChallengeRequired → Authenticated
//
// Errors are a non-terminal overlay: the flow stays in (or returns to) the
// input state it was in, with a message the caller can render, and every
// input remains editable for retry.

pub mod session;

use std::sync::Arc;

use crate::infra::errors::SheetlinkError;
use crate::provider::IdentityProvider;

pub use session::SessionState;

/// Generic sign-in failure message. Provider detail is deliberately not
/// leaked on this path; it goes to the log instead.
pub const SIGN_IN_FAILED_MSG: &str = "Sign-in failed. Check your email address and password.";

/// Local policy: the replacement password must differ from the one that
/// triggered the challenge.
pub const SECRET_REUSE_MSG: &str =
    "The new password must be different from the initial password.";

pub const EMPTY_CREDENTIALS_MSG: &str = "Enter both an email address and a password.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    AwaitingCredentials,
    ChallengeRequired,
    Authenticated,
}

/// What a successful controller call tells the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session now exists; the shell should switch to the upload view.
    SessionEstablished,
    /// The provider demands a replacement password before granting one.
    ChallengeRequired,
}

pub struct AuthFlow {
    identity: Arc<dyn IdentityProvider>,
    state: AuthState,
    /// The secret that triggered the challenge, kept for the reuse check.
    prior_secret: Option<String>,
    last_error: Option<String>,
}

impl AuthFlow {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            state: AuthState::AwaitingCredentials,
            prior_secret: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// The message for the most recent failure, cleared by the next attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Submit the identifier/secret pair.
    ///
    /// Empty inputs fail locally without touching the provider. A provider
    /// rejection keeps the flow in `AwaitingCredentials` with the generic
    /// failure message; the provider's own detail is logged only.
    pub async fn submit_credentials(
        &mut self,
        identifier: &str,
        secret: &str,
    ) -> Result<AuthEvent, SheetlinkError> {
        self.last_error = None;

        if identifier.trim().is_empty() || secret.is_empty() {
            self.last_error = Some(EMPTY_CREDENTIALS_MSG.to_string());
            return Err(SheetlinkError::Validation(EMPTY_CREDENTIALS_MSG.into()));
        }

        match self.identity.sign_in(identifier, secret).await {
            Ok(result) if result.next_challenge.is_some() => {
                self.prior_secret = Some(secret.to_string());
                self.state = AuthState::ChallengeRequired;
                Ok(AuthEvent::ChallengeRequired)
            }
            Ok(result) if result.established => {
                self.state = AuthState::Authenticated;
                self.prior_secret = None;
                Ok(AuthEvent::SessionEstablished)
            }
            Ok(_) => {
                tracing::warn!("sign-in returned neither session nor challenge");
                self.last_error = Some(SIGN_IN_FAILED_MSG.to_string());
                Err(SheetlinkError::SignInRejected {
                    detail: "no session established".into(),
                })
            }
            Err(e) => {
                tracing::warn!("sign-in failed: {e}");
                self.last_error = Some(SIGN_IN_FAILED_MSG.to_string());
                Err(e)
            }
        }
    }

    /// Submit the replacement secret for the forced-password-change step.
    ///
    /// Reusing the prior secret fails fast with a policy message and no
    /// provider call. A provider rejection keeps the flow in
    /// `ChallengeRequired`; its detail is surfaced because password-policy
    /// feedback (minimum length etc.) is actionable for the user.
    pub async fn submit_new_secret(
        &mut self,
        new_secret: &str,
    ) -> Result<AuthEvent, SheetlinkError> {
        self.last_error = None;

        if self.state != AuthState::ChallengeRequired {
            return Err(SheetlinkError::Validation(
                "no password change is pending".into(),
            ));
        }

        if self.prior_secret.as_deref() == Some(new_secret) {
            self.last_error = Some(SECRET_REUSE_MSG.to_string());
            return Err(SheetlinkError::Validation(SECRET_REUSE_MSG.into()));
        }

        match self.identity.confirm_challenge(new_secret).await {
            Ok(result) if result.established => {
                self.state = AuthState::Authenticated;
                self.prior_secret = None;
                Ok(AuthEvent::SessionEstablished)
            }
            Ok(_) => {
                let detail = "provider returned no session".to_string();
                self.last_error = Some(format!("Password update error: {detail}"));
                Err(SheetlinkError::ChallengeRejected { detail })
            }
            Err(e) => {
                self.last_error = Some(format!("Password update error: {e}"));
                Err(e)
            }
        }
    }

    /// Sign out: best-effort revoke, unconditional local transition.
    ///
    /// A revocation failure is logged and never surfaced; the user's intent
    /// to leave must not be blocked by a glitch at the provider.
    pub async fn sign_out(&mut self) {
        if let Err(e) = self.identity.sign_out().await {
            tracing::warn!("sign-out revocation failed (ignored): {e}");
        }
        self.state = AuthState::AwaitingCredentials;
        self.prior_secret = None;
        self.last_error = None;
    }
}
