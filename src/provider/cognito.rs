// src/provider/cognito.rs — Cognito user-pool identity provider
//
// Speaks the Cognito IdP JSON API (x-amz-json-1.1) directly instead of
// pulling in the AWS SDK, keeping the binary lean. The user-pool client
// flows used here (USER_PASSWORD_AUTH, RespondToAuthChallenge, GetUser,
// GlobalSignOut) need no request signing.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{Challenge, IdentityProvider, SessionInfo, SignInResult};
use crate::auth::session::{StoredTokens, TokenStore};
use crate::infra::errors::SheetlinkError;

const API_VERSION_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Challenge context carried between `sign_in` and `confirm_challenge`.
/// Cognito hands back an opaque session token that must be echoed on the
/// RespondToAuthChallenge call, along with the username.
#[derive(Debug, Clone)]
struct PendingChallenge {
    identifier: String,
    session: String,
}

pub struct CognitoProvider {
    client_id: String,
    region: String,
    client: reqwest::Client,
    tokens: TokenStore,
    pending: Mutex<Option<PendingChallenge>>,
}

impl CognitoProvider {
    /// Build from the pool coordinates. The region is the prefix of the
    /// user pool id (`ap-northeast-1_AbCdEf123` → `ap-northeast-1`).
    pub fn new(user_pool_id: &str, client_id: &str, tokens: TokenStore) -> Self {
        let region = user_pool_id
            .split_once('_')
            .map(|(region, _)| region.to_string())
            .unwrap_or_else(|| user_pool_id.to_string());
        Self {
            client_id: client_id.to_string(),
            region,
            client: reqwest::Client::new(),
            tokens,
            pending: Mutex::new(None),
        }
    }

    fn endpoint(&self) -> String {
        format!("https://cognito-idp.{}.amazonaws.com/", self.region)
    }

    /// POST one IdP operation and return the parsed JSON body.
    ///
    /// Non-2xx responses carry `{"__type": "...Exception", "message": "..."}`;
    /// the pair is folded into the returned error via `map_rejection`.
    async fn call(
        &self,
        target: &str,
        body: serde_json::Value,
        map_rejection: impl Fn(String) -> SheetlinkError,
    ) -> Result<serde_json::Value, SheetlinkError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", API_VERSION_CONTENT_TYPE)
            .header("x-amz-target", format!("{TARGET_PREFIX}.{target}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetlinkError::IdentityTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = parse_idp_error(&error_body)
                .unwrap_or_else(|| format!("HTTP {status}: {error_body}"));
            return Err(map_rejection(detail));
        }

        response
            .json()
            .await
            .map_err(|e| SheetlinkError::IdentityTransport(format!("bad response body: {e}")))
    }

    /// Persist the tokens from an AuthenticationResult payload.
    fn store_tokens(
        &self,
        identifier: &str,
        auth_result: &serde_json::Value,
    ) -> Result<(), SheetlinkError> {
        let expires_in = auth_result["ExpiresIn"].as_u64().unwrap_or(0);
        let expires_at = if expires_in == 0 {
            0
        } else {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs()
                + expires_in
        };
        self.tokens.save(&StoredTokens {
            identifier: identifier.to_string(),
            access_token: auth_result["AccessToken"].as_str().unwrap_or("").into(),
            id_token: auth_result["IdToken"].as_str().unwrap_or("").into(),
            refresh_token: auth_result["RefreshToken"].as_str().map(String::from),
            expires_at,
            obtained_at: chrono::Utc::now(),
        })
    }
}

/// Pull the human-readable message out of an IdP error body.
fn parse_idp_error(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let kind = v["__type"].as_str()?;
    let message = v["message"].as_str().or_else(|| v["Message"].as_str());
    match message {
        Some(m) => Some(format!("{kind}: {m}")),
        None => Some(kind.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn sign_in(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<SignInResult, SheetlinkError> {
        let body = serde_json::json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": {
                "USERNAME": identifier,
                "PASSWORD": secret,
            },
        });

        let resp = self
            .call("InitiateAuth", body, |detail| {
                SheetlinkError::SignInRejected { detail }
            })
            .await?;

        if resp["ChallengeName"].as_str() == Some("NEW_PASSWORD_REQUIRED") {
            let session = resp["Session"].as_str().unwrap_or("").to_string();
            *self.pending.lock().expect("challenge lock poisoned") = Some(PendingChallenge {
                identifier: identifier.to_string(),
                session,
            });
            return Ok(SignInResult::challenge(Challenge::NewSecretRequired));
        }

        let auth_result = &resp["AuthenticationResult"];
        if auth_result.is_object() {
            self.store_tokens(identifier, auth_result)?;
            return Ok(SignInResult::established());
        }

        // Some other challenge type (MFA etc.) that this client doesn't handle
        Err(SheetlinkError::SignInRejected {
            detail: format!(
                "unsupported challenge: {}",
                resp["ChallengeName"].as_str().unwrap_or("unknown")
            ),
        })
    }

    async fn confirm_challenge(&self, new_secret: &str) -> Result<SignInResult, SheetlinkError> {
        let pending = self
            .pending
            .lock()
            .expect("challenge lock poisoned")
            .clone()
            .ok_or_else(|| SheetlinkError::ChallengeRejected {
                detail: "no challenge in progress".into(),
            })?;

        let body = serde_json::json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "ClientId": self.client_id,
            "Session": pending.session,
            "ChallengeResponses": {
                "USERNAME": pending.identifier,
                "NEW_PASSWORD": new_secret,
            },
        });

        let resp = self
            .call("RespondToAuthChallenge", body, |detail| {
                SheetlinkError::ChallengeRejected { detail }
            })
            .await?;

        let auth_result = &resp["AuthenticationResult"];
        if !auth_result.is_object() {
            return Err(SheetlinkError::ChallengeRejected {
                detail: "provider returned no session".into(),
            });
        }

        self.store_tokens(&pending.identifier, auth_result)?;
        *self.pending.lock().expect("challenge lock poisoned") = None;
        Ok(SignInResult::established())
    }

    async fn current_session(&self) -> Result<Option<SessionInfo>, SheetlinkError> {
        let Some(tokens) = self.tokens.load() else {
            return Ok(None);
        };
        if tokens.is_expired() {
            tracing::debug!("stored access token expired, treating as signed out");
            return Ok(None);
        }

        // Confirm the token is still honored; a revoked token comes back
        // as a NotAuthorizedException, which here just means "no session".
        let body = serde_json::json!({ "AccessToken": tokens.access_token });
        match self
            .call("GetUser", body, |detail| SheetlinkError::SignInRejected {
                detail,
            })
            .await
        {
            Ok(_) => Ok(Some(SessionInfo {
                identifier: tokens.identifier,
            })),
            Err(SheetlinkError::SignInRejected { detail }) => {
                tracing::debug!("stored token no longer valid: {detail}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_out(&self) -> Result<(), SheetlinkError> {
        let stored = self.tokens.load();
        self.tokens.clear()?;

        if let Some(tokens) = stored {
            let body = serde_json::json!({ "AccessToken": tokens.access_token });
            self.call("GlobalSignOut", body, |detail| {
                SheetlinkError::SignInRejected { detail }
            })
            .await?;
        }
        Ok(())
    }
}
