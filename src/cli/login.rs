// src/cli/login.rs — Interactive sign-in flow

use crate::auth::{AuthEvent, AuthFlow, AuthState};

/// Run the interactive login until a session exists or the user gives up.
///
/// Returns `true` when a session was established, `false` when the user
/// cancelled out of a prompt (Esc).
pub async fn run_login(flow: &mut AuthFlow) -> anyhow::Result<bool> {
    loop {
        let Some(email) = inquire::Text::new("Email address:").prompt_skippable()? else {
            return Ok(false);
        };
        let Some(password) = inquire::Password::new("Password:")
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt_skippable()?
        else {
            return Ok(false);
        };

        match flow.submit_credentials(&email, &password).await {
            Ok(AuthEvent::SessionEstablished) => {
                println!("Signed in.");
                return Ok(true);
            }
            Ok(AuthEvent::ChallengeRequired) => {
                println!("First login: a new password must be set.");
                if run_challenge(flow).await? {
                    return Ok(true);
                }
                // User backed out of the challenge; start over
                return Ok(false);
            }
            Err(_) => {
                if let Some(msg) = flow.last_error() {
                    eprintln!("{msg}");
                }
                // Stay in the loop: credentials remain editable
            }
        }
    }
}

/// The forced-password-change sub-flow. Loops until the provider accepts a
/// replacement or the user cancels.
async fn run_challenge(flow: &mut AuthFlow) -> anyhow::Result<bool> {
    while flow.state() == AuthState::ChallengeRequired {
        let Some(new_password) = inquire::Password::new("New password:")
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt_skippable()?
        else {
            return Ok(false);
        };

        match flow.submit_new_secret(&new_password).await {
            Ok(AuthEvent::SessionEstablished) => {
                println!("Password updated. Signed in.");
                return Ok(true);
            }
            Ok(AuthEvent::ChallengeRequired) => {}
            Err(_) => {
                if let Some(msg) = flow.last_error() {
                    eprintln!("{msg}");
                }
            }
        }
    }
    Ok(flow.state() == AuthState::Authenticated)
}
