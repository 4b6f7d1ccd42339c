// src/cli/shell.rs — Interactive shell
//
// The router: queries the session store once at startup (staying in the
// `Unknown` gate until the query settles, so the login prompt never flashes
// for an already-signed-in user), runs the login flow until a session
// exists, then the upload menu. The views below only signal "session
// established" / "session ended" back up; everything else stays local.

use std::path::Path;
use std::sync::Arc;

use crate::auth::{AuthFlow, SessionState};
use crate::cli::login;
use crate::provider::IdentityProvider;
use crate::upload::{SelectedFile, UploadBatch};

enum ViewSignal {
    SessionEnded,
    Quit,
}

pub async fn run_shell(
    identity: Arc<dyn IdentityProvider>,
    batch: &mut UploadBatch,
) -> anyhow::Result<()> {
    let mut flow = AuthFlow::new(Arc::clone(&identity));
    let mut session = SessionState::Unknown;

    loop {
        match session {
            SessionState::Unknown => {
                println!("Checking session...");
                session = match identity.current_session().await {
                    Ok(Some(info)) => {
                        println!("Signed in as {}", info.identifier);
                        SessionState::Established
                    }
                    Ok(None) => SessionState::Absent,
                    Err(e) => {
                        tracing::warn!("session query failed, treating as signed out: {e}");
                        SessionState::Absent
                    }
                };
            }
            SessionState::Absent => {
                if !login::run_login(&mut flow).await? {
                    return Ok(());
                }
                session = SessionState::Established;
            }
            SessionState::Established => match upload_view(&mut flow, batch).await? {
                ViewSignal::SessionEnded => session = SessionState::Absent,
                ViewSignal::Quit => return Ok(()),
            },
        }
    }
}

/// The upload menu, shown while a session exists.
async fn upload_view(flow: &mut AuthFlow, batch: &mut UploadBatch) -> anyhow::Result<ViewSignal> {
    loop {
        let selected = batch.items().len();
        let header = if selected == 0 {
            "no files selected".to_string()
        } else {
            format!("{selected} files selected")
        };

        let choice = inquire::Select::new(
            &format!("Skill sheet upload ({header}):"),
            vec!["Add files", "Show selection", "Upload", "Clear selection", "Log out", "Quit"],
        )
        .prompt_skippable()?;

        match choice {
            Some("Add files") => {
                let Some(line) = inquire::Text::new("File paths (space-separated):")
                    .prompt_skippable()?
                else {
                    continue;
                };
                let mut candidates = Vec::new();
                for p in line.split_whitespace() {
                    match SelectedFile::from_path(Path::new(p)) {
                        Ok(f) => candidates.push(f),
                        Err(e) => eprintln!("{e}"),
                    }
                }
                if candidates.is_empty() {
                    continue;
                }
                batch.add_files(candidates);
                println!("{}", batch.status_message());
            }
            Some("Show selection") => {
                for file in batch.items() {
                    println!("  - {}", file.name);
                }
            }
            Some("Upload") => {
                // Partial failure keeps the batch for a re-attempt; the
                // message already names a representative error.
                let _ = batch.upload().await;
                println!("{}", batch.status_message());
            }
            Some("Clear selection") => {
                batch.clear();
            }
            Some("Log out") => {
                flow.sign_out().await;
                println!("Signed out.");
                return Ok(ViewSignal::SessionEnded);
            }
            Some("Quit") | None => return Ok(ViewSignal::Quit),
            Some(_) => {}
        }
    }
}
