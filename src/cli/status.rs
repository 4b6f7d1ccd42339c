// src/cli/status.rs — Session status display

use std::sync::Arc;

use crate::provider::IdentityProvider;

pub async fn show_status(identity: Arc<dyn IdentityProvider>) -> anyhow::Result<()> {
    match identity.current_session().await? {
        Some(info) => println!("Signed in as {}", info.identifier),
        None => println!("Not signed in. Run `sheetlink login`."),
    }
    Ok(())
}
