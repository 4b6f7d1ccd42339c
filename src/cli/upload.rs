// src/cli/upload.rs — One-shot `sheetlink upload <paths>...`

use std::path::Path;
use std::sync::Arc;

use crate::provider::IdentityProvider;
use crate::upload::{AddOutcome, SelectedFile, UploadBatch};

pub async fn run_upload(
    identity: Arc<dyn IdentityProvider>,
    batch: &mut UploadBatch,
    paths: &[String],
) -> anyhow::Result<()> {
    if identity.current_session().await?.is_none() {
        anyhow::bail!("not signed in; run `sheetlink login` first");
    }

    let mut candidates = Vec::with_capacity(paths.len());
    for p in paths {
        candidates.push(SelectedFile::from_path(Path::new(p))?);
    }

    let outcome = batch.add_files(candidates);
    println!("{}", batch.status_message());
    if outcome == AddOutcome::RejectedAll {
        anyhow::bail!("nothing to upload");
    }
    for file in batch.items() {
        println!("  - {}", file.name);
    }

    match batch.upload().await {
        Ok(_) => {
            println!("{}", batch.status_message());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", batch.status_message());
            Err(e.into())
        }
    }
}
