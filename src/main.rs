// src/main.rs — sheetlink entry point

use clap::Parser;
use std::sync::Arc;

use sheetlink::auth::session::TokenStore;
use sheetlink::auth::AuthFlow;
use sheetlink::cli::{login, shell, status, upload, Cli, Commands};
use sheetlink::infra::config::Config;
use sheetlink::infra::logger;
use sheetlink::provider::cognito::CognitoProvider;
use sheetlink::provider::presign::PresignEndpoint;
use sheetlink::provider::storage::HttpStorageSink;
use sheetlink::provider::{DestinationIssuer, IdentityProvider, StorageSink};
use sheetlink::upload::UploadBatch;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        let mut c = Config::load_from(std::path::Path::new(path))?;
        c.validate()?;
        c
    } else {
        Config::load()?
    };

    let identity: Arc<dyn IdentityProvider> = Arc::new(CognitoProvider::new(
        &config.identity.user_pool_id,
        &config.identity.client_id,
        TokenStore::new(),
    ));
    let issuer: Arc<dyn DestinationIssuer> =
        Arc::new(PresignEndpoint::new(&config.upload.presign_endpoint));
    let sink: Arc<dyn StorageSink> = Arc::new(HttpStorageSink::new());
    let mut batch = UploadBatch::new(issuer, sink);

    match cli.command {
        Some(Commands::Login) => {
            let mut flow = AuthFlow::new(Arc::clone(&identity));
            if !login::run_login(&mut flow).await? {
                anyhow::bail!("login cancelled");
            }
            Ok(())
        }
        Some(Commands::Logout) => {
            let mut flow = AuthFlow::new(Arc::clone(&identity));
            flow.sign_out().await;
            println!("Signed out.");
            Ok(())
        }
        Some(Commands::Status) => status::show_status(identity).await,
        Some(Commands::Upload { paths }) => upload::run_upload(identity, &mut batch, &paths).await,
        None => shell::run_shell(identity, &mut batch).await,
    }
}
