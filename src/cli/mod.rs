// src/cli/mod.rs — CLI definition (clap derive)

pub mod login;
pub mod shell;
pub mod status;
pub mod upload;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sheetlink",
    about = "Upload skill sheets to the SheetLink service",
    version
)]
pub struct Cli {
    /// Config file path (defaults to ~/.sheetlink/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in (handles the forced password change on first login)
    Login,
    /// Sign out and revoke the stored session
    Logout,
    /// Show whether a session is active
    Status,
    /// Upload documents (.pdf, .xlsx, .xls; at most 10 per batch)
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<String>,
    },
}
