// src/lib.rs — Library root for sheetlink

pub mod auth;
pub mod cli;
pub mod infra;
pub mod provider;
pub mod upload;
pub mod util;
