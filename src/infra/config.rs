// src/infra/config.rs — Configuration loading (TOML + env overrides)
//
// The identity-pool identifiers and the presign endpoint come from
// ~/.sheetlink/config.toml, each overridable with a SHEETLINK_* environment
// variable. The config is built once at startup and handed by reference into
// the auth and upload controllers; nothing reads the environment at call sites.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::SheetlinkError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

/// `[identity]` section: Cognito user pool coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// User pool id, `<region>_<id>` form (the region is parsed from it).
    #[serde(default)]
    pub user_pool_id: String,
    /// App client id for the pool.
    #[serde(default)]
    pub client_id: String,
}

/// `[upload]` section: the presigned-URL issuing endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub presign_endpoint: String,
}

impl Config {
    /// Load config from file, falling back to defaults, then apply env
    /// overrides and validate.
    pub fn load() -> Result<Self, SheetlinkError> {
        let path = paths::config_file_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, SheetlinkError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SheetlinkError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SHEETLINK_USER_POOL_ID") {
            self.identity.user_pool_id = v;
        }
        if let Ok(v) = std::env::var("SHEETLINK_CLIENT_ID") {
            self.identity.client_id = v;
        }
        if let Ok(v) = std::env::var("SHEETLINK_PRESIGN_ENDPOINT") {
            self.upload.presign_endpoint = v;
        }
    }

    pub fn validate(&self) -> Result<(), SheetlinkError> {
        if self.identity.user_pool_id.is_empty() {
            return Err(SheetlinkError::Config(
                "identity.user_pool_id is not set (config.toml or SHEETLINK_USER_POOL_ID)".into(),
            ));
        }
        if !self.identity.user_pool_id.contains('_') {
            return Err(SheetlinkError::Config(format!(
                "identity.user_pool_id '{}' is not in <region>_<id> form",
                self.identity.user_pool_id
            )));
        }
        if self.identity.client_id.is_empty() {
            return Err(SheetlinkError::Config(
                "identity.client_id is not set (config.toml or SHEETLINK_CLIENT_ID)".into(),
            ));
        }
        if self.upload.presign_endpoint.is_empty() {
            return Err(SheetlinkError::Config(
                "upload.presign_endpoint is not set (config.toml or SHEETLINK_PRESIGN_ENDPOINT)"
                    .into(),
            ));
        }
        url::Url::parse(&self.upload.presign_endpoint).map_err(|e| {
            SheetlinkError::Config(format!(
                "upload.presign_endpoint '{}' is not a valid URL: {e}",
                self.upload.presign_endpoint
            ))
        })?;
        Ok(())
    }
}
