// src/infra/paths.rs — Path management
//
// All paths respect the SHEETLINK_HOME environment variable for isolation
// (used heavily by the integration tests). When unset, config lives under
// ~/.sheetlink/.

use std::path::PathBuf;

/// Returns the SHEETLINK_HOME override, if set.
fn sheetlink_home() -> Option<PathBuf> {
    std::env::var_os("SHEETLINK_HOME").map(PathBuf::from)
}

/// Configuration directory: $SHEETLINK_HOME/ or ~/.sheetlink/
pub fn config_dir() -> PathBuf {
    if let Some(home) = sheetlink_home() {
        return home;
    }
    dirs_home().join(".sheetlink")
}

/// Home directory
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Stored session tokens
pub fn auth_file_path() -> PathBuf {
    config_dir().join("auth.json")
}
