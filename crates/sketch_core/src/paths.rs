use std::path::{Path, PathBuf};

/// Environment variable that relocates the data directory.
pub const SKETCHER_HOME_ENV: &str = "SKETCHER_HOME";

/// Data directory (`$SKETCHER_HOME`, else `~/.sketcher`)
pub fn sketcher_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(SKETCHER_HOME_ENV) {
        return PathBuf::from(home);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".sketcher")
}

/// Path of `config.json` inside a data directory
pub fn config_json_path(dir: &Path) -> PathBuf {
    dir.join("config.json")
}
