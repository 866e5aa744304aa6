use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_MOCK_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the key-value slots live. Never read from `config.json` itself.
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub mock_delay_ms: u64,
    /// Skip the artificial latency of the offline generator.
    pub instant_mock: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: paths::sketcher_dir(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            mock_delay_ms: DEFAULT_MOCK_DELAY_MS,
            instant_mock: false,
        }
    }
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Config {
    /// Load from the default data directory and the process environment.
    pub fn new() -> Self {
        Self::load_from(&paths::sketcher_dir()).with_overrides(|key| std::env::var(key).ok())
    }

    /// Read `config.json` from `dir`, falling back to defaults when it is missing or broken.
    pub fn load_from(dir: &Path) -> Self {
        let json_path = paths::config_json_path(dir);
        let mut config = Config::default();

        if json_path.exists() {
            match std::fs::read_to_string(&json_path) {
                Ok(content) => match serde_json::from_str::<Config>(&content) {
                    Ok(file_config) => config = file_config,
                    Err(e) => tracing::warn!("Ignoring malformed {}: {}", json_path.display(), e),
                },
                Err(e) => tracing::warn!("Failed to read {}: {}", json_path.display(), e),
            }
        }

        config.data_dir = dir.to_path_buf();
        config
    }

    /// Apply `SKETCHER_*` overrides using `lookup` to resolve variables.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(home) = lookup(paths::SKETCHER_HOME_ENV) {
            self.data_dir = PathBuf::from(home);
        }
        if let Some(api_base) = lookup("SKETCHER_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(model) = lookup("SKETCHER_MODEL") {
            self.model = model;
        }
        if let Some(instant) = lookup("SKETCHER_INSTANT_MOCK") {
            self.instant_mock = parse_bool_env(&instant);
        }
        self
    }

    /// Effective offline generator delay in milliseconds.
    pub fn effective_mock_delay_ms(&self) -> u64 {
        if self.instant_mock {
            0
        } else {
            self.mock_delay_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn parse_bool_env_true_values() {
        for value in ["1", "true", "TRUE", " yes ", "Y", "on"] {
            assert!(parse_bool_env(value), "value {value:?} should be true");
        }
    }

    #[test]
    fn parse_bool_env_false_values() {
        for value in ["0", "false", "no", "off", "", "  "] {
            assert!(!parse_bool_env(value), "value {value:?} should be false");
        }
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(dir.path());

        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.effective_mock_delay_ms(), DEFAULT_MOCK_DELAY_MS);
    }

    #[test]
    fn load_from_reads_partial_json() {
        let dir = tempdir().unwrap();
        std::fs::write(
            paths::config_json_path(dir.path()),
            r#"{"model": "gpt-4o", "max_tokens": 2000}"#,
        )
        .unwrap();

        let config = Config::load_from(dir.path());

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn load_from_malformed_json_falls_back() {
        let dir = tempdir().unwrap();
        std::fs::write(paths::config_json_path(dir.path()), "{not json").unwrap();

        let config = Config::load_from(dir.path());

        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn overrides_take_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SKETCHER_API_BASE", "http://localhost:9999/v1"),
            ("SKETCHER_MODEL", "local-model"),
            ("SKETCHER_INSTANT_MOCK", "yes"),
            ("SKETCHER_HOME", "/tmp/elsewhere"),
        ]);

        let config = Config::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base, "http://localhost:9999/v1");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(config.effective_mock_delay_ms(), 0);
    }
}
