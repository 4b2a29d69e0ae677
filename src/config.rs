//! Settings of the explanation service, read from `fortune-sticks.toml`.
//!
//! ```toml
//! api_key = "..."
//! model = "gemini-3-flash-preview"
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! temperature = 0.7
//! ```
//!
//! Every key is optional. `GEMINI_API_KEY` and `FORTUNE_STICKS_MODEL`
//! environment variables take precedence over the file.
use std::{fs, io, path::Path};

use anyhow::Context;
use bevy::log::{info, warn};
use serde::Deserialize;

pub const CONFIG_PATH: &str = "fortune-sticks.toml";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "FORTUNE_STICKS_MODEL";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExplainerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
}
impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-flash-preview".to_owned(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_owned(),
            temperature: 0.7,
        }
    }
}
impl ExplainerConfig {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read `path`, a missing file gives the defaults.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                Self::parse(&text).with_context(|| format!("invalid config in {}", path.display()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("couldn't read {}", path.display())),
        }
    }

    /// Replace values with those found through `var`.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = var(API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(model) = var(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        self
    }

    /// Config from [`CONFIG_PATH`] and the environment. Never fails, errors
    /// are logged and the defaults used instead.
    pub fn load() -> Self {
        let from_file = Self::read(Path::new(CONFIG_PATH)).unwrap_or_else(|err| {
            warn!("{err:#}, using default explanation settings");
            Self::default()
        });
        let config = from_file.with_overrides(|name| std::env::var(name).ok());
        if config.api_key.is_none() {
            info!("no {API_KEY_VAR} set, explanations will use the fallback text");
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ExplainerConfig::parse("api_key = \"abc\"\ntemperature = 0.2\n").unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.model, ExplainerConfig::default().model);

        assert_eq!(ExplainerConfig::parse("").unwrap(), ExplainerConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(ExplainerConfig::parse("temperature = \"hot\"").is_err());
        assert!(ExplainerConfig::parse("modle = \"typo\"").is_err());
        assert!(ExplainerConfig::parse("api_key = ").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = Path::new("this/file/does/not/exist.toml");
        assert_eq!(ExplainerConfig::read(path).unwrap(), ExplainerConfig::default());
    }

    #[test]
    fn environment_overrides_file() {
        let file = ExplainerConfig::parse("api_key = \"from-file\"\nmodel = \"m1\"").unwrap();
        let env = |name: &str| match name {
            API_KEY_VAR => Some("from-env".to_owned()),
            MODEL_VAR => Some("  ".to_owned()),
            _ => None,
        };
        let config = file.with_overrides(env);
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.model, "m1");

        let untouched = ExplainerConfig::default().with_overrides(|_| None);
        assert_eq!(untouched, ExplainerConfig::default());
    }
}
