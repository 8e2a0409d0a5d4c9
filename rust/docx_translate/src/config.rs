// Application configuration: JSON file, then environment, then CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use translation_service::{LanguageCode, ProviderSettings, ServiceKind};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
}

impl LanguageOption {
    fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

fn default_languages() -> Vec<LanguageOption> {
    vec![
        LanguageOption::new("en", "English"),
        LanguageOption::new("vi", "Vietnamese"),
        LanguageOption::new("fr", "French"),
        LanguageOption::new("es", "Spanish"),
        LanguageOption::new("de", "German"),
        LanguageOption::new("zh-CN", "Chinese (Simplified)"),
    ]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ServiceKind,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub source_lang: String,
    pub default_target_lang: String,
    pub languages: Vec<LanguageOption>,
    pub timeout_secs: u64,
    pub retry_transient: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ServiceKind::default(),
            api_key: None,
            endpoint: None,
            source_lang: "auto".to_string(),
            default_target_lang: "vi".to_string(),
            languages: default_languages(),
            timeout_secs: 30,
            retry_transient: true,
        }
    }
}

impl AppConfig {
    /// Read the optional JSON file and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Environment overrides. `lookup` is `std::env::var` outside of tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("DOCX_TRANSLATE_API_KEY").or_else(|| non_empty(self.provider.key_env_var())) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = non_empty("DOCX_TRANSLATE_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be greater than zero".to_string()));
        }
        LanguageCode::parse(&self.default_target_lang)
            .map_err(|e| ConfigError::Invalid(format!("default_target_lang: {}", e)))?;
        LanguageCode::parse_source(&self.source_lang).map_err(|e| ConfigError::Invalid(format!("source_lang: {}", e)))?;
        if let Some(bad) = self.languages.iter().find(|l| LanguageCode::parse(&l.code).is_err()) {
            return Err(ConfigError::Invalid(format!("languages: {:?} is not a language code", bad.code)));
        }
        if self.provider == ServiceKind::Libre && self.endpoint.as_deref().map_or(true, |e| e.trim().is_empty()) {
            return Err(ConfigError::Invalid("the libre provider requires an endpoint".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn default_target(&self) -> Result<LanguageCode, ConfigError> {
        LanguageCode::parse(&self.default_target_lang)
            .map_err(|e| ConfigError::Invalid(format!("default_target_lang: {}", e)))
    }

    pub fn provider_settings(&self) -> Result<ProviderSettings, ConfigError> {
        let source_lang = LanguageCode::parse_source(&self.source_lang)
            .map_err(|e| ConfigError::Invalid(format!("source_lang: {}", e)))?;
        Ok(ProviderSettings {
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
            source_lang,
            timeout: self.timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.provider, ServiceKind::Google);
        assert_eq!(config.default_target_lang, "vi");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.languages.iter().map(|l| l.code.as_str()).collect::<Vec<_>>(),
            vec!["en", "vi", "fr", "es", "de", "zh-CN"]
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"provider":"deepl","timeout_secs":5}}"#).unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.provider, ServiceKind::Deepl);
        assert_eq!(config.timeout_secs, 5);
        assert!(config.retry_transient);
        assert_eq!(config.source_lang, "auto");
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(AppConfig::from_file(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn generic_key_wins_over_provider_key() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("GOOGLE_TRANSLATE_API_KEY", "g"), ("DOCX_TRANSLATE_API_KEY", "generic")]));
        assert_eq!(config.api_key.as_deref(), Some("generic"));

        let mut config = AppConfig::default();
        config.apply_env(env(&[("GOOGLE_TRANSLATE_API_KEY", "g"), ("DOCX_TRANSLATE_API_KEY", " ")]));
        assert_eq!(config.api_key.as_deref(), Some("g"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.default_target_lang = "auto".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider = ServiceKind::Libre;
        assert!(config.validate().is_err());
        config.apply_env(env(&[("DOCX_TRANSLATE_ENDPOINT", "http://localhost:5000")]));
        config.validate().unwrap();
    }
}
