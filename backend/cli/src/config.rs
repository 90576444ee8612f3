use std::path::PathBuf;

use incident_providers::ProviderSettings;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3000;

/// Incident report runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Upstream completion credential
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    /// Directory for rolling NDJSON logs; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let provider = ProviderSettings::default();
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            openai_api_key: None,
            openai_model: provider.model,
            openai_base_url: provider.base_url,
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_address: non_empty("INCIDENT_BIND").unwrap_or(defaults.bind_address),
            port: non_empty("INCIDENT_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            log_dir: non_empty("INCIDENT_LOG_DIR").map(PathBuf::from),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.openai_model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.openai_model, "gpt-4");
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert!(config.openai_api_key.is_none());
        assert!(config.log_dir.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("INCIDENT_PORT", "8081"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("INCIDENT_LOG_DIR", "/tmp/incident-logs"),
        ]));
        assert_eq!(config.port, 8081);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/incident-logs")));

        let settings = config.provider_settings();
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.model, "gpt-4o-mini");
    }

    #[test]
    fn unparsable_port_and_blank_key_fall_back() {
        let config = Config::from_lookup(lookup(&[("INCIDENT_PORT", "http"), ("OPENAI_API_KEY", " ")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.openai_api_key.is_none());
    }
}
