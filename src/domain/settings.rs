use crate::domain::error::{AppError, Result};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Runtime configuration, sourced from the environment (with `.env` support)
/// layered over an optional `storyforge.toml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub google_api_key: String,
    #[serde(default)]
    pub freepik_api_key: Option<String>,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default)]
    pub allowed_origins: String,
    #[serde(default)]
    pub debug: bool,
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

const ENV_KEYS: &[&str] = &[
    "GOOGLE_API_KEY",
    "FREEPIK_API_KEY",
    "API_PREFIX",
    "ALLOWED_ORIGINS",
    "DEBUG",
    "DATABASE_URL",
    "HOST",
    "PORT",
];

impl Settings {
    pub fn load() -> Result<Self> {
        Figment::new()
            .merge(Toml::file("storyforge.toml"))
            .merge(Env::raw().only(ENV_KEYS))
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load settings: {e}")))
    }

    /// CORS allow-list parsed from the comma-separated ALLOWED_ORIGINS value.
    pub fn allowed_origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| origin.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_origins(origins: &str) -> Settings {
        Settings {
            google_api_key: "test-key".to_string(),
            freepik_api_key: None,
            api_prefix: default_api_prefix(),
            allowed_origins: origins.to_string(),
            debug: false,
            database_url: "postgres://localhost/storyforge".to_string(),
            host: default_host(),
            port: default_port(),
        }
    }

    #[test]
    fn test_origins_split_and_trimmed() {
        let settings =
            settings_with_origins("http://localhost:3000, https://example.com ,http://127.0.0.1");
        assert_eq!(
            settings.allowed_origins_list(),
            vec![
                "http://localhost:3000",
                "https://example.com",
                "http://127.0.0.1"
            ]
        );
    }

    #[test]
    fn test_empty_origins_yield_empty_list() {
        assert!(settings_with_origins("").allowed_origins_list().is_empty());
        assert!(settings_with_origins(" , ")
            .allowed_origins_list()
            .is_empty());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_api_prefix(), "/api");
        assert_eq!(default_port(), 8000);
    }
}
