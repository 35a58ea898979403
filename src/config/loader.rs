//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `store.url`.
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
/// Environment variable overriding `store.api_key`.
pub const ENV_STORE_KEY: &str = "SUPABASE_ANON_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    finish(config, |key| std::env::var(key).ok())
}

/// Build a configuration from defaults and the environment only.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    finish(AppConfig::default(), |key| std::env::var(key).ok())
}

fn finish<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay store connection parameters from the environment. Empty values
/// are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_STORE_URL).filter(|v| !v.is_empty()) {
        config.store.url = url;
    }
    if let Some(key) = lookup(ENV_STORE_KEY).filter(|v| !v.is_empty()) {
        config.store.api_key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StoreBackend;

    #[test]
    fn test_env_overrides_store_credentials() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_STORE_URL => Some("https://example.supabase.co".to_string()),
            ENV_STORE_KEY => Some("anon".to_string()),
            _ => None,
        });

        assert_eq!(config.store.url, "https://example.supabase.co");
        assert_eq!(config.store.api_key, "anon");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.store.url = "https://from-file.supabase.co".to_string();
        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.store.url, "https://from-file.supabase.co");
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let result = finish(AppConfig::default(), |_| None);
        let err = result.unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Validation failed: "));
        assert!(text.contains("store.url"));
        assert!(text.contains("store.api_key"));
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("alunos-api-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [store]
            backend = "memory"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.store.backend, StoreBackend::Memory);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("alunos-api.example.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.api.base_path, "alunos-api");
        assert_eq!(config.store.table, "alunos");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/alunos-api.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
