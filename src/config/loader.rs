//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ApiConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without validating it.
pub fn read_config_file(path: &Path) -> Result<ApiConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ApiConfig, ConfigError> {
    let config = read_config_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so tests do not mutate process state.
pub fn apply_env_overrides<F>(config: &mut ApiConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(env) = lookup("ENV") {
        config.env = env;
    }
    if let Some(url) = lookup("DATABASE_URL") {
        config.database_url = url;
    }
    if let Some(url) = lookup("REDIS_URL") {
        config.redis_url = url;
    }
    if let Some(root) = lookup("API_ROOT_PATH") {
        config.root_path = root;
    }
    if let Some(addr) = lookup("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(raw) = lookup("REQUEST_TIMEOUT_MS") {
        config.timeouts.request_ms = raw.trim().parse().map_err(|e| ConfigError::Env {
            name: "REQUEST_TIMEOUT_MS",
            reason: format!("{e}"),
        })?;
    }
    if let Some(raw) = lookup("MAX_BODY_BYTES") {
        config.listener.max_body_bytes = raw.trim().parse().map_err(|e| ConfigError::Env {
            name: "MAX_BODY_BYTES",
            reason: format!("{e}"),
        })?;
    }
    Ok(())
}

/// Build the effective configuration: defaults, then the optional file,
/// then environment overrides, then validation.
pub fn load_effective_config<F>(path: Option<&Path>, lookup: F) -> Result<ApiConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => ApiConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut config = ApiConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("ENV", "production"),
                ("REDIS_URL", "redis://cache:6380/1"),
                ("API_ROOT_PATH", "/science"),
                ("DATABASE_URL", "postgres://db/app"),
                ("REQUEST_TIMEOUT_MS", "1500"),
                ("MAX_BODY_BYTES", "4096"),
            ]),
        )
        .unwrap();

        assert_eq!(config.env, "production");
        assert_eq!(config.redis_url, "redis://cache:6380/1");
        assert_eq!(config.root_path, "/science");
        assert_eq!(config.database_url, "postgres://db/app");
        assert_eq!(config.timeouts.request_ms, 1500);
        assert_eq!(config.listener.max_body_bytes, 4096);
    }

    #[test]
    fn test_bad_timeout_env_is_reported() {
        let mut config = ApiConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("REQUEST_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: "REQUEST_TIMEOUT_MS", .. }));
    }

    #[test]
    fn test_effective_config_validates() {
        let err = load_effective_config(None, env(&[("API_ROOT_PATH", "science")])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "root_path"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_then_env() {
        let path = std::env::temp_dir().join(format!("science-api-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "env = \"staging\"\nroot_path = \"/from-file\"\n").unwrap();

        let config = load_effective_config(Some(&path), env(&[("API_ROOT_PATH", "/from-env")])).unwrap();
        assert_eq!(config.env, "staging");
        assert_eq!(config.root_path, "/from-env");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
