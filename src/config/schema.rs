//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the API.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environments in which raw internal failure text may be returned to clients.
const TRUSTED_ENVS: &[&str] = &["local", "dev", "development", "test"];

/// Root configuration for the API service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Human readable service name, reported in logs.
    pub api_name: String,

    /// Deployment environment label (`ENV`).
    pub env: String,

    /// Relational store connection string (`DATABASE_URL`).
    /// Carried for deployments; no route uses it yet.
    pub database_url: String,

    /// Cache service connection string (`REDIS_URL`).
    pub redis_url: String,

    /// URL prefix applied to every route (`API_ROOT_PATH`).
    pub root_path: String,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Cache liveness ping settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_name: "AI for Science API".to_string(),
            env: "local".to_string(),
            database_url: "sqlite+aiosqlite:///./app.db".to_string(),
            redis_url: "redis://redis:6379/0".to_string(),
            root_path: String::new(),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            cache: CacheConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Whether internal failure descriptions may be included in 500 bodies.
    pub fn expose_error_detail(&self) -> bool {
        TRUSTED_ENVS
            .iter()
            .any(|env| self.env.eq_ignore_ascii_case(env))
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Largest request body accepted by the generate route, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time budget for handling one request, in milliseconds.
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 9000 }
    }
}

/// Cache liveness ping configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Deadline for a single connect + PING round trip, in milliseconds.
    pub ping_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ping_timeout_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let config = ApiConfig::default();
        assert_eq!(config.env, "local");
        assert_eq!(config.redis_url, "redis://redis:6379/0");
        assert_eq!(config.root_path, "");
        assert_eq!(config.timeouts.request_ms, 9000);
        assert_eq!(config.listener.max_body_bytes, 16 * 1024 * 1024);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(
            r#"
            env = "staging"

            [timeouts]
            request_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.env, "staging");
        assert_eq!(config.timeouts.request_ms, 250);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.cache.ping_timeout_ms, 1000);
    }

    #[test]
    fn test_error_detail_exposed_only_in_trusted_envs() {
        let mut config = ApiConfig::default();
        assert!(config.expose_error_detail());

        config.env = "Development".into();
        assert!(config.expose_error_detail());

        config.env = "production".into();
        assert!(!config.expose_error_detail());
    }
}
