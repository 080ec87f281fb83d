//! Service configuration
//!
//! Defaults overridden by `PACKING_*` environment variables, e.g.
//! `PACKING_BIND_ADDR`, `PACKING_JWT_PUBLIC_KEY`,
//! `PACKING_MAINTENANCE_SCHEDULE`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// PEM text, or a path to a PEM file once loaded from the environment
    pub jwt_public_key: String,
    pub log_filter: String,
    /// Cron expression for the orphan sweep and moderation cleanup
    #[serde(default)]
    pub maintenance_schedule: Option<String>,
    pub run_migrations: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let mut config: ApiConfig = Config::builder()
            .set_default("bind_addr", "0.0.0.0:3001")?
            .set_default("log_filter", "info")?
            .set_default("run_migrations", true)?
            .add_source(Environment::with_prefix("PACKING"))
            .build()?
            .try_deserialize()
            .context("Invalid PACKING_* configuration")?;

        config.jwt_public_key = resolve_public_key(&config.jwt_public_key)?;
        config.maintenance_schedule = config
            .maintenance_schedule
            .filter(|schedule| !schedule.trim().is_empty());
        Ok(config)
    }
}

/// Return the key as is when it is PEM text, otherwise read it from a file
/// relative to the working directory or the crate root
fn resolve_public_key(value: &str) -> Result<String> {
    if value.trim_start().starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    let key = std::fs::read_to_string(value)
        .or_else(|_| {
            let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(value);
            std::fs::read_to_string(path)
        })
        .with_context(|| format!("Failed to read public key file {}", value))?;
    Ok(key.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const PEM: &str = "-----BEGIN PUBLIC KEY-----\nMIIB\n-----END PUBLIC KEY-----";

    fn clear_env() {
        unsafe {
            for key in [
                "PACKING_BIND_ADDR",
                "PACKING_JWT_PUBLIC_KEY",
                "PACKING_LOG_FILTER",
                "PACKING_MAINTENANCE_SCHEDULE",
                "PACKING_RUN_MIGRATIONS",
            ] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults_apply() {
        clear_env();
        unsafe {
            std::env::set_var("PACKING_JWT_PUBLIC_KEY", PEM);
        }

        let config = ApiConfig::load().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.jwt_public_key, PEM);
        assert!(config.maintenance_schedule.is_none());
        assert!(config.run_migrations);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("PACKING_JWT_PUBLIC_KEY", PEM);
            std::env::set_var("PACKING_BIND_ADDR", "127.0.0.1:8080");
            std::env::set_var("PACKING_MAINTENANCE_SCHEDULE", "0 0 3 * * *");
            std::env::set_var("PACKING_RUN_MIGRATIONS", "false");
        }

        let config = ApiConfig::load().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.maintenance_schedule.as_deref(), Some("0 0 3 * * *"));
        assert!(!config.run_migrations);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_public_key_is_required() {
        clear_env();
        assert!(ApiConfig::load().is_err());
    }

    #[test]
    #[serial]
    fn test_unreadable_key_file_fails() {
        clear_env();
        unsafe {
            std::env::set_var("PACKING_JWT_PUBLIC_KEY", "does/not/exist.pem");
        }
        assert!(ApiConfig::load().is_err());
        clear_env();
    }
}
