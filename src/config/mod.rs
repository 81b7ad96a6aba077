//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `EXPERIMENT_LIFECYCLE` prefix and nested values use double underscores as
//! separators. Every section has defaults, so an empty environment is valid.
//!
//! # Example
//!
//! ```no_run
//! use experiment_lifecycle::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Worker concurrency: {}", config.scheduler.worker_concurrency);
//! ```

mod error;
mod lifecycle;
mod logging;
mod scheduler;

pub use error::{ConfigError, ValidationError};
pub use lifecycle::LifecycleConfig;
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use scheduler::{SchedulerConfig, MAX_WORKER_CONCURRENCY};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log level and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Status ledger policy
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Task queue and worker settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `EXPERIMENT_LIFECYCLE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `EXPERIMENT_LIFECYCLE__SCHEDULER__WORKER_CONCURRENCY=16`
    /// - `EXPERIMENT_LIFECYCLE__LIFECYCLE__POST_TERMINAL_POLICY=forbid`
    /// - `EXPERIMENT_LIFECYCLE__LOGGING__FORMAT=json`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EXPERIMENT_LIFECYCLE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lifecycle::PostTerminalPolicy;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "EXPERIMENT_LIFECYCLE__LOGGING__FORMAT",
        "EXPERIMENT_LIFECYCLE__LIFECYCLE__POST_TERMINAL_POLICY",
        "EXPERIMENT_LIFECYCLE__SCHEDULER__WORKER_CONCURRENCY",
        "EXPERIMENT_LIFECYCLE__SCHEDULER__SCHEDULE_ON_CREATE",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(
            config.lifecycle.post_terminal_policy,
            PostTerminalPolicy::TerminalOverride
        );
        assert_eq!(config.scheduler.worker_concurrency, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EXPERIMENT_LIFECYCLE__LOGGING__FORMAT", "json");
        env::set_var("EXPERIMENT_LIFECYCLE__LIFECYCLE__POST_TERMINAL_POLICY", "forbid");
        env::set_var("EXPERIMENT_LIFECYCLE__SCHEDULER__WORKER_CONCURRENCY", "16");
        env::set_var("EXPERIMENT_LIFECYCLE__SCHEDULER__SCHEDULE_ON_CREATE", "false");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.lifecycle.post_terminal_policy, PostTerminalPolicy::Forbid);
        assert_eq!(config.scheduler.worker_concurrency, 16);
        assert!(!config.scheduler.schedule_on_create);
    }

    #[test]
    fn test_validate_rejects_excess_concurrency() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("EXPERIMENT_LIFECYCLE__SCHEDULER__WORKER_CONCURRENCY", "1000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidConcurrency {
                max: MAX_WORKER_CONCURRENCY
            })
        );
    }
}
