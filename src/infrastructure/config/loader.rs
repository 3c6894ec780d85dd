use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::OrchestratorConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_concurrent_tasks: {0}. Must be between 1 and 100")]
    InvalidMaxConcurrentTasks(usize),

    #[error("Invalid task_timeout_secs: {0}. Must be positive")]
    InvalidTaskTimeout(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid success_threshold: {0}. Must be between 0.0 and 1.0")]
    InvalidSuccessThreshold(f64),

    #[error("Invalid gate threshold {name}: {value}. Must be between 0.0 and 1.0")]
    InvalidGateThreshold { name: &'static str, value: f64 },

    #[error(
        "Invalid gate risk thresholds: caution ({0}) must be below block ({1})"
    )]
    InvalidRiskOrdering(f64, f64),

    #[error(
        "Invalid gate clarity thresholds: block ({0}) must be below advise ({1})"
    )]
    InvalidClarityOrdering(f64, f64),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. vanguard.yaml in the working directory
    /// 3. Environment variables (VANGUARD_* prefix, highest priority)
    pub fn load() -> Result<OrchestratorConfig> {
        let config: OrchestratorConfig = Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file("vanguard.yaml"))
            .merge(Env::prefixed("VANGUARD_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<OrchestratorConfig> {
        let config: OrchestratorConfig = Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &OrchestratorConfig) -> Result<(), ConfigError> {
        if config.executor.max_concurrent_tasks == 0 || config.executor.max_concurrent_tasks > 100 {
            return Err(ConfigError::InvalidMaxConcurrentTasks(
                config.executor.max_concurrent_tasks,
            ));
        }

        if config.executor.task_timeout_secs == 0 {
            return Err(ConfigError::InvalidTaskTimeout(
                config.executor.task_timeout_secs,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if !(0.0..=1.0).contains(&config.aggregator.success_threshold) {
            return Err(ConfigError::InvalidSuccessThreshold(
                config.aggregator.success_threshold,
            ));
        }

        let gate = &config.gate;
        for (name, value) in [
            ("risk_block_threshold", gate.risk_block_threshold),
            ("risk_caution_threshold", gate.risk_caution_threshold),
            ("clarity_block_threshold", gate.clarity_block_threshold),
            ("clarity_advise_threshold", gate.clarity_advise_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidGateThreshold { name, value });
            }
        }

        if gate.risk_caution_threshold >= gate.risk_block_threshold {
            return Err(ConfigError::InvalidRiskOrdering(
                gate.risk_caution_threshold,
                gate.risk_block_threshold,
            ));
        }

        if gate.clarity_block_threshold >= gate.clarity_advise_threshold {
            return Err(ConfigError::InvalidClarityOrdering(
                gate.clarity_block_threshold,
                gate.clarity_advise_threshold,
            ));
        }

        if config.recovery.initial_backoff_ms >= config.recovery.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.recovery.initial_backoff_ms,
                config.recovery.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
