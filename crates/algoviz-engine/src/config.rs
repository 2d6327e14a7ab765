//! Engine configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default milliseconds per base step.
pub const DEFAULT_SPEED_MS: u64 = 500;

/// Default number of log lines retained by the store.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Configuration for a visualization session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Milliseconds per base step at startup.
    pub speed_ms: u64,
    /// Lower bound for user supplied speeds.
    pub min_speed_ms: u64,
    /// Upper bound for user supplied speeds.
    pub max_speed_ms: u64,
    /// Number of log lines kept (most recent first).
    pub log_capacity: usize,
    /// Seed for problem generators. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed_ms: DEFAULT_SPEED_MS,
            min_speed_ms: 0,
            max_speed_ms: 5_000,
            log_capacity: DEFAULT_LOG_CAPACITY,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create a config tuned for tests: no delays and a fixed seed.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            speed_ms: 0,
            seed: Some(42),
            ..Default::default()
        }
    }

    /// Build a config from the defaults overridden by environment variables.
    ///
    /// Recognised variables: `ALGOVIZ_SPEED_MS`, `ALGOVIZ_SEED`,
    /// `ALGOVIZ_LOG_CAPACITY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup("ALGOVIZ_SPEED_MS") {
            config.speed_ms = parse_var("ALGOVIZ_SPEED_MS", &raw)?;
        }
        if let Some(raw) = lookup("ALGOVIZ_SEED") {
            config.seed = Some(parse_var("ALGOVIZ_SEED", &raw)?);
        }
        if let Some(raw) = lookup("ALGOVIZ_LOG_CAPACITY") {
            config.log_capacity = parse_var("ALGOVIZ_LOG_CAPACITY", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants between fields.
    pub fn validate(&self) -> Result<()> {
        if self.min_speed_ms > self.max_speed_ms {
            return Err(Error::InvalidConfig(format!(
                "min_speed_ms ({}) exceeds max_speed_ms ({})",
                self.min_speed_ms, self.max_speed_ms
            )));
        }
        if self.log_capacity == 0 {
            return Err(Error::InvalidConfig("log_capacity must be positive".into()));
        }
        Ok(())
    }

    /// Clamp a requested speed into the configured bounds.
    pub fn clamp_speed(&self, speed_ms: u64) -> u64 {
        speed_ms.clamp(self.min_speed_ms, self.max_speed_ms)
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{key}={raw:?} is not a valid number")))
}
