//! Service configuration.
//!
//! Read from the process environment:
//! - `TALLY_SIMPLIFY`: start with simplification enabled (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`).
//! - `TALLY_MAX_SIMPLIFY_PASSES`: ceiling on chain-collapse scans (positive integer).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally_ledger::SimplifyOptions;
use tally_ledger::simplify::DEFAULT_MAX_PASSES;

pub const SIMPLIFY_VAR: &str = "TALLY_SIMPLIFY";
pub const MAX_SIMPLIFY_PASSES_VAR: &str = "TALLY_MAX_SIMPLIFY_PASSES";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: expected a boolean, got {value:?}")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var}: expected a positive integer, got {value:?}")]
    InvalidCount { var: &'static str, value: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub simplify_on_start: bool,
    pub max_simplify_passes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            simplify_on_start: false,
            max_simplify_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable source; unset variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(SIMPLIFY_VAR) {
            config.simplify_on_start = parse_bool(SIMPLIFY_VAR, &value)?;
        }
        if let Some(value) = lookup(MAX_SIMPLIFY_PASSES_VAR) {
            config.max_simplify_passes = match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidCount {
                        var: MAX_SIMPLIFY_PASSES_VAR,
                        value,
                    });
                }
            };
        }

        Ok(config)
    }

    pub fn simplify_options(&self) -> SimplifyOptions {
        SimplifyOptions {
            max_passes: self.max_simplify_passes,
        }
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
