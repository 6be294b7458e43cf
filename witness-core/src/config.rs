//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::journal::ThoughtJournal;
use crate::postprocess::PostProcessor;

/// Default backend model identifier.
pub const DEFAULT_MODEL: &str = "tinyllama";

/// Default journal directory, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Configuration for a [`ContemplationEngine`](crate::ContemplationEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Backend model identifier, recorded verbatim in every journal line
    pub model: String,
    /// Directory holding the day files of the durable journal
    pub log_dir: PathBuf,
    /// Whether records are written to the durable journal
    pub durable_log: bool,
    /// Seed for frame selection; entropy when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            durable_log: true,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: std::env::var("WITNESS_MODEL").unwrap_or(defaults.model),
            log_dir: std::env::var("WITNESS_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            durable_log: std::env::var("WITNESS_DURABLE_LOG")
                .map(|s| s != "0" && s.to_lowercase() != "false")
                .unwrap_or(defaults.durable_log),
            rng_seed: std::env::var("WITNESS_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_durable_log(mut self, enabled: bool) -> Self {
        self.durable_log = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub(crate) fn journal(&self) -> ThoughtJournal {
        if self.durable_log {
            ThoughtJournal::new(&self.log_dir)
        } else {
            ThoughtJournal::in_memory()
        }
    }

    pub(crate) fn post_processor(&self) -> PostProcessor {
        match self.rng_seed {
            Some(seed) => PostProcessor::seeded(seed),
            None => PostProcessor::from_entropy(),
        }
    }
}
