//! Request types for host layers (HTTP endpoints, chat commands).
//!
//! Hosts accept loosely-typed input; [`ContemplationRequest::validate`]
//! turns it into a checked [`ValidatedRequest`] that can be handed straight
//! to [`ContemplationEngine::run`](crate::ContemplationEngine::run).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mode::ThoughtMode;

/// Default chain depth for host requests.
pub const DEFAULT_DEPTH: i64 = 3;

/// Largest chain depth accepted from host requests.
pub const MAX_REQUEST_DEPTH: u32 = 10;

/// Seed used by chat hosts when the user supplies none.
pub const DEFAULT_SEED: &str = "What is the nature of consciousness?";

fn default_depth() -> i64 {
    DEFAULT_DEPTH
}

/// Unvalidated contemplation request as received from a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContemplationRequest {
    /// Seed text that starts the chain
    pub prompt: String,
    #[serde(default = "default_depth")]
    pub depth: i64,
    /// Mode name; standard when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl ContemplationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            depth: DEFAULT_DEPTH,
            mode: None,
        }
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Check the depth bound and resolve the mode name.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let mode = match &self.mode {
            Some(name) => name.parse()?,
            None => ThoughtMode::default(),
        };

        if self.depth < 1 {
            return Err(Error::invalid_depth(self.depth));
        }
        if self.depth > i64::from(MAX_REQUEST_DEPTH) {
            return Err(Error::DepthOutOfRange {
                depth: self.depth,
                max: MAX_REQUEST_DEPTH,
            });
        }

        let seed = if self.prompt.trim().is_empty() {
            DEFAULT_SEED.to_string()
        } else {
            self.prompt.clone()
        };

        Ok(ValidatedRequest {
            seed,
            depth: self.depth,
            mode,
        })
    }
}

/// Request that passed host validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub seed: String,
    pub depth: i64,
    pub mode: ThoughtMode,
}
