//! Engine-owned state.

use chrono::{DateTime, Utc};
use std::time::Instant;

use crate::journal::ThoughtJournal;

/// State owned by one engine instance for its whole lifetime.
#[derive(Debug)]
pub struct EngineState {
    model: String,
    started: Instant,
    started_at: DateTime<Utc>,
    journal: ThoughtJournal,
}

impl EngineState {
    pub fn new(model: impl Into<String>, journal: ThoughtJournal) -> Self {
        Self {
            model: model.into(),
            started: Instant::now(),
            started_at: Utc::now(),
            journal,
        }
    }

    /// Backend model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Monotonic start instant, used for uptime.
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Wall-clock start time.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn journal(&self) -> &ThoughtJournal {
        &self.journal
    }
}
