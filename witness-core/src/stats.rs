//! Engine statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::mode::ThoughtMode;
use crate::state::EngineState;

/// Point-in-time view of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub uptime: Duration,
    pub total_thoughts: usize,
    pub active_backend: String,
    pub available_modes: Vec<ThoughtMode>,
    pub started_at: DateTime<Utc>,
}

impl EngineStats {
    /// Uptime as `H:MM:SS`.
    pub fn uptime_display(&self) -> String {
        let secs = self.uptime.as_secs();
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Derive statistics from engine state as of `now`.
pub fn snapshot(state: &EngineState, now: Instant) -> EngineStats {
    EngineStats {
        uptime: now.saturating_duration_since(state.started()),
        total_thoughts: state.journal().len(),
        active_backend: state.model().to_string(),
        available_modes: ThoughtMode::ALL.to_vec(),
        started_at: state.started_at(),
    }
}

/// Status payload for host status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    pub model: String,
    pub thoughts_processed: usize,
    pub uptime: String,
    pub modes_available: Vec<ThoughtMode>,
}

impl From<EngineStats> for SystemStatus {
    fn from(stats: EngineStats) -> Self {
        Self {
            status: "active".to_string(),
            uptime: stats.uptime_display(),
            model: stats.active_backend,
            thoughts_processed: stats.total_thoughts,
            modes_available: stats.available_modes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::ThoughtJournal;
    use crate::thought::{ThoughtOutcome, ThoughtRecord};

    #[test]
    fn test_snapshot_reads_state() {
        let state = EngineState::new("tinyllama", ThoughtJournal::in_memory());
        for depth in 1..=3 {
            state.journal().record(
                &ThoughtRecord {
                    depth,
                    input: "in".to_string(),
                    output: "out".to_string(),
                    mode: ThoughtMode::Scientific,
                    timestamp: Utc::now(),
                    outcome: ThoughtOutcome::Generated,
                },
                state.model(),
            );
        }

        let now = state.started() + Duration::from_secs(3725);
        let stats = snapshot(&state, now);

        assert_eq!(stats.uptime, Duration::from_secs(3725));
        assert_eq!(stats.uptime_display(), "1:02:05");
        assert_eq!(stats.total_thoughts, 3);
        assert_eq!(stats.active_backend, "tinyllama");
        assert_eq!(stats.available_modes, ThoughtMode::ALL.to_vec());
    }

    #[test]
    fn test_snapshot_has_no_side_effects() {
        let state = EngineState::new("m", ThoughtJournal::in_memory());
        let now = state.started();
        assert_eq!(snapshot(&state, now), snapshot(&state, now));
        assert_eq!(state.journal().len(), 0);
    }

    #[test]
    fn test_system_status_from_stats() {
        let state = EngineState::new("tinyllama", ThoughtJournal::in_memory());
        let later = state.started() + Duration::from_secs(59);
        let status = SystemStatus::from(snapshot(&state, later));

        assert_eq!(status.status, "active");
        assert_eq!(status.model, "tinyllama");
        assert_eq!(status.thoughts_processed, 0);
        assert_eq!(status.uptime, "0:00:59");
        assert_eq!(status.modes_available.len(), 6);
    }
}
