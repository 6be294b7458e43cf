//! The contemplation engine: a self-feeding generation loop.
//!
//! Each step renders the current input through the mode's template, asks the
//! backend for a continuation at the mode's temperature, decorates the result
//! and journals it. The decorated output becomes the next step's input.
//!
//! Backend failures do not abort a chain. The failing step's output becomes
//! sentinel text embedding the cause, the record is marked
//! [`ThoughtOutcome::Absorbed`], and the sentinel is fed forward like any
//! other output. Callers detect degraded steps through the record outcome.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::llm::{GenerationClient, GenerationRequest};
use crate::mode::{self, ThoughtMode};
use crate::postprocess::PostProcessor;
use crate::state::EngineState;
use crate::stats::{self, EngineStats};
use crate::thought::{sentinel, ThoughtChain, ThoughtOutcome, ThoughtRecord};

// Upper bound on records reserved before the first step. Chains grow as they run.
const PREALLOCATED_STEPS: usize = 16;

/// Drives contemplation chains against one generation backend.
///
/// The engine is `Send + Sync`; share it behind an `Arc` to serve
/// independent chains concurrently. Steps within one chain always run
/// sequentially.
pub struct ContemplationEngine {
    client: Arc<dyn GenerationClient>,
    processor: PostProcessor,
    state: EngineState,
}

impl ContemplationEngine {
    pub fn new(client: Arc<dyn GenerationClient>, config: EngineConfig) -> Self {
        Self {
            client,
            processor: config.post_processor(),
            state: EngineState::new(config.model.clone(), config.journal()),
        }
    }

    /// Replace the post-processor, e.g. to pin frame selection.
    pub fn with_post_processor(mut self, processor: PostProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Backend model identifier.
    pub fn model(&self) -> &str {
        self.state.model()
    }

    /// Single contemplation step on `prompt`, returning the processed output.
    ///
    /// The step is journaled at depth 1. On backend failure the returned text
    /// is the sentinel.
    pub async fn think(&self, prompt: &str, mode: ThoughtMode) -> String {
        self.step(prompt, 1, mode).await.output
    }

    /// Run one iteration of the loop at `depth`, journaling the record.
    pub async fn step(&self, input: &str, depth: u32, mode: ThoughtMode) -> ThoughtRecord {
        let profile = mode::resolve(mode);
        let request = GenerationRequest::new(self.state.model(), profile.render(input))
            .with_temperature(profile.temperature);

        let (raw, outcome) = match self.client.generate(request).await {
            Ok(response) => {
                debug!(
                    depth,
                    %mode,
                    output_tokens = response.usage.output_tokens,
                    "Generated thought"
                );
                (response.content, ThoughtOutcome::Generated)
            }
            Err(e) => {
                let cause = e.to_string();
                warn!(depth, %mode, error = %cause, "Backend failed; absorbing into chain");
                (sentinel(&cause), ThoughtOutcome::Absorbed { cause })
            }
        };

        let record = ThoughtRecord {
            depth,
            input: input.to_string(),
            output: self.processor.apply(mode, &raw),
            mode,
            timestamp: Utc::now(),
            outcome,
        };
        self.state.journal().record(&record, self.state.model());
        record
    }

    /// Run a chain of `depth` steps starting from `seed`.
    ///
    /// Fails with [`Error::InvalidDepth`] when `depth < 1` and with
    /// [`Error::DepthOutOfRange`] above `u32::MAX`, before any backend call or
    /// journal write. Otherwise always returns exactly `depth` records.
    #[instrument(skip(self, seed), fields(model = %self.state.model()))]
    pub async fn run(&self, seed: &str, depth: i64, mode: ThoughtMode) -> Result<ThoughtChain> {
        let depth = validate_depth(depth)?;
        info!("Starting contemplation chain");

        let mut chain = ThoughtChain::with_capacity((depth as usize).min(PREALLOCATED_STEPS));
        let mut current = seed.to_string();
        for i in 1..=depth {
            let record = self.step(&current, i, mode).await;
            current.clone_from(&record.output);
            chain.push(record);
        }

        let degraded = chain.degraded().count();
        if degraded > 0 {
            warn!(degraded, "Contemplation chain completed with absorbed backend failures");
        } else {
            info!("Contemplation chain completed");
        }
        Ok(chain)
    }

    /// Run a chain with the mode given by name.
    ///
    /// Unknown modes are rejected before any backend call.
    pub async fn run_named(&self, seed: &str, depth: i64, mode: &str) -> Result<ThoughtChain> {
        let mode: ThoughtMode = mode.parse()?;
        self.run(seed, depth, mode).await
    }

    /// Current engine statistics.
    pub fn snapshot(&self) -> EngineStats {
        stats::snapshot(&self.state, Instant::now())
    }
}

impl std::fmt::Debug for ContemplationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContemplationEngine")
            .field("provider", &self.client.provider())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn validate_depth(depth: i64) -> Result<u32> {
    if depth < 1 {
        return Err(Error::invalid_depth(depth));
    }
    u32::try_from(depth).map_err(|_| Error::DepthOutOfRange {
        depth,
        max: u32::MAX,
    })
}
