//! # witness-core
//!
//! A recursive contemplation engine: text is sent to a language-model
//! backend, the reply is fed back in as the next input, and the resulting
//! chain of thoughts is journaled for audit and statistics.
//!
//! ## Core Components
//!
//! - **Mode**: closed set of thought modes with prompt template, temperature
//!   and decoration frames
//! - **PostProcessor**: seedable frame decoration for poetic and mystical modes
//! - **LLM**: generation backend trait with Ollama and OpenAI-compatible adapters
//! - **Journal**: in-memory mirror plus day-keyed NDJSON files
//! - **Engine**: the feedback loop (`think`, `run`, `snapshot`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use witness_core::{ClientConfig, ContemplationEngine, EngineConfig, OllamaClient, ThoughtMode};
//!
//! let client = Arc::new(OllamaClient::new(ClientConfig::from_env())?);
//! let engine = ContemplationEngine::new(client, EngineConfig::from_env());
//!
//! let chain = engine.run("What is time?", 3, ThoughtMode::Philosophical).await?;
//! for thought in &chain {
//!     println!("{}: {}", thought.depth, thought.output);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod journal;
pub mod llm;
pub mod mode;
pub mod postprocess;
pub mod request;
pub mod state;
pub mod stats;
pub mod thought;

// Re-exports for convenience
pub use config::EngineConfig;
pub use engine::ContemplationEngine;
pub use error::{Error, Result};
pub use journal::{journal_path, journal_path_for_date, LogEntry, ThoughtJournal};
#[cfg(feature = "openai")]
pub use llm::OpenAIClient;
pub use llm::{
    ClientConfig, GenerationClient, GenerationRequest, GenerationResponse, OllamaClient, Provider,
    TimeoutClient, TokenUsage,
};
pub use mode::{mode_catalog, resolve, resolve_named, ModeInfo, ModeProfile, ThoughtMode};
pub use postprocess::PostProcessor;
pub use request::{ContemplationRequest, ValidatedRequest};
pub use state::EngineState;
pub use stats::{EngineStats, SystemStatus};
pub use thought::{ThoughtChain, ThoughtOutcome, ThoughtRecord};
