//! Generation backend abstraction.
//!
//! The contemplation loop talks to a language model only through
//! [`GenerationClient`]: one rendered prompt and a temperature in, generated
//! text or a backend error out. Adapters are provided for Ollama and, behind
//! the `openai` feature, OpenAI-compatible servers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use witness_core::llm::{ClientConfig, GenerationClient, GenerationRequest, OllamaClient};
//!
//! let client = OllamaClient::new(ClientConfig::from_env())?;
//! let request = GenerationRequest::new("tinyllama", "What is time?").with_temperature(0.7);
//! let response = client.generate(request).await?;
//! ```

mod client;
mod types;

#[cfg(feature = "openai")]
pub use client::OpenAIClient;
pub use client::{ClientConfig, GenerationClient, OllamaClient, TimeoutClient};
pub use types::{GenerationRequest, GenerationResponse, Provider, TokenUsage};
