//! Request and response types for generation backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generation backend provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Ollama,
    OpenAI,
    /// Test doubles and host-supplied adapters
    Custom,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAI => write!(f, "openai"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// A single-prompt generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier passed to the backend
    pub model: String,
    /// Fully rendered prompt text
    pub prompt: String,
    /// Sampling temperature (0.0 - 1.0)
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }
}

/// Token accounting reported by the backend, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Generated text returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model that actually served the request
    pub model: String,
    /// Generated text
    pub content: String,
    /// Token usage
    #[serde(default)]
    pub usage: TokenUsage,
    /// When the response was received
    pub timestamp: DateTime<Utc>,
}

impl GenerationResponse {
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: content.into(),
            usage: TokenUsage::default(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_clamps_temperature() {
        let request = GenerationRequest::new("tinyllama", "hello").with_temperature(1.4);
        assert_eq!(request.model, "tinyllama");
        assert_eq!(request.prompt, "hello");
        assert_eq!(request.temperature, 1.0);
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(Provider::Ollama.to_string(), "ollama");
        assert_eq!(Provider::OpenAI.to_string(), "openai");
    }

    #[test]
    fn test_usage_total() {
        let usage = TokenUsage {
            input_tokens: 12,
            output_tokens: 30,
        };
        assert_eq!(usage.total(), 42);
    }
}
