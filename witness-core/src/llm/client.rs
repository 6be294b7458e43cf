//! Generation client trait and backend implementations.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

use super::types::{GenerationRequest, GenerationResponse, Provider, TokenUsage};

/// Request/response interface to a language-model backend.
///
/// Each call is one blocking unit of work from the caller's point of view.
/// Implementations decide their own timeout policy; the contemplation loop
/// imposes none.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate text for a rendered prompt.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;

    /// Get the provider for this client.
    fn provider(&self) -> Provider;
}

#[async_trait]
impl<T: GenerationClient + ?Sized> GenerationClient for Arc<T> {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        (**self).generate(request).await
    }

    fn provider(&self) -> Provider {
        (**self).provider()
    }
}

/// Configuration for HTTP generation clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key, for backends that require one
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: 300,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ollama configuration from `OLLAMA_HOST` and `OLLAMA_TIMEOUT`.
    pub fn from_env() -> Self {
        Self::ollama_from(|key| std::env::var(key).ok())
    }

    /// OpenAI configuration from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `OPENAI_TIMEOUT`.
    #[cfg(feature = "openai")]
    pub fn openai_from_env() -> Self {
        Self::openai_from(|key| std::env::var(key).ok())
    }

    fn ollama_from(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: None,
            base_url: var("OLLAMA_HOST"),
            timeout_secs: parse_timeout(var("OLLAMA_TIMEOUT")),
        }
    }

    #[cfg(feature = "openai")]
    fn openai_from(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: var("OPENAI_API_KEY"),
            base_url: var("OPENAI_BASE_URL"),
            timeout_secs: parse_timeout(var("OPENAI_TIMEOUT")),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn parse_timeout(value: Option<String>) -> u64 {
    value.and_then(|s| s.parse().ok()).unwrap_or(300)
}

fn build_http_client(timeout_secs: u64) -> Result<Client> {
    let timeout = Duration::from_secs(timeout_secs);

    // Proxy auto-detection can panic in some sandboxed environments.
    // Fall back to no-proxy in that case.
    match catch_unwind(AssertUnwindSafe(|| {
        Client::builder().timeout(timeout).build()
    })) {
        Ok(Ok(client)) => Ok(client),
        Ok(Err(_)) | Err(_) => Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e))),
    }
}

/// Ollama chat client.
pub struct OllamaClient {
    config: ClientConfig,
    http: Client,
}

impl OllamaClient {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_secs)?;

        Ok(Self { config, http })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(Self::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

impl<'a> OllamaChatRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            model: &request.model,
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        }
    }
}

fn parse_ollama_response(status: StatusCode, body: &str) -> Result<GenerationResponse> {
    if !status.is_success() {
        if let Ok(error) = serde_json::from_str::<OllamaError>(body) {
            return Err(Error::backend(
                Provider::Ollama.to_string(),
                format!("Ollama API error ({}): {}", status, error.error),
            ));
        }
        return Err(Error::backend(
            Provider::Ollama.to_string(),
            format!("Ollama API error ({}): {}", status, body),
        ));
    }

    let api_response: OllamaChatResponse = serde_json::from_str(body).map_err(|e| {
        Error::backend(
            Provider::Ollama.to_string(),
            format!("Failed to parse response: {}", e),
        )
    })?;

    Ok(GenerationResponse {
        model: api_response.model,
        content: api_response.message.content,
        usage: TokenUsage {
            input_tokens: api_response.prompt_eval_count.unwrap_or(0),
            output_tokens: api_response.eval_count.unwrap_or(0),
        },
        timestamp: Utc::now(),
    })
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let api_request = OllamaChatRequest::from_request(&request);
        let url = format!("{}/api/chat", self.base_url());

        let response = self
            .http
            .post(&url)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                Error::backend(
                    Provider::Ollama.to_string(),
                    format!("HTTP request failed: {}", e),
                )
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::backend(
                Provider::Ollama.to_string(),
                format!("Failed to read response: {}", e),
            )
        })?;

        parse_ollama_response(status, &body)
    }

    fn provider(&self) -> Provider {
        Provider::Ollama
    }
}

/// OpenAI-compatible chat completions client.
#[cfg(feature = "openai")]
pub struct OpenAIClient {
    config: ClientConfig,
    http: Client,
}

#[cfg(feature = "openai")]
impl OpenAIClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";

    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = build_http_client(config.timeout_secs)?;

        Ok(Self { config, http })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(Self::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

// OpenAI API types
#[cfg(feature = "openai")]
#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    temperature: f64,
}

#[cfg(feature = "openai")]
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[cfg(feature = "openai")]
#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OllamaMessage,
}

#[cfg(feature = "openai")]
#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(feature = "openai")]
#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[cfg(feature = "openai")]
#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

#[cfg(feature = "openai")]
impl<'a> OpenAIRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            model: &request.model,
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
        }
    }
}

#[cfg(feature = "openai")]
fn parse_openai_response(status: StatusCode, body: &str) -> Result<GenerationResponse> {
    let provider = Provider::OpenAI.to_string();

    if !status.is_success() {
        if let Ok(error) = serde_json::from_str::<OpenAIError>(body) {
            return Err(Error::backend(
                &provider,
                format!("OpenAI API error: {}", error.error.message),
            ));
        }
        return Err(Error::backend(
            &provider,
            format!("OpenAI API error ({}): {}", status, body),
        ));
    }

    let api_response: OpenAIResponse = serde_json::from_str(body)
        .map_err(|e| Error::backend(&provider, format!("Failed to parse response: {}", e)))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::backend(&provider, "No choices in response"))?;

    let usage = api_response
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(GenerationResponse {
        model: api_response.model,
        content: choice.message.content,
        usage,
        timestamp: Utc::now(),
    })
}

#[cfg(feature = "openai")]
#[async_trait]
impl GenerationClient for OpenAIClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let provider = Provider::OpenAI.to_string();
        let api_request = OpenAIRequest::from_request(&request);
        let url = format!("{}/v1/chat/completions", self.base_url());

        let mut builder = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .json(&api_request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::backend(&provider, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::backend(&provider, format!("Failed to read response: {}", e)))?;

        parse_openai_response(status, &body)
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }
}

/// Client wrapper that bounds the latency of every call.
///
/// The contemplation loop has no intrinsic timeout; hosts that need one wrap
/// their backend in this decorator. An elapsed call surfaces as
/// [`Error::Timeout`], which the loop absorbs like any other backend failure.
pub struct TimeoutClient<C> {
    inner: C,
    timeout: Duration,
}

impl<C: GenerationClient> TimeoutClient<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<C: GenerationClient> GenerationClient for TimeoutClient<C> {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        match tokio::time::timeout(self.timeout, self.inner.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(self.timeout.as_millis() as u64)),
        }
    }

    fn provider(&self) -> Provider {
        self.inner.provider()
    }
}


#[cfg(all(test, feature = "openai"))]
mod openai_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_openai_env_uses_its_own_variables() {
        let config = ClientConfig::openai_from(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "OLLAMA_HOST" => Some("http://gpu-box:11434".to_string()),
            _ => None,
        });

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url, None);
        assert_eq!(config.timeout_secs, 300);

        let client = OpenAIClient::new(config).unwrap();
        assert_eq!(client.base_url(), "https://api.openai.com");
        assert_eq!(client.provider(), Provider::OpenAI);
    }

    #[test]
    fn test_openai_request_shape() {
        let request = GenerationRequest::new("gpt-4o-mini", "Respond mystically about: fog")
            .with_temperature(1.0);
        let body = serde_json::to_value(OpenAIRequest::from_request(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "Respond mystically about: fog"}],
                "temperature": 1.0
            })
        );
    }

    #[test]
    fn test_parse_openai_success_maps_usage() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Fog is a veil."}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        }"#;

        let response = parse_openai_response(StatusCode::OK, body).unwrap();
        assert_eq!(response.model, "gpt-4o-mini");
        assert_eq!(response.content, "Fog is a veil.");
        assert_eq!(
            response.usage,
            TokenUsage {
                input_tokens: 12,
                output_tokens: 4,
            }
        );
    }

    #[test]
    fn test_parse_openai_without_usage() {
        let body = json!({
            "model": "m",
            "choices": [{"message": {"role": "assistant", "content": "x"}}]
        })
        .to_string();
        let response = parse_openai_response(StatusCode::OK, &body).unwrap();
        assert_eq!(response.usage.total(), 0);
    }

    #[test]
    fn test_parse_openai_error_body() {
        let body = json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })
        .to_string();
        let err = parse_openai_response(StatusCode::UNAUTHORIZED, &body).unwrap_err();

        assert!(err.is_backend());
        assert_eq!(
            err.to_string(),
            "openai backend error: OpenAI API error: Incorrect API key provided"
        );
    }

    #[test]
    fn test_parse_openai_unstructured_error() {
        let err = parse_openai_response(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert!(err.to_string().contains("502 Bad Gateway"));
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_parse_openai_empty_choices() {
        let body = r#"{"model": "m", "choices": []}"#;
        let err = parse_openai_response(StatusCode::OK, body).unwrap_err();
        assert!(err.to_string().contains("No choices in response"));
    }

    #[test]
    fn test_parse_openai_malformed_body() {
        let err = parse_openai_response(StatusCode::OK, "<html>").unwrap_err();
        assert!(err.is_backend());
        assert!(err.to_string().contains("Failed to parse response"));
    }
}
