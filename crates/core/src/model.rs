//! ChatModel trait — the abstraction over hosted LLM backends.
//!
//! A ChatModel knows how to send a turn sequence to a remote model and get
//! a single complete reply back. No streaming, no function calling: tools
//! are rendered into the prompt text upstream, so the wire request is a
//! plain chat completion.
//!
//! Implementations: Groq, OpenAI, any OpenAI-compatible endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::turn::Turn;

/// A request for one chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "llama3-8b-8192", "gpt-4o-mini")
    pub model: String,

    /// The full turn sequence: system turn, history window, current query
    pub turns: Vec<Turn>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl CompletionRequest {
    /// Build a request with default sampling settings.
    pub fn new(model: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            turns,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// A complete response from a model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The generated reply text
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the backend reports them
    pub usage: Option<TokenUsage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core ChatModel trait.
///
/// Every backend implements this. The orchestrator calls `complete()`
/// without knowing which backend is behind it — pure polymorphism.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// A human-readable name for this backend (e.g., "groq", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, ModelError>;
}

impl std::fmt::Debug for dyn ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_defaults() {
        let req = CompletionRequest::new("llama3-8b-8192", vec![Turn::user("hi")]);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
        assert_eq!(req.turns.len(), 1);
    }

    #[test]
    fn completion_serialization_roundtrip() {
        let completion = Completion {
            content: "hello".into(),
            model: "llama3-8b-8192".into(),
            usage: Some(TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 3,
                total_tokens: 15,
            }),
        };
        let json = serde_json::to_string(&completion).unwrap();
        let back: Completion = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "hello");
        assert_eq!(back.usage.unwrap().total_tokens, 15);
    }
}
