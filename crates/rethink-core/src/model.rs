use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sampling controls forwarded with each completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            max_tokens: 2048,
        }
    }
}

/// Trait for text-completion language models.
///
/// Implementations handle API communication, request formatting, and
/// response parsing for a specific endpoint. The prompt is already fully
/// rendered text; no chat-message structure is involved.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String>;

    /// Return the model name/identifier.
    fn model_name(&self) -> &str;
}
