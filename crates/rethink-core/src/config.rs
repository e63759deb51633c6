use serde::{Deserialize, Serialize};

use crate::model::SamplingParams;
use crate::prompt::PromptType;

pub const DEFAULT_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Joint traces can run very long; requests are given a generous timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 2400;

/// Settings shared by the sequential and batch evaluation paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Model identifier sent with each request; also scopes log paths.
    pub model: String,

    pub prompt_type: PromptType,

    pub temperature: f64,

    /// Accepted for interface parity; not forwarded to the endpoint.
    pub top_p: f64,

    pub max_tokens: u32,

    pub request_timeout_secs: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            prompt_type: PromptType::Direct,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl EvalConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_prompt_type(mut self, prompt_type: PromptType) -> Self {
        self.prompt_type = prompt_type;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Sampling parameters at the configured token budget.
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
