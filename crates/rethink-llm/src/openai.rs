//! OpenAI-compatible text-completions API integration.
//!
//! Targets the legacy `/completions` route that vLLM serves for raw-prompt
//! inference. The prompt already contains the full conversation markup, so
//! no chat-message structure is sent.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use rethink_core::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use rethink_core::error::{ModelError, Result, RethinkError};
use rethink_core::model::{CompletionModel, SamplingParams};

/// Loopback vLLM server, the usual deployment during evaluation.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/v1";

/// vLLM ignores the key but the header must be present.
pub const DEFAULT_API_KEY: &str = "EMPTY";

// ---------------------------------------------------------------------------
// Completions API request/response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

// ---------------------------------------------------------------------------
// OpenAICompletionModel
// ---------------------------------------------------------------------------

pub struct OpenAICompletionModel {
    api_key: String,
    api_base: String,
    model_id: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAICompletionModel {
    pub fn new(api_key: String, api_base: String, model_id: String) -> Self {
        Self {
            api_key,
            api_base,
            model_id,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            client: reqwest::Client::new(),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn completions_url(&self) -> String {
        format!("{}/completions", self.api_base.trim_end_matches('/'))
    }

    pub fn build_request(&self, prompt: &str, params: &SamplingParams) -> CompletionRequest {
        CompletionRequest {
            model: self.model_id.clone(),
            prompt: prompt.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionModel for OpenAICompletionModel {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        let request_body = self.build_request(prompt, params);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RethinkError::Model(ModelError::ApiRequest(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            let error_msg = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RethinkError::Model(match status.as_u16() {
                401 => ModelError::Auth(error_msg),
                429 => ModelError::RateLimited {
                    retry_after_secs: None,
                },
                _ => ModelError::ApiRequest(format!("HTTP {status}: {error_msg}")),
            }));
        }

        let api_response: CompletionResponse = response
            .json()
            .await
            .map_err(|e| RethinkError::Model(ModelError::InvalidResponse(e.to_string())))?;

        if let Some(usage) = &api_response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "completion received"
            );
        }

        let choice = api_response.choices.first().ok_or_else(|| {
            RethinkError::Model(ModelError::InvalidResponse(
                "no completion choices returned".into(),
            ))
        })?;

        Ok(choice.text.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_model() -> OpenAICompletionModel {
        OpenAICompletionModel::new(
            DEFAULT_API_KEY.into(),
            DEFAULT_API_BASE.into(),
            "r1-distill-32b".into(),
        )
    }

    #[test]
    fn build_request_basic() {
        let model = make_model();
        let params = SamplingParams {
            temperature: 0.6,
            max_tokens: 14000,
        };
        let req = model.build_request("continue this", &params);
        assert_eq!(req.model, "r1-distill-32b");
        assert_eq!(req.prompt, "continue this");
        assert_eq!(req.temperature, 0.6);
        assert_eq!(req.max_tokens, 14000);
    }

    #[test]
    fn request_serializes_expected_fields_only() {
        let model = make_model();
        let req = model.build_request("p", &SamplingParams::default());
        let json = serde_json::to_value(&req).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.contains_key("model"));
        assert!(obj.contains_key("prompt"));
        assert!(obj.contains_key("temperature"));
        assert!(obj.contains_key("max_tokens"));
        assert!(!obj.contains_key("top_p"));
    }

    #[test]
    fn completions_url_joins_base() {
        let model = make_model();
        assert_eq!(
            model.completions_url(),
            "http://localhost:8000/v1/completions"
        );
    }

    #[test]
    fn completions_url_trims_trailing_slash() {
        let model = OpenAICompletionModel::new(
            "EMPTY".into(),
            "http://localhost:8000/v1/".into(),
            "m".into(),
        );
        assert_eq!(
            model.completions_url(),
            "http://localhost:8000/v1/completions"
        );
    }

    #[test]
    fn model_name_matches_id() {
        let model = make_model();
        assert_eq!(model.model_name(), "r1-distill-32b");
    }

    #[test]
    fn with_timeout_overrides_default() {
        let model = make_model();
        assert_eq!(
            model.timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        let model = model.with_timeout(Duration::from_secs(5));
        assert_eq!(model.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn parse_response_text() {
        let json = r#"{
            "id": "cmpl-1",
            "object": "text_completion",
            "choices": [{"index": 0, "text": "  The answer is A.  ", "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 900, "completion_tokens": 120, "total_tokens": 1020}
        }"#;
        let resp: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices.len(), 1);
        assert_eq!(resp.choices[0].text.trim(), "The answer is A.");
    }

    #[test]
    fn parse_response_usage() {
        let json = r#"{
            "choices": [{"text": "ok"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
        }"#;
        let resp: CompletionResponse = serde_json::from_str(json).unwrap();
        let usage = resp.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 20);
        assert_eq!(usage.total_tokens, 30);
    }

    #[test]
    fn parse_response_without_usage() {
        let json = r#"{"choices": [{"text": "ok"}]}"#;
        let resp: CompletionResponse = serde_json::from_str(json).unwrap();
        assert!(resp.usage.is_none());
    }

    #[test]
    fn parse_response_empty_choices() {
        let json = r#"{"choices": []}"#;
        let resp: CompletionResponse = serde_json::from_str(json).unwrap();
        assert!(resp.choices.is_empty());
    }

    #[test]
    fn parse_error_body() {
        let json = r#"{
            "error": {
                "message": "The model `missing` does not exist.",
                "type": "invalid_request_error"
            }
        }"#;
        let err: ApiError = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.message, "The model `missing` does not exist.");
    }
}
