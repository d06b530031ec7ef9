use crate::adapter::{CompletionOptions, LlmAdapter, ModelQuality};
use crate::token_budget::TokenBudgetEstimator;
use async_trait::async_trait;
use sourcescribe_types::{LlmInvocationResult, TokenCounts};
use std::collections::HashSet;

#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(serde::Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u64,
    num_ctx: u64,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(serde::Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(serde::Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// HTTP adapter for a locally-hosted Ollama model. Grounded on the
/// request/response shape used against `http://localhost:11434/api/*`.
/// Ollama silently truncates prompts that exceed a model's context window
/// rather than returning an error, so this adapter pre-flights the prompt
/// size against `context_limit` itself and reports `EXCEEDED` before
/// issuing the request, rather than relying on an HTTP status that will
/// never arrive.
pub struct OllamaAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    embedding_model: String,
    qualities: HashSet<ModelQuality>,
    context_limit: u64,
    estimator: TokenBudgetEstimator,
}

impl OllamaAdapter {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        qualities: HashSet<ModelQuality>,
        context_limit: u64,
    ) -> Result<Self, crate::LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| crate::LlmError::ClientConstruction(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            embedding_model: embedding_model.into(),
            qualities,
            context_limit,
            estimator: TokenBudgetEstimator::default(),
        })
    }
}

#[async_trait]
impl LlmAdapter for OllamaAdapter {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> LlmInvocationResult {
        let prompt_tokens = self.estimator.estimate_tokens(prompt);
        if prompt_tokens + self.estimator.completion_reserve > self.context_limit {
            return LlmInvocationResult::exceeded(
                format!("prompt estimated at {prompt_tokens} tokens exceeds {} context window", self.context_limit),
                TokenCounts { prompt_tokens, completion_tokens: 0, model_limit: self.context_limit },
            );
        }

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: options.temperature,
                num_predict: options.max_output_tokens,
                num_ctx: self.context_limit,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .timeout(options.timeout)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return LlmInvocationResult::errored(format!("timed out: {e}")),
            Err(e) => return LlmInvocationResult::errored(format!("transport error: {e}")),
        };

        let status = response.status();
        if status.as_u16() == 429 || status.as_u16() == 503 {
            return LlmInvocationResult::overloaded(format!("provider reported {status}"));
        }
        if !status.is_success() {
            return LlmInvocationResult::errored(format!("provider returned {status}"));
        }

        match response.json::<GenerateResponse>().await {
            Ok(parsed) => LlmInvocationResult::completed(parsed.response),
            Err(e) => LlmInvocationResult::errored(format!("malformed provider response: {e}")),
        }
    }

    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        if text.trim().is_empty() {
            return None;
        }

        let body = EmbeddingsRequest { model: &self.embedding_model, prompt: text };
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&body)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        response.json::<EmbeddingsResponse>().await.ok().map(|r| r.embedding)
    }

    fn available_qualities(&self) -> HashSet<ModelQuality> {
        self.qualities.clone()
    }
}
