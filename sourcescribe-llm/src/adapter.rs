use async_trait::async_trait;
use sourcescribe_types::LlmInvocationResult;
use std::collections::HashSet;

/// The two quality tiers a configured adapter may serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ModelQuality {
    Primary,
    Secondary,
}

/// Per-call completion options passed through to the bound model.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: u64,
    pub timeout: std::time::Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_output_tokens: 4096,
            timeout: std::time::Duration::from_secs(60),
        }
    }
}

/// Uniform call surface for one bound (model-family, model-quality)
/// endpoint. Implementations never throw for expected failure modes —
/// every transport error, rate limit, oversize-context, or malformed
/// response is mapped to an `InvocationStatus` on the returned result.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Human-readable identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Request a completion for `prompt`. Transport/remote errors map to
    /// `Errored`; rate-limit/capacity responses map to `Overloaded`;
    /// schema-valid-but-wrong-shape output maps to `Invalid`; "context too
    /// large" maps to `Exceeded` and must populate `token_counts`.
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> LlmInvocationResult;

    /// Request an embedding vector for `text`. A single call; empty or
    /// null content returns `None`. Never panics for expected adapter
    /// failures — returns `None` instead.
    async fn embed(&self, text: &str) -> Option<Vec<f32>>;

    /// The quality tiers this adapter instance is bound to serve.
    fn available_qualities(&self) -> HashSet<ModelQuality>;

    /// Escape hatch for adapters whose underlying client cannot be closed
    /// cleanly and therefore need the process to force-exit rather than
    /// wait on a graceful shutdown.
    fn needs_forced_shutdown(&self) -> bool {
        false
    }
}
