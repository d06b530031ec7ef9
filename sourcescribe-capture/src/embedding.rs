use sourcescribe_llm::adapter::LlmAdapter;
use sourcescribe_llm::TokenBudgetEstimator;

/// Single-call wrapper over `adapter.embed`. Clips over-long content using
/// the same cropping heuristic C3 uses for prompts, pre-emptively — the
/// adapter contract's `embed` surface has no status channel of its own, so
/// oversize content is handled before the call rather than reacted to
/// after. Validates every returned vector against the dimension fixed at
/// composition-root wire-up; a mismatch is treated as an embedding failure
/// (null vector), never a record rejection.
pub struct EmbeddingPipeline {
    estimator: TokenBudgetEstimator,
    context_limit: u64,
    expected_dimension: usize,
}

impl EmbeddingPipeline {
    pub fn new(expected_dimension: usize, context_limit: u64) -> Self {
        Self { estimator: TokenBudgetEstimator::default(), context_limit, expected_dimension }
    }

    pub async fn embed(&self, adapter: &dyn LlmAdapter, text: &str, resource_name: &str) -> Option<Vec<f32>> {
        if text.trim().is_empty() {
            return None;
        }

        let estimated_tokens = self.estimator.estimate_tokens(text);
        let content = if estimated_tokens > self.context_limit {
            let ratio = self.estimator.crop_ratio(estimated_tokens, self.context_limit);
            let cropped = self.estimator.crop_content(text, ratio);
            if cropped.is_empty() {
                tracing::warn!(resource = resource_name, "content crops to nothing before embedding, skipping");
                return None;
            }
            cropped
        } else {
            text.to_string()
        };

        let vector = adapter.embed(&content).await?;
        if vector.len() != self.expected_dimension {
            tracing::warn!(
                resource = resource_name,
                got = vector.len(),
                expected = self.expected_dimension,
                "embedding dimension mismatch, discarding"
            );
            return None;
        }
        Some(vector)
    }
}
