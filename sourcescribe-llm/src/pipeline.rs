use crate::adapter::{CompletionOptions, LlmAdapter};
use crate::fallback::{decide_next_action, FallbackAction};
use crate::retry::{retry_with_backoff, RetryOutcome};
use crate::token_budget::TokenBudgetEstimator;
use crate::validator::{ResponseValidator, ValidationOutcome};
use sourcescribe_types::{Clock, InvocationStatus, LlmInvocationResult, RetryConfig, StatKey, StatsRecorder};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything the Execution Pipeline needs for one end-to-end "get
/// validated structured output for resource" run.
pub struct PipelineInput {
    /// Identifier used in logs and errors for this invocation.
    pub resource_name: String,
    /// The file content the prompt is built from. Mutated in place (by
    /// cropping) across retries within the same run.
    pub content: String,
    /// Renders the full prompt given the current (possibly cropped)
    /// content — instructions and schema text are never touched by
    /// cropping, only this closure knows how to re-embed content.
    pub render: Arc<dyn Fn(&str) -> String + Send + Sync>,
    /// Identifies the response schema for the validator's schema cache.
    pub template_id: String,
    pub schema: serde_json::Value,
    /// Ordered candidate adapters, tried in order on switch.
    pub adapters: Vec<Arc<dyn LlmAdapter>>,
    pub retry_config: RetryConfig,
    pub completion_options: CompletionOptions,
}

/// Runs the C1–C6 state machine described in the component design: call the
/// current adapter (with retry), validate on completion, and on any other
/// outcome ask the fallback strategy whether to crop, switch, or terminate.
/// Returns the validated JSON value on success. On exhaustion or
/// cancellation, returns the classification of the last result as a
/// string — this is what `sourcescribe_capture`'s File Summarizer persists
/// into `summaryError`.
pub async fn run_pipeline(
    mut input: PipelineInput,
    validator: &ResponseValidator,
    estimator: &TokenBudgetEstimator,
    stats: &StatsRecorder,
    clock: &dyn Clock,
    cancellation: &CancellationToken,
) -> Result<serde_json::Value, String> {
    if input.adapters.is_empty() {
        return Err("no adapters configured".to_string());
    }

    let mut adapter_index = 0usize;
    let mut exceeded_on_current_adapter = false;

    loop {
        if cancellation.is_cancelled() {
            return Err("CANCELLED".to_string());
        }

        let adapter = input.adapters[adapter_index].clone();
        let prompt = (input.render)(&input.content);

        let retry_outcome = retry_with_backoff(
            adapter.as_ref(),
            &prompt,
            &input.completion_options,
            &input.retry_config,
            stats,
            clock,
            cancellation,
        )
        .await;

        let result = match retry_outcome {
            RetryOutcome::Cancelled => return Err("CANCELLED".to_string()),
            RetryOutcome::Settled(result) => result,
        };

        if result.status == InvocationStatus::Completed {
            let raw = result.generated.clone().unwrap_or_default();
            match validator.validate(&input.template_id, &raw, &input.schema) {
                ValidationOutcome::Valid(value) => {
                    stats.increment(StatKey::Success);
                    return Ok(value);
                }
                invalid_outcome => {
                    // Schema failure is treated as INVALID for the current
                    // adapter and consumes no further retries.
                    let as_invalid = LlmInvocationResult::invalid("schema validation failed");
                    let reason = format!(
                        "INVALID: adapter '{}' returned content that failed validation for '{}': {:?}",
                        adapter.name(),
                        input.resource_name,
                        invalid_outcome
                    );
                    match decide_next_action(&as_invalid, adapter_index, input.adapters.len(), false) {
                        FallbackAction::SwitchToNextAdapter => {
                            adapter_index += 1;
                            exceeded_on_current_adapter = false;
                            stats.increment(StatKey::Switch);
                            continue;
                        }
                        FallbackAction::Terminate => {
                            stats.increment(StatKey::Failure);
                            return Err(reason);
                        }
                        FallbackAction::CropPrompt => unreachable!(
                            "decide_next_action never crops an INVALID result"
                        ),
                    }
                }
            }
        }

        let repeated_exceeded =
            exceeded_on_current_adapter && result.status == InvocationStatus::Exceeded;
        let action =
            decide_next_action(&result, adapter_index, input.adapters.len(), repeated_exceeded);

        let status_reason = format!(
            "{:?}: adapter '{}' — {}",
            result.status,
            adapter.name(),
            result.error.as_deref().unwrap_or("no further detail")
        );

        match action {
            FallbackAction::CropPrompt => {
                let token_counts = result
                    .token_counts
                    .expect("decide_next_action only crops when token_counts is present");
                let ratio = estimator.crop_ratio(token_counts.prompt_tokens, token_counts.model_limit);
                let cropped = estimator.crop_content(&input.content, ratio);
                stats.increment(StatKey::Crop);
                if cropped.is_empty() {
                    stats.increment(StatKey::Failure);
                    return Err(format!(
                        "EXCEEDED: prompt for '{}' could not be cropped any further",
                        input.resource_name
                    ));
                }
                input.content = cropped;
                exceeded_on_current_adapter = true;
            }
            FallbackAction::SwitchToNextAdapter => {
                adapter_index += 1;
                exceeded_on_current_adapter = false;
                stats.increment(StatKey::Switch);
            }
            FallbackAction::Terminate => {
                stats.increment(StatKey::Failure);
                return Err(status_reason);
            }
        }
    }
}
