use sourcescribe_types::{InvocationStatus, LlmInvocationResult};

/// One of three actions the Execution Pipeline takes after a non-completed
/// result has exhausted the Retry Strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackAction {
    /// Shorten the prompt's content section and retry on the same adapter.
    CropPrompt,
    /// Advance to the next configured adapter.
    SwitchToNextAdapter,
    /// No more adapters or recovery strategies remain.
    Terminate,
}

/// Deterministic decision table; no hidden state beyond the arguments.
/// `repeated_exceeded_on_same_adapter` is true when this is not the first
/// `EXCEEDED` the current adapter has produced for this resource (i.e. a
/// previous crop already happened and the adapter exceeded again).
pub fn decide_next_action(
    result: &LlmInvocationResult,
    adapter_index: usize,
    adapter_count: usize,
    repeated_exceeded_on_same_adapter: bool,
) -> FallbackAction {
    let is_last_adapter = adapter_index + 1 >= adapter_count;

    match result.status {
        InvocationStatus::Errored => FallbackAction::Terminate,
        InvocationStatus::Exceeded
            if result.token_counts.is_some() && !repeated_exceeded_on_same_adapter =>
        {
            FallbackAction::CropPrompt
        }
        InvocationStatus::Exceeded | InvocationStatus::Overloaded | InvocationStatus::Invalid => {
            if is_last_adapter {
                FallbackAction::Terminate
            } else {
                FallbackAction::SwitchToNextAdapter
            }
        }
        // COMPLETED is handled upstream in the pipeline's own match arm and
        // never reaches the fallback strategy; treat it as terminal if it
        // somehow does.
        InvocationStatus::Completed => FallbackAction::Terminate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourcescribe_types::TokenCounts;

    fn token_counts() -> TokenCounts {
        TokenCounts { prompt_tokens: 12_000, completion_tokens: 0, model_limit: 8_000 }
    }

    #[test]
    fn exceeded_with_counts_crops() {
        let result = LlmInvocationResult::exceeded("too big", token_counts());
        assert_eq!(decide_next_action(&result, 0, 2, false), FallbackAction::CropPrompt);
    }

    #[test]
    fn exceeded_without_counts_switches() {
        let mut result = LlmInvocationResult::exceeded("too big", token_counts());
        result.token_counts = None;
        assert_eq!(decide_next_action(&result, 0, 2, false), FallbackAction::SwitchToNextAdapter);
    }

    #[test]
    fn repeated_exceeded_on_same_adapter_switches_instead_of_cropping_again() {
        let result = LlmInvocationResult::exceeded("still too big", token_counts());
        assert_eq!(decide_next_action(&result, 0, 2, true), FallbackAction::SwitchToNextAdapter);
    }

    #[test]
    fn overloaded_on_last_adapter_terminates() {
        let result = LlmInvocationResult::overloaded("overloaded");
        assert_eq!(decide_next_action(&result, 1, 2, false), FallbackAction::Terminate);
    }

    #[test]
    fn invalid_on_non_last_adapter_switches() {
        let result = LlmInvocationResult::invalid("bad shape");
        assert_eq!(decide_next_action(&result, 0, 2, false), FallbackAction::SwitchToNextAdapter);
    }

    #[test]
    fn errored_always_terminates_even_with_adapters_remaining() {
        let result = LlmInvocationResult::errored("connection reset");
        assert_eq!(decide_next_action(&result, 0, 3, false), FallbackAction::Terminate);
    }
}
