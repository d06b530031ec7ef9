use crate::adapter::{CompletionOptions, LlmAdapter};
use rand::Rng;
use sourcescribe_types::{InvocationStatus, LlmInvocationResult, RetryConfig, StatKey, StatsRecorder};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of wrapping one adapter call in retry logic.
#[derive(Debug, Clone)]
pub enum RetryOutcome {
    /// The call settled on a final result (possibly after retries).
    Settled(LlmInvocationResult),
    /// The surrounding context was cancelled while a retry sleep was
    /// pending.
    Cancelled,
}

/// Calls `adapter.complete` and retries on `OVERLOADED` or `INVALID`,
/// backing off with `delay_n = minRetryDelayMs * backoffMultiplier^n *
/// (1 + U[-jitter, +jitter])` between attempts. Every retry increments the
/// matching counter in the Stats Recorder. Other statuses are returned
/// immediately without consuming a retry.
pub async fn retry_with_backoff(
    adapter: &dyn LlmAdapter,
    prompt: &str,
    options: &CompletionOptions,
    config: &RetryConfig,
    stats: &StatsRecorder,
    clock: &dyn sourcescribe_types::Clock,
    cancellation: &CancellationToken,
) -> RetryOutcome {
    let mut attempt = 0u32;
    loop {
        if cancellation.is_cancelled() {
            return RetryOutcome::Cancelled;
        }

        let result = adapter.complete(prompt, options).await;
        attempt += 1;

        let retry_key = match result.status {
            InvocationStatus::Overloaded => Some(StatKey::OverloadRetry),
            InvocationStatus::Invalid => Some(StatKey::HopefulRetry),
            _ => None,
        };

        let Some(key) = retry_key else {
            return RetryOutcome::Settled(result);
        };

        stats.increment(key);

        if attempt >= config.max_attempts {
            return RetryOutcome::Settled(result);
        }

        let jitter_sample = rand::thread_rng().gen_range(-1.0..=1.0);
        let delay = Duration::from_millis(config.delay_ms(attempt - 1, jitter_sample));
        clock.sleep(delay, cancellation).await;

        if cancellation.is_cancelled() {
            return RetryOutcome::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ModelQuality;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyAdapter {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmAdapter for FlakyAdapter {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> LlmInvocationResult {
            let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
            if call_index < self.failures_before_success {
                LlmInvocationResult::overloaded("simulated overload")
            } else {
                LlmInvocationResult::completed("{}")
            }
        }

        async fn embed(&self, _text: &str) -> Option<Vec<f32>> {
            None
        }

        fn available_qualities(&self) -> HashSet<ModelQuality> {
            HashSet::from([ModelQuality::Primary])
        }
    }

    struct InstantClock;

    #[async_trait]
    impl sourcescribe_types::Clock for InstantClock {
        fn now(&self) -> chrono::DateTime<chrono::Utc> {
            chrono::Utc::now()
        }

        async fn sleep(&self, _duration: std::time::Duration, _cancellation: &CancellationToken) {}
    }

    #[tokio::test]
    async fn retries_until_success_within_max_attempts() {
        let adapter = FlakyAdapter { failures_before_success: 2, calls: AtomicU32::new(0) };
        let stats = StatsRecorder::default();
        let clock = InstantClock;
        let cancellation = CancellationToken::new();

        let outcome = retry_with_backoff(
            &adapter,
            "prompt",
            &CompletionOptions::default(),
            &RetryConfig::default(),
            &stats,
            &clock,
            &cancellation,
        )
        .await;

        match outcome {
            RetryOutcome::Settled(result) => assert_eq!(result.status, InvocationStatus::Completed),
            RetryOutcome::Cancelled => panic!("expected settlement"),
        }
        assert_eq!(stats.get(StatKey::OverloadRetry), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let adapter = FlakyAdapter { failures_before_success: 100, calls: AtomicU32::new(0) };
        let stats = StatsRecorder::default();
        let clock = InstantClock;
        let cancellation = CancellationToken::new();
        let config = RetryConfig { max_attempts: 5, ..RetryConfig::default() };

        let outcome = retry_with_backoff(
            &adapter,
            "prompt",
            &CompletionOptions::default(),
            &config,
            &stats,
            &clock,
            &cancellation,
        )
        .await;

        match outcome {
            RetryOutcome::Settled(result) => assert_eq!(result.status, InvocationStatus::Overloaded),
            RetryOutcome::Cancelled => panic!("expected settlement"),
        }
        assert_eq!(stats.get(StatKey::OverloadRetry), 5);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn cancellation_short_circuits_before_any_call() {
        let adapter = FlakyAdapter { failures_before_success: 0, calls: AtomicU32::new(0) };
        let stats = StatsRecorder::default();
        let clock = InstantClock;
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let outcome = retry_with_backoff(
            &adapter,
            "prompt",
            &CompletionOptions::default(),
            &RetryConfig::default(),
            &stats,
            &clock,
            &cancellation,
        )
        .await;

        matches!(outcome, RetryOutcome::Cancelled);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_calls_adapter_more_than_max_attempts(max_attempts in 1u32..10) {
                let adapter = FlakyAdapter { failures_before_success: u32::MAX, calls: AtomicU32::new(0) };
                let stats = StatsRecorder::default();
                let clock = InstantClock;
                let cancellation = CancellationToken::new();
                let config = RetryConfig { max_attempts, ..RetryConfig::default() };

                let outcome = tokio::runtime::Runtime::new().unwrap().block_on(retry_with_backoff(
                    &adapter,
                    "prompt",
                    &CompletionOptions::default(),
                    &config,
                    &stats,
                    &clock,
                    &cancellation,
                ));

                prop_assert!(matches!(outcome, RetryOutcome::Settled(_)));
                prop_assert_eq!(adapter.calls.load(Ordering::SeqCst), max_attempts);
                prop_assert_eq!(stats.get(StatKey::OverloadRetry), max_attempts as u64);
            }
        }
    }
}
