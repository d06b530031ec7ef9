use serde::{Deserialize, Serialize};

/// Backoff configuration for the Retry Strategy. Per-provider override,
/// else `RetryConfig::default()`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_retry_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_retry_delay_ms: 250,
            backoff_multiplier: 2.0,
            jitter_fraction: 0.2,
        }
    }
}

impl RetryConfig {
    /// `delay_n = minRetryDelayMs * backoffMultiplier^n * (1 + U[-jitter, +jitter])`
    pub fn delay_ms(&self, attempt: u32, jitter_sample: f64) -> u64 {
        debug_assert!((-1.0..=1.0).contains(&jitter_sample));
        let base = self.min_retry_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let jittered = base * (1.0 + jitter_sample * self.jitter_fraction);
        jittered.max(0.0).round() as u64
    }
}
