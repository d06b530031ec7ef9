use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Closed set of counters the pipeline and orchestrator increment. Every
/// counter is incremented by exactly one component at a defined point (the
/// Retry Strategy for `OverloadRetry`/`HopefulRetry`, the Execution
/// Pipeline for the rest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    Success,
    Failure,
    Switch,
    OverloadRetry,
    HopefulRetry,
    Crop,
}

impl StatKey {
    pub const ALL: [StatKey; 6] = [
        StatKey::Success,
        StatKey::Failure,
        StatKey::Switch,
        StatKey::OverloadRetry,
        StatKey::HopefulRetry,
        StatKey::Crop,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            StatKey::Success => "files summarized successfully",
            StatKey::Failure => "files that exhausted every adapter without a validated summary",
            StatKey::Switch => "adapter switches after exhausted retries",
            StatKey::OverloadRetry => "retries issued after an OVERLOADED response",
            StatKey::HopefulRetry => "retries issued after an INVALID response",
            StatKey::Crop => "prompt crops issued after an EXCEEDED response",
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            StatKey::Success => '.',
            StatKey::Failure => 'x',
            StatKey::Switch => '>',
            StatKey::OverloadRetry => 'o',
            StatKey::HopefulRetry => 'i',
            StatKey::Crop => 'c',
        }
    }
}

/// One entry in a stats snapshot.
#[derive(Debug, Clone)]
pub struct StatEntry {
    pub description: &'static str,
    pub symbol: char,
    pub count: u64,
}

/// Process-wide, lock-free counter bag. Passed explicitly from the
/// composition root to every component that increments a counter — never a
/// singleton. Every counter only ever increases within a single run.
pub struct StatsRecorder {
    success: AtomicU64,
    failure: AtomicU64,
    switch: AtomicU64,
    overload_retry: AtomicU64,
    hopeful_retry: AtomicU64,
    crop: AtomicU64,
    echo_symbols: bool,
}

impl StatsRecorder {
    pub fn new(echo_symbols: bool) -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            switch: AtomicU64::new(0),
            overload_retry: AtomicU64::new(0),
            hopeful_retry: AtomicU64::new(0),
            crop: AtomicU64::new(0),
            echo_symbols,
        }
    }

    fn counter(&self, key: StatKey) -> &AtomicU64 {
        match key {
            StatKey::Success => &self.success,
            StatKey::Failure => &self.failure,
            StatKey::Switch => &self.switch,
            StatKey::OverloadRetry => &self.overload_retry,
            StatKey::HopefulRetry => &self.hopeful_retry,
            StatKey::Crop => &self.crop,
        }
    }

    pub fn increment(&self, key: StatKey) {
        self.counter(key).fetch_add(1, Ordering::Relaxed);
        if self.echo_symbols {
            eprint!("{}", key.symbol());
        }
    }

    pub fn get(&self, key: StatKey) -> u64 {
        self.counter(key).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> HashMap<&'static str, StatEntry> {
        StatKey::ALL
            .iter()
            .map(|key| {
                (
                    match key {
                        StatKey::Success => "SUCCESS",
                        StatKey::Failure => "FAILURE",
                        StatKey::Switch => "SWITCH",
                        StatKey::OverloadRetry => "OVERLOAD_RETRY",
                        StatKey::HopefulRetry => "HOPEFUL_RETRY",
                        StatKey::Crop => "CROP",
                    },
                    StatEntry {
                        description: key.description(),
                        symbol: key.symbol(),
                        count: self.get(*key),
                    },
                )
            })
            .collect()
    }
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_only_increase() {
        let stats = StatsRecorder::default();
        assert_eq!(stats.get(StatKey::Success), 0);
        stats.increment(StatKey::Success);
        stats.increment(StatKey::Success);
        assert_eq!(stats.get(StatKey::Success), 2);
    }

    #[test]
    fn snapshot_covers_every_key() {
        let stats = StatsRecorder::default();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.len(), 6);
        assert!(snapshot.contains_key("SUCCESS"));
        assert!(snapshot.contains_key("CROP"));
    }
}
