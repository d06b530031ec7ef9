//! Shared data model for the capture pipeline: source records, summaries,
//! canonical file types, and the small transient types the LLM execution
//! pipeline passes between its stages.

pub mod app_summary;
pub mod collaborators;
pub mod error;
pub mod file_type;
pub mod invocation;
pub mod retry;
pub mod source_record;
pub mod stats;
pub mod summary;

pub use app_summary::{AppSummaryRecord, ProceduresAndTriggers};
pub use collaborators::{Clock, FileWalker, Store, SystemClock};
pub use error::ConfigError;
pub use file_type::CanonicalFileType;
pub use invocation::{InvocationStatus, LlmInvocationResult, TokenCounts};
pub use retry::RetryConfig;
pub use source_record::{FingerprintKey, SourceRecord};
pub use stats::{StatEntry, StatKey, StatsRecorder};
pub use summary::{CodeSmell, Complexity, Direction, Mechanism, OperationType, Summary};

/// Sentinel every closed controlled-vocabulary enum normalizes to when the
/// incoming string is unrecognized.
pub const INVALID: &str = "INVALID";
