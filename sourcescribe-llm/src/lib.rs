//! The LLM execution pipeline: retry + fallback + prompt-adaptation state
//! machine that invokes one or more candidate model adapters under failure,
//! overload, oversize, and schema-invalidity conditions, and guarantees that
//! a successful call returns schema-validated structured content.

pub mod adapter;
pub mod fallback;
pub mod pipeline;
pub mod prompt_registry;
pub mod retry;
pub mod token_budget;
pub mod validator;

pub mod adapters {
    pub mod ollama;
    pub mod scripted;
}

pub use adapter::{LlmAdapter, ModelQuality};
pub use fallback::{decide_next_action, FallbackAction};
pub use pipeline::{run_pipeline, PipelineInput};
pub use prompt_registry::{PromptTemplate, PromptTemplateRegistry};
pub use retry::{retry_with_backoff, RetryOutcome};
pub use token_budget::TokenBudgetEstimator;
pub use validator::{validate_response, ResponseValidator, ValidationOutcome};

/// Result type for every fallible operation in this crate.
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Errors this crate produces. Adapter-level transient/fatal failures never
/// surface as `LlmError` to the orchestrator — they are mapped to
/// `InvocationStatus` inside the adapter and handled structurally by the
/// retry/fallback strategies (see §4.4/§4.5 of the component design). This
/// enum covers the failures that genuinely cannot be expressed as a status:
/// malformed templates, schema compile failures, and the adapter's own
/// infrastructure setup.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("schema for template '{template}' does not compile: {reason}")]
    InvalidSchema { template: String, reason: String },

    #[error("http client could not be constructed: {0}")]
    ClientConstruction(String),

    #[error("no adapters configured")]
    NoAdaptersConfigured,
}
