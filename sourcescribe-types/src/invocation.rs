use serde::{Deserialize, Serialize};

/// Outcome classification returned by an LLM Provider Adapter call. Never
/// an exception: every expected failure mode of a remote call is mapped to
/// one of these variants so the retry/fallback strategies can decide from
/// structured data alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationStatus {
    Completed,
    Overloaded,
    Exceeded,
    Invalid,
    Errored,
}

/// Prompt/completion/limit token counts, used by the cropping heuristic.
/// Required whenever `status == Exceeded`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenCounts {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub model_limit: u64,
}

/// Transient result of one adapter call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmInvocationResult {
    pub status: InvocationStatus,
    pub generated: Option<String>,
    pub error: Option<String>,
    pub token_counts: Option<TokenCounts>,
}

impl LlmInvocationResult {
    pub fn completed(generated: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Completed,
            generated: Some(generated.into()),
            error: None,
            token_counts: None,
        }
    }

    pub fn overloaded(error: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Overloaded,
            generated: None,
            error: Some(error.into()),
            token_counts: None,
        }
    }

    pub fn exceeded(error: impl Into<String>, token_counts: TokenCounts) -> Self {
        Self {
            status: InvocationStatus::Exceeded,
            generated: None,
            error: Some(error.into()),
            token_counts: Some(token_counts),
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Invalid,
            generated: None,
            error: Some(error.into()),
            token_counts: None,
        }
    }

    pub fn errored(error: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Errored,
            generated: None,
            error: Some(error.into()),
            token_counts: None,
        }
    }
}
