use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The two overlapping "procedures and triggers" shapes a run may produce.
/// Both are kept as valid until the downstream report contract settles on
/// one (see design notes on the open question this resolves).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProceduresAndTriggers {
    /// One list of procedures/triggers per category name.
    ByCategory(HashMap<String, Vec<String>>),
    /// A single combined bucket.
    Bucketed { procedures: Vec<String>, triggers: Vec<String> },
}

/// Aggregated, per-project insights. Created or replaced atomically by
/// downstream insight synthesis (out of scope for this crate family; the
/// shape is specified here so the Store contract has a concrete type to
/// persist).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSummaryRecord {
    pub project_name: String,
    pub business_processes: Vec<String>,
    pub bounded_contexts: Vec<String>,
    pub potential_microservices: Vec<String>,
    pub inferred_architecture: Option<String>,
    pub technologies: Vec<String>,
    pub app_description: String,
    pub llm_provider: String,
    pub llm_models: Vec<String>,
    pub procedures_and_triggers: Option<ProceduresAndTriggers>,
}
