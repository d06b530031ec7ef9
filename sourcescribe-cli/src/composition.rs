use sourcescribe_capture::{CaptureConfig, CaptureOrchestrator, InMemoryStore, WalkdirFileWalker};
use sourcescribe_llm::adapter::{LlmAdapter, ModelQuality};
use sourcescribe_llm::adapters::ollama::OllamaAdapter;
use sourcescribe_types::{Clock, ConfigError, FileWalker, RetryConfig, StatsRecorder, Store, SystemClock};
use sourcescribe_utils::EnvConfigLoader;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything `capture` needs to run, assembled in one place per the
/// explicit-composition-root strategy: every component below depends only
/// on the collaborator interfaces in `sourcescribe_types`, never on a
/// concrete peer, and nothing here is a singleton — all of it is
/// constructed fresh per invocation and passed down by parameter.
pub struct CaptureStack {
    pub orchestrator: CaptureOrchestrator,
    pub config: CaptureConfig,
    pub walker: Arc<dyn FileWalker>,
    pub store: Arc<dyn Store>,
    pub stats: Arc<StatsRecorder>,
    pub clock: Arc<dyn Clock>,
}

/// Required env vars for the `ollama` provider family manifest.
const OLLAMA_REQUIRED: &[&str] = &["OLLAMA_BASE_URL", "OLLAMA_MODEL", "OLLAMA_EMBEDDING_MODEL"];

fn build_ollama_adapter(loader: &EnvConfigLoader) -> Result<Arc<dyn LlmAdapter>, ConfigError> {
    loader.require_all(OLLAMA_REQUIRED)?;
    let base_url = loader.get("OLLAMA_BASE_URL").expect("validated by require_all");
    let model = loader.get("OLLAMA_MODEL").expect("validated by require_all");
    let embedding_model = loader.get("OLLAMA_EMBEDDING_MODEL").expect("validated by require_all");
    let context_limit = loader.get_u32("OLLAMA_CONTEXT_LIMIT").unwrap_or(8192) as u64;

    let adapter = OllamaAdapter::new(
        base_url,
        model,
        embedding_model,
        HashSet::from([ModelQuality::Primary, ModelQuality::Secondary]),
        context_limit,
    )
    .map_err(|e| ConfigError::InvalidValue { name: "OLLAMA_*".to_string(), reason: e.to_string() })?;

    Ok(Arc::new(adapter))
}

/// Selects and constructs the adapter family named by `LLM`. Only `ollama`
/// is implemented; any other value is a configuration error naming the
/// recognized families, per the "missing/invalid manifest" error kind.
fn build_adapter(loader: &EnvConfigLoader) -> Result<Arc<dyn LlmAdapter>, ConfigError> {
    match loader.get("LLM").as_deref() {
        Some("ollama") | None => build_ollama_adapter(loader),
        Some(other) => Err(ConfigError::InvalidValue {
            name: "LLM".to_string(),
            reason: format!("unrecognized adapter family '{other}', expected one of: ollama"),
        }),
    }
}

pub fn build_capture_stack(
    loader: &EnvConfigLoader,
    project_name: String,
    embedding_dimension: usize,
) -> Result<CaptureStack, ConfigError> {
    loader.require_all(&["CODEBASE_DIR_PATH"])?;
    let root = PathBuf::from(loader.get("CODEBASE_DIR_PATH").expect("validated by require_all"));

    let idempotent = loader.get_bool("SKIP_ALREADY_PROCESSED_FILES", false);
    let max_concurrency = loader
        .get_u32("MAX_CONCURRENCY")
        .map(|n| n as usize)
        .unwrap_or_else(CaptureConfig::default_concurrency);

    let adapter = build_adapter(loader)?;
    let embedding_context_limit = loader.get_u32("OLLAMA_CONTEXT_LIMIT").unwrap_or(8192) as u64;

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let walker: Arc<dyn FileWalker> = Arc::new(WalkdirFileWalker::default());
    let stats = Arc::new(StatsRecorder::new(true));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let config = CaptureConfig {
        project_name,
        root,
        idempotent,
        max_concurrency,
        adapters: vec![Arc::clone(&adapter)],
        embedding_adapter: adapter,
        retry_config: RetryConfig::default(),
    };

    let orchestrator = CaptureOrchestrator::new(embedding_dimension, embedding_context_limit);

    Ok(CaptureStack { orchestrator, config, walker, store, stats, clock })
}
