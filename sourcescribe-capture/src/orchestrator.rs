use crate::embedding::EmbeddingPipeline;
use crate::summarizer::FileSummarizer;
use sourcescribe_llm::adapter::LlmAdapter;
use sourcescribe_types::{
    Clock, FileWalker, FingerprintKey, RetryConfig, SourceRecord, StatsRecorder, Store,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Extensions never summarized; their content isn't source text. Matched
/// case-insensitively against the path's extension, without the leading dot.
const BINARY_EXTENSIONS: &[&str] = &[
    "class", "jar", "war", "ear", "so", "dll", "dylib", "exe", "bin", "png", "jpg", "jpeg", "gif",
    "bmp", "ico", "pdf", "zip", "gz", "tar", "7z", "woff", "woff2", "ttf", "eot",
];

fn is_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BINARY_EXTENSIONS.iter().any(|bin| bin.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// How many files of each disposition a `capture` run produced. Returned to
/// the caller for a run-end stats line; the store itself is the source of
/// truth for which records actually exist.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaptureOutcome {
    pub processed: u64,
    pub skipped_binary: u64,
    pub skipped_idempotent: u64,
    pub skipped_empty: u64,
    pub insert_failures: u64,
}

pub struct CaptureConfig {
    pub project_name: String,
    pub root: PathBuf,
    pub idempotent: bool,
    pub max_concurrency: usize,
    /// Adapters tried in order by the summarizer's execution pipeline.
    pub adapters: Vec<Arc<dyn LlmAdapter>>,
    /// Adapter used for embedding calls. Chosen once at composition-root
    /// wire-up rather than re-selected per file, since embeddings from
    /// different models aren't comparable.
    pub embedding_adapter: Arc<dyn LlmAdapter>,
    pub retry_config: RetryConfig,
}

impl CaptureConfig {
    pub fn default_concurrency() -> usize {
        std::cmp::min(8, num_cpus::get() * 2)
    }
}

/// Walks a project's source tree and populates the store with one
/// `SourceRecord` per qualifying file, per the five-step algorithm: walk,
/// optionally clear prior records, dispatch a bounded worker pool, run each
/// file through the summarizer and embedding sub-pipeline, insert. Paths
/// are dispatched to the pool as they arrive from the walker rather than
/// collected up front, so the semaphore stays the only thing bounding how
/// much work is in flight. Partial per-file failures never stop the pool —
/// the orchestrator only returns an error for conditions that prevent it
/// from starting at all (the walk itself failing to start, or clearing
/// prior records failing).
pub struct CaptureOrchestrator {
    summarizer: Arc<FileSummarizer>,
    embedding: Arc<EmbeddingPipeline>,
}

impl CaptureOrchestrator {
    pub fn new(embedding_dimension: usize, embedding_context_limit: u64) -> Self {
        Self {
            summarizer: Arc::new(FileSummarizer::new()),
            embedding: Arc::new(EmbeddingPipeline::new(embedding_dimension, embedding_context_limit)),
        }
    }

    pub async fn capture(
        &self,
        config: CaptureConfig,
        walker: Arc<dyn FileWalker>,
        store: Arc<dyn Store>,
        stats: Arc<StatsRecorder>,
        clock: Arc<dyn Clock>,
        cancellation: CancellationToken,
    ) -> Result<CaptureOutcome, String> {
        let mut paths = walker.walk(&config.root).await.map_err(|e| format!("walk failed: {e}"))?;

        if !config.idempotent {
            store
                .delete_sources_by_project(&config.project_name)
                .await
                .map_err(|e| format!("could not clear prior records: {e}"))?;
        }

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        let idempotent_skip_logged = Arc::new(AtomicBool::new(false));
        let adapters = Arc::new(config.adapters);
        let embedding_adapter = config.embedding_adapter;
        let retry_config = config.retry_config;
        let idempotent = config.idempotent;
        let project_name = Arc::new(config.project_name);

        let mut handles = Vec::new();

        while let Some(path) = paths.recv().await {
            if cancellation.is_cancelled() {
                break;
            }

            let semaphore = Arc::clone(&semaphore);
            let summarizer = Arc::clone(&self.summarizer);
            let embedding = Arc::clone(&self.embedding);
            let embedding_adapter = Arc::clone(&embedding_adapter);
            let store = Arc::clone(&store);
            let stats = Arc::clone(&stats);
            let clock = Arc::clone(&clock);
            let cancellation = cancellation.clone();
            let adapters = (*adapters).clone();
            let project_name = Arc::clone(&project_name);
            let idempotent_skip_logged = Arc::clone(&idempotent_skip_logged);
            let retry_config = retry_config.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return FileOutcome::Cancelled,
                };

                if cancellation.is_cancelled() {
                    return FileOutcome::Cancelled;
                }

                process_one_file(ProcessFileArgs {
                    path: &path,
                    project_name: &project_name,
                    idempotent,
                    summarizer: &summarizer,
                    embedding: &embedding,
                    embedding_adapter: embedding_adapter.as_ref(),
                    adapters,
                    retry_config,
                    store: store.as_ref(),
                    stats: stats.as_ref(),
                    clock: clock.as_ref(),
                    cancellation: &cancellation,
                    idempotent_skip_logged: &idempotent_skip_logged,
                })
                .await
            });

            handles.push(handle);
        }

        let mut outcome = CaptureOutcome::default();
        for handle in handles {
            match handle.await {
                Ok(FileOutcome::Processed) => outcome.processed += 1,
                Ok(FileOutcome::SkippedBinary) => outcome.skipped_binary += 1,
                Ok(FileOutcome::SkippedIdempotent) => outcome.skipped_idempotent += 1,
                Ok(FileOutcome::SkippedEmpty) => outcome.skipped_empty += 1,
                Ok(FileOutcome::InsertFailed) => outcome.insert_failures += 1,
                Ok(FileOutcome::Cancelled) => {}
                Err(join_error) => {
                    tracing::error!(error = %join_error, "capture task panicked");
                }
            }
        }

        Ok(outcome)
    }
}

enum FileOutcome {
    Processed,
    SkippedBinary,
    SkippedIdempotent,
    SkippedEmpty,
    InsertFailed,
    Cancelled,
}

struct ProcessFileArgs<'a> {
    path: &'a Path,
    project_name: &'a str,
    idempotent: bool,
    summarizer: &'a FileSummarizer,
    embedding: &'a EmbeddingPipeline,
    embedding_adapter: &'a dyn LlmAdapter,
    adapters: Vec<Arc<dyn LlmAdapter>>,
    retry_config: RetryConfig,
    store: &'a dyn Store,
    stats: &'a StatsRecorder,
    clock: &'a dyn Clock,
    cancellation: &'a CancellationToken,
    idempotent_skip_logged: &'a AtomicBool,
}

async fn process_one_file(args: ProcessFileArgs<'_>) -> FileOutcome {
    let ProcessFileArgs {
        path,
        project_name,
        idempotent,
        summarizer,
        embedding,
        embedding_adapter,
        adapters,
        retry_config,
        store,
        stats,
        clock,
        cancellation,
        idempotent_skip_logged,
    } = args;

    if is_binary_extension(path) {
        return FileOutcome::SkippedBinary;
    }

    let filepath = path.to_string_lossy().to_string();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| filepath.clone());
    let extension = path.extension().and_then(|ext| ext.to_str());

    if idempotent {
        let key = FingerprintKey::new(project_name, filepath.clone());
        match store.does_project_source_exist(&key).await {
            Ok(true) => {
                if !idempotent_skip_logged.swap(true, Ordering::Relaxed) {
                    tracing::info!(project = project_name, "skipping files already captured in a prior run");
                }
                return FileOutcome::SkippedIdempotent;
            }
            Ok(false) => {}
            Err(reason) => {
                tracing::warn!(resource = %filepath, %reason, "could not check idempotence, processing anyway");
            }
        }
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(reason) => {
            tracing::warn!(resource = %filepath, %reason, "could not read file, skipping");
            return FileOutcome::SkippedEmpty;
        }
    };

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return FileOutcome::SkippedEmpty;
    }

    let lines_count = content.lines().count() as u64;
    let canonical_type = sourcescribe_types::CanonicalFileType::resolve(&filename, extension);

    let summary_result = summarizer
        .summarize(
            &filepath,
            &filename,
            extension,
            trimmed,
            adapters,
            retry_config,
            stats,
            clock,
            cancellation,
        )
        .await;

    let serialized_summary = summary_result.as_ref().ok().and_then(|s| serde_json::to_string(s).ok());

    let content_embed = embedding.embed(embedding_adapter, trimmed, &filepath);
    let summary_embed = async {
        match &serialized_summary {
            Some(serialized) => embedding.embed(embedding_adapter, serialized, &filepath).await,
            None => None,
        }
    };
    let (content_vector, summary_vector) = tokio::join!(content_embed, summary_embed);

    let record = match summary_result {
        Ok(summary) => SourceRecord::with_summary(
            project_name,
            &filepath,
            &filename,
            format!("{canonical_type:?}"),
            lines_count,
            trimmed,
            summary,
        ),
        Err(reason) => SourceRecord::with_error(
            project_name,
            &filepath,
            &filename,
            format!("{canonical_type:?}"),
            lines_count,
            trimmed,
            reason,
        ),
    };

    let record = record.with_vectors(content_vector, summary_vector);

    match store.insert_source(record).await {
        Ok(()) => FileOutcome::Processed,
        Err(reason) => {
            tracing::warn!(resource = %filepath, %reason, "failed to insert record, continuing");
            FileOutcome::InsertFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{InMemoryStore, WalkdirFileWalker};
    use sourcescribe_llm::adapter::ModelQuality;
    use sourcescribe_llm::adapters::scripted::ScriptedAdapter;
    use sourcescribe_types::{LlmInvocationResult, SystemClock};
    use std::collections::HashSet;

    fn scripted(name: &str, responses: Vec<LlmInvocationResult>) -> Arc<dyn LlmAdapter> {
        Arc::new(ScriptedAdapter::new(name, HashSet::from([ModelQuality::Primary]), responses))
    }

    #[tokio::test]
    async fn captures_every_non_empty_non_binary_file() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("Main.java"), "class Main {}").unwrap();
        std::fs::write(temp.path().join("empty.java"), "   \n  ").unwrap();
        std::fs::write(temp.path().join("logo.png"), [0u8, 1, 2]).unwrap();

        let adapter = scripted(
            "primary",
            vec![LlmInvocationResult::completed(r#"{"purpose": "p", "implementation": "i"}"#)],
        );
        let embedding_adapter = scripted("primary", vec![LlmInvocationResult::completed("unused")]);

        let orchestrator = CaptureOrchestrator::new(3, 10_000);
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let walker: Arc<dyn FileWalker> = Arc::new(WalkdirFileWalker::default());
        let stats = Arc::new(StatsRecorder::default());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let outcome = orchestrator
            .capture(
                CaptureConfig {
                    project_name: "demo".to_string(),
                    root: temp.path().to_path_buf(),
                    idempotent: false,
                    max_concurrency: 4,
                    adapters: vec![adapter],
                    embedding_adapter,
                    retry_config: RetryConfig::default(),
                },
                walker,
                store,
                stats,
                clock,
                CancellationToken::new(),
            )
            .await
            .expect("capture should complete");

        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.skipped_empty, 1);
        assert_eq!(outcome.skipped_binary, 1);
    }

    #[tokio::test]
    async fn idempotent_mode_skips_already_captured_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("Main.java"), "class Main {}").unwrap();

        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let walker: Arc<dyn FileWalker> = Arc::new(WalkdirFileWalker::default());
        let stats = Arc::new(StatsRecorder::default());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let orchestrator = CaptureOrchestrator::new(3, 10_000);

        let make_adapter = || scripted("primary", vec![LlmInvocationResult::completed(r#"{"purpose": "p", "implementation": "i"}"#)]);

        orchestrator
            .capture(
                CaptureConfig {
                    project_name: "demo".to_string(),
                    root: temp.path().to_path_buf(),
                    idempotent: false,
                    max_concurrency: 4,
                    adapters: vec![make_adapter()],
                    embedding_adapter: make_adapter(),
                    retry_config: RetryConfig::default(),
                },
                Arc::clone(&walker),
                Arc::clone(&store),
                Arc::clone(&stats),
                Arc::clone(&clock),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let outcome = orchestrator
            .capture(
                CaptureConfig {
                    project_name: "demo".to_string(),
                    root: temp.path().to_path_buf(),
                    idempotent: true,
                    max_concurrency: 4,
                    adapters: vec![make_adapter()],
                    embedding_adapter: make_adapter(),
                    retry_config: RetryConfig::default(),
                },
                walker,
                store,
                stats,
                clock,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.skipped_idempotent, 1);
        assert_eq!(outcome.processed, 0);
    }
}
