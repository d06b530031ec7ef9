use async_trait::async_trait;
use sourcescribe_types::{AppSummaryRecord, FileWalker, FingerprintKey, SourceRecord, Store};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// In-process reference `Store` implementation. Satisfies the
/// linearizable-per-key contract via a single mutex; adequate for local
/// runs and tests, not a substitute for a real document database. Does not
/// implement the secondary/vector indexes named in the persisted-state
/// layout — lookups by project+namespace or by vector similarity would
/// need a linear scan, which this reference store doesn't bother
/// exposing since no in-core caller needs it.
#[derive(Default)]
pub struct InMemoryStore {
    sources: Mutex<HashMap<FingerprintKey, SourceRecord>>,
    app_summaries: Mutex<HashMap<String, AppSummaryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_count(&self, project_name: &str) -> usize {
        self.sources
            .lock()
            .expect("sources mutex poisoned")
            .keys()
            .filter(|k| k.project_name == project_name)
            .count()
    }

    pub fn get(&self, key: &FingerprintKey) -> Option<SourceRecord> {
        self.sources.lock().expect("sources mutex poisoned").get(key).cloned()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_source(&self, record: SourceRecord) -> Result<(), String> {
        let key = record.fingerprint();
        self.sources.lock().expect("sources mutex poisoned").insert(key, record);
        Ok(())
    }

    async fn delete_sources_by_project(&self, project_name: &str) -> Result<(), String> {
        self.sources
            .lock()
            .expect("sources mutex poisoned")
            .retain(|key, _| key.project_name != project_name);
        Ok(())
    }

    async fn does_project_source_exist(&self, key: &FingerprintKey) -> Result<bool, String> {
        Ok(self.sources.lock().expect("sources mutex poisoned").contains_key(key))
    }

    async fn create_or_replace_app_summary(&self, record: AppSummaryRecord) -> Result<(), String> {
        self.app_summaries
            .lock()
            .expect("app summaries mutex poisoned")
            .insert(record.project_name.clone(), record);
        Ok(())
    }
}

/// Default directory names and filename prefixes excluded from a walk,
/// regardless of caller-supplied configuration.
pub fn default_excluded_dirs() -> Vec<String> {
    [
        ".git", "node_modules", "target", "dist", "build", ".venv", "venv", "__pycache__",
        ".pytest_cache", ".tox",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Walks a directory tree via `walkdir`, honoring an ignore set of
/// directory names and an ignore set of filename prefixes. The walk itself
/// runs on a blocking task and streams matching paths into an unbounded
/// channel as it finds them, so `walk` returns as soon as the task is
/// spawned rather than after the whole tree has been read.
pub struct WalkdirFileWalker {
    excluded_dirs: std::collections::HashSet<String>,
    excluded_filename_prefixes: Vec<String>,
}

impl WalkdirFileWalker {
    pub fn new(excluded_dirs: Vec<String>, excluded_filename_prefixes: Vec<String>) -> Self {
        Self {
            excluded_dirs: excluded_dirs.into_iter().collect(),
            excluded_filename_prefixes,
        }
    }
}

impl Default for WalkdirFileWalker {
    fn default() -> Self {
        Self::new(default_excluded_dirs(), vec![".".to_string()])
    }
}

#[async_trait]
impl FileWalker for WalkdirFileWalker {
    async fn walk(&self, root: &Path) -> Result<mpsc::Receiver<PathBuf>, String> {
        let (tx, rx) = mpsc::channel(256);
        let root = root.to_path_buf();
        let excluded_dirs = self.excluded_dirs.clone();
        let excluded_filename_prefixes = self.excluded_filename_prefixes.clone();

        tokio::task::spawn_blocking(move || {
            let walker = walkdir::WalkDir::new(&root).into_iter().filter_entry(|entry| {
                if entry.file_type().is_dir() {
                    let name = entry.file_name().to_string_lossy();
                    return !excluded_dirs.contains(name.as_ref());
                }
                true
            });

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(reason) => {
                        tracing::warn!(root = %root.display(), %reason, "aborting walk on unreadable entry");
                        break;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let filename = entry.file_name().to_string_lossy().into_owned();
                if excluded_filename_prefixes.iter().any(|prefix| filename.starts_with(prefix.as_str())) {
                    continue;
                }
                if tx.blocking_send(entry.into_path()).is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}
