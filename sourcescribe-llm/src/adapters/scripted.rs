use crate::adapter::{CompletionOptions, LlmAdapter, ModelQuality};
use async_trait::async_trait;
use sourcescribe_types::LlmInvocationResult;
use std::collections::HashSet;
use std::sync::Mutex;

/// Deterministic in-memory adapter driven by a fixed script of responses,
/// consumed in order. Used by the capture orchestrator's scenario tests
/// (S1-S6) and as a stand-in for a real provider in local runs without
/// network access. The last response in the script repeats once exhausted,
/// so a test doesn't need to over-provision entries for retries it isn't
/// asserting on.
pub struct ScriptedAdapter {
    name: String,
    qualities: HashSet<ModelQuality>,
    script: Mutex<Vec<LlmInvocationResult>>,
    cursor: Mutex<usize>,
    embedding: Option<Vec<f32>>,
}

impl ScriptedAdapter {
    pub fn new(name: impl Into<String>, qualities: HashSet<ModelQuality>, script: Vec<LlmInvocationResult>) -> Self {
        Self {
            name: name.into(),
            qualities,
            script: Mutex::new(script),
            cursor: Mutex::new(0),
            embedding: Some(vec![0.1, 0.2, 0.3]),
        }
    }

    pub fn with_embedding(mut self, embedding: Option<Vec<f32>>) -> Self {
        self.embedding = embedding;
        self
    }
}

#[async_trait]
impl LlmAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> LlmInvocationResult {
        let script = self.script.lock().expect("scripted adapter mutex poisoned");
        let mut cursor = self.cursor.lock().expect("scripted adapter mutex poisoned");
        let index = (*cursor).min(script.len().saturating_sub(1));
        *cursor += 1;
        script
            .get(index)
            .cloned()
            .unwrap_or_else(|| LlmInvocationResult::errored("scripted adapter has no responses configured"))
    }

    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        if text.trim().is_empty() {
            return None;
        }
        self.embedding.clone()
    }

    fn available_qualities(&self) -> HashSet<ModelQuality> {
        self.qualities.clone()
    }
}
