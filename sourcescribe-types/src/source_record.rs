use crate::summary::Summary;
use serde::{Deserialize, Serialize};

/// Primary key for idempotence checks and for the `sources` collection:
/// `(projectName, filepath)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerprintKey {
    pub project_name: String,
    pub filepath: String,
}

impl FingerprintKey {
    pub fn new(project_name: impl Into<String>, filepath: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            filepath: filepath.into(),
        }
    }
}

/// Either a validated `Summary` or the classification string the pipeline
/// returned when it gave up, never both. Private so the only way to build
/// one is through `Outcome::summary`/`Outcome::error`, which is how
/// `SourceRecord`'s "exactly one of summary/summaryError" invariant is
/// enforced at the type level rather than by convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Outcome {
    Summary(Summary),
    Error(String),
}

impl Outcome {
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Outcome::Summary(s) => Some(s),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Summary(_) => None,
            Outcome::Error(e) => Some(e.as_str()),
        }
    }
}

/// One captured file. Created by the Capture Orchestrator on first
/// successful processing; never updated in place by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub project_name: String,
    pub filepath: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub lines_count: u64,
    pub content: String,
    pub outcome: Outcome,
    pub summary_vector: Option<Vec<f32>>,
    pub content_vector: Option<Vec<f32>>,
}

impl SourceRecord {
    /// Build a record whose pipeline invocation succeeded.
    pub fn with_summary(
        project_name: impl Into<String>,
        filepath: impl Into<String>,
        filename: impl Into<String>,
        file_type: impl Into<String>,
        lines_count: u64,
        content: impl Into<String>,
        summary: Summary,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            filepath: filepath.into(),
            filename: filename.into(),
            file_type: file_type.into(),
            lines_count,
            content: content.into(),
            outcome: Outcome::Summary(summary),
            summary_vector: None,
            content_vector: None,
        }
    }

    /// Build a record whose pipeline invocation was exhausted without a
    /// validated summary.
    pub fn with_error(
        project_name: impl Into<String>,
        filepath: impl Into<String>,
        filename: impl Into<String>,
        file_type: impl Into<String>,
        lines_count: u64,
        content: impl Into<String>,
        summary_error: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            filepath: filepath.into(),
            filename: filename.into(),
            file_type: file_type.into(),
            lines_count,
            content: content.into(),
            outcome: Outcome::Error(summary_error.into()),
            summary_vector: None,
            content_vector: None,
        }
    }

    pub fn fingerprint(&self) -> FingerprintKey {
        FingerprintKey::new(self.project_name.clone(), self.filepath.clone())
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.outcome.summary()
    }

    pub fn summary_error(&self) -> Option<&str> {
        self.outcome.error()
    }

    pub fn with_vectors(
        mut self,
        content_vector: Option<Vec<f32>>,
        summary_vector: Option<Vec<f32>>,
    ) -> Self {
        self.content_vector = content_vector;
        self.summary_vector = summary_vector;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_record_has_summary_not_error() {
        let record = SourceRecord::with_summary(
            "proj",
            "src/a.java",
            "a.java",
            "java",
            10,
            "class A {}",
            Summary::default(),
        );
        assert!(record.summary().is_some());
        assert!(record.summary_error().is_none());
    }

    #[test]
    fn failure_record_has_error_not_summary() {
        let record = SourceRecord::with_error(
            "proj",
            "src/a.java",
            "a.java",
            "java",
            10,
            "class A {}",
            "ERRORED: timeout",
        );
        assert!(record.summary().is_none());
        assert_eq!(record.summary_error(), Some("ERRORED: timeout"));
    }
}
