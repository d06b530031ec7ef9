mod embedding;
mod error;
mod orchestrator;
mod reference;
mod summarizer;

pub use embedding::EmbeddingPipeline;
pub use error::CaptureError;
pub use orchestrator::{CaptureConfig, CaptureOrchestrator, CaptureOutcome};
pub use reference::{default_excluded_dirs, InMemoryStore, WalkdirFileWalker};
pub use summarizer::FileSummarizer;
