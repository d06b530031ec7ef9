/// Errors the capture orchestrator can encounter for a single resource.
/// Neither variant aborts the orchestrator as a whole — both are logged
/// and the run continues with the next file.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Store unreachable, file system unreadable. Logged per task; the
    /// orchestrator itself only surfaces this as fatal if it occurs before
    /// any work could start (e.g. the root path doesn't exist).
    #[error("infrastructure error for '{resource}': {reason}")]
    Infrastructure { resource: String, reason: String },

    /// Empty file, binary file. Silently skipped — not logged as a
    /// failure, just excluded from the run.
    #[error("content error for '{resource}': {reason}")]
    Content { resource: String, reason: String },
}
