//! Error types for the CSV sinks.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Creating, writing or flushing a log file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Joint torques do not match the arm's joint count.
    #[error("Joint count mismatch: expected {expected}, got {got}")]
    JointCount { expected: usize, got: usize },
}
