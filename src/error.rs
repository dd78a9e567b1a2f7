use std::path::PathBuf;

use thiserror::Error;

use crate::crypto::files::MAX_FILE_SIZE;
use crate::dom::NodeId;

/// Errors raised by the page helpers.
#[derive(Debug, Error)]
pub enum UiError {
    /// A notification kind name outside `success`, `error`, `warning`, `info`.
    #[error("unknown notification kind: {0:?}")]
    UnknownKind(String),

    /// The node was never created or has already been released.
    #[error("no such node: {0}")]
    NoSuchNode(NodeId),

    /// An append that would put a node inside itself.
    #[error("cannot insert {child} under {parent}")]
    Hierarchy { parent: NodeId, child: NodeId },

    #[error("clipboard ({backend}) failed: {reason}")]
    Clipboard { backend: String, reason: String },

    #[error("Password is required")]
    MissingPassword,

    #[error("Only PDF files are allowed")]
    NotPdfFile,

    #[error("Only .enc files are allowed for decryption")]
    NotEncryptedFile,

    #[error("File too large. Maximum size is {}MB.", MAX_FILE_SIZE / (1024 * 1024))]
    TooLarge { size: u64 },

    /// The bytes do not start with `%PDF`.
    #[error("Invalid PDF file format")]
    InvalidPdf,

    /// The header did not survive decryption.
    #[error("Invalid password or corrupted file")]
    WrongPassword,

    #[error("Invalid password - decrypted data is not a valid PDF")]
    DecryptedNotPdf,

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = UiError> = std::result::Result<T, E>;
