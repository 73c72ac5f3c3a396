pub mod conversation;
pub mod upload;

pub use conversation::{AskOutcome, Conversation, PendingQuestion, ANSWER_FALLBACK};
pub use upload::{UploadFlow, UploadedPaper};

use thiserror::Error;

use crate::client::{models::FileReference, TransportError};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type: {0} is not a PDF")]
    InvalidFileType(String),
    #[error("Another upload is still in progress")]
    AlreadyUploading,
    #[error("Upload failed: {0}")]
    UploadFailed(#[source] TransportError),
    #[error("Analysis failed for {file_reference}: {source}")]
    AnalysisFailed {
        file_reference: FileReference,
        #[source]
        source: TransportError,
    },
}

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("Answer failed: {0}")]
    AnswerFailed(#[from] TransportError),
}
