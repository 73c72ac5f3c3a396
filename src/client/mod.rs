pub mod http;
pub mod models;

pub use http::HttpBackend;

use async_trait::async_trait;
use thiserror::Error;

use models::{AnalysisResult, FileReference, PaperFile};

/// Any failure talking to the paper backend. Callers treat every variant the same
/// way; the split only exists for logs.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Backend Error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid Response: {0}")]
    InvalidResponse(String),
}

/// The three backend operations the flows depend on.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn submit_file(&self, file: &PaperFile) -> Result<FileReference, TransportError>;

    async fn request_analysis(
        &self,
        file_reference: &FileReference,
    ) -> Result<AnalysisResult, TransportError>;

    async fn ask_question(
        &self,
        file_reference: &FileReference,
        question: &str,
    ) -> Result<String, TransportError>;
}
