use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use tracing::{debug, info};

use crate::client::{
    models::{extract_answer, AnalysisResult, ChatRequest, FileReference, PaperFile, UploadResponse},
    RemoteService, TransportError,
};

/// reqwest-backed client for the paper backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /`, which answers with a short welcome string.
    pub async fn health(&self) -> Result<String, TransportError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let text = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        // FastAPI-style backends JSON-encode plain strings.
        Ok(serde_json::from_str::<String>(&text).unwrap_or(text))
    }
}

async fn check_status(response: Response) -> Result<Response, TransportError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status { status, body })
}

#[async_trait]
impl RemoteService for HttpBackend {
    async fn submit_file(&self, file: &PaperFile) -> Result<FileReference, TransportError> {
        info!("Uploading {} ({} bytes)", file.name, file.bytes.len());

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/upload_pdf", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let upload: UploadResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        debug!("Backend assigned pdf_id {}", upload.pdf_id);
        Ok(FileReference::new(upload.pdf_id))
    }

    async fn request_analysis(
        &self,
        file_reference: &FileReference,
    ) -> Result<AnalysisResult, TransportError> {
        info!("Requesting section analysis for {}", file_reference);

        let response = self
            .client
            .post(format!("{}/analyze_sections", self.base_url))
            .query(&[("pdf_id", file_reference.as_str())])
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let json: serde_json::Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(AnalysisResult(json))
    }

    async fn ask_question(
        &self,
        file_reference: &FileReference,
        question: &str,
    ) -> Result<String, TransportError> {
        debug!("Asking about {}: {}", file_reference, question);

        let body = ChatRequest {
            question,
            pdf_id: file_reference.as_str(),
        };

        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let text = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        // A 2xx body that is not JSON is still an answer.
        let body = serde_json::from_str::<serde_json::Value>(&text)
            .unwrap_or(serde_json::Value::String(text));
        Ok(extract_answer(&body))
    }
}
