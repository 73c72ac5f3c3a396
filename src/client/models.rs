use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Identifier the backend hands out for an uploaded paper (`pdf_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(String);

impl FileReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file as handed to the upload flow: display name, declared media type, contents.
#[derive(Debug, Clone)]
pub struct PaperFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl PaperFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, declaring its media type from the extension the way a
    /// browser file picker would.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }
}

/// Body of a successful `/upload_pdf` call. Only `pdf_id` is consumed.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub pdf_id: String,
}

/// Whatever `/analyze_sections` returned. Kept but never inspected.
#[derive(Debug, Clone)]
pub struct AnalysisResult(pub serde_json::Value);

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub question: &'a str,
    pub pdf_id: &'a str,
}

/// Pulls the answer text out of a `/chat` body: `answer`, then `response`, then the
/// whole body stringified. A bare string body is the answer itself.
pub fn extract_answer(body: &serde_json::Value) -> String {
    if let serde_json::Value::String(text) = body {
        return text.clone();
    }
    field_text(body, "answer")
        .or_else(|| field_text(body, "response"))
        .unwrap_or_else(|| body.to_string())
}

// Null, false, zero and "" count as missing.
fn field_text(body: &serde_json::Value, field: &str) -> Option<String> {
    match body.get(field)? {
        serde_json::Value::Null | serde_json::Value::Bool(false) => None,
        serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_field_wins() {
        let body = json!({"answer": "It proposes X.", "response": "ignored", "sources": []});
        assert_eq!(extract_answer(&body), "It proposes X.");
    }

    #[test]
    fn falls_back_to_response_field() {
        let body = json!({"answer": "", "response": "From the response field"});
        assert_eq!(extract_answer(&body), "From the response field");
    }

    #[test]
    fn non_string_answer_is_stringified() {
        let body = json!({"answer": {"content": "structured"}});
        assert_eq!(extract_answer(&body), r#"{"content":"structured"}"#);
    }

    #[test]
    fn stringifies_body_without_known_fields() {
        let body = json!({"detail": "odd"});
        assert_eq!(extract_answer(&body), r#"{"detail":"odd"}"#);
    }

    #[test]
    fn zero_answer_counts_as_missing() {
        let body = json!({"answer": 0, "response": "fallback"});
        assert_eq!(extract_answer(&body), "fallback");
        let body = json!({"answer": 0.0});
        assert_eq!(extract_answer(&body), r#"{"answer":0.0}"#);
        let body = json!({"answer": 42});
        assert_eq!(extract_answer(&body), "42");
    }

    #[test]
    fn plain_string_body_is_the_answer() {
        assert_eq!(extract_answer(&json!("It proposes X.")), "It proposes X.");
    }

    #[test]
    fn media_type_check_ignores_case() {
        let file = PaperFile::new("paper.pdf", "Application/PDF", vec![]);
        assert!(file.is_pdf());
        let file = PaperFile::new("notes.txt", "text/plain", vec![]);
        assert!(!file.is_pdf());
    }
}
