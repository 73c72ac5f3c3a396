use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::models::FileReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::Assistant => "assistant",
            MessageKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { kind: MessageKind::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { kind: MessageKind::Assistant, content: content.into() }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self { kind: MessageKind::Error, content: content.into() }
    }
}

/// One uploaded paper and the questions asked about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub file_reference: FileReference,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    transcript: Vec<Message>,
}

impl Session {
    pub(crate) fn new(file_reference: FileReference, file_name: String) -> Self {
        let greeting = Message::assistant(format!(
            "Document \"{}\" processed. Ask me anything about it!",
            file_name
        ));
        Self {
            id: SessionId::new(),
            file_reference,
            file_name,
            created_at: Utc::now(),
            transcript: vec![greeting],
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// Messages exchanged after the greeting.
    pub fn exchange_count(&self) -> usize {
        self.transcript.len().saturating_sub(1)
    }

    /// Plain-text dump of the session, one `[KIND]: content` block per message.
    pub fn export_transcript(&self) -> String {
        let mut export = String::new();
        export.push_str(&format!("Paper: {}\n", self.file_name));
        export.push_str(&format!("PDF ID: {}\n", self.file_reference));
        export.push_str(&format!("Session: {}\n", self.id));
        export.push_str(&format!("Created At: {}\n", self.created_at));
        export.push_str("---\n");

        for m in &self.transcript {
            export.push_str(&format!("[{}]: {}\n", m.kind.as_str().to_uppercase(), m.content));
            export.push_str("---\n");
        }
        export
    }
}
