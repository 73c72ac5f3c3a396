use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::client::{models::FileReference, RemoteService};
use crate::flows::AnswerError;
use crate::notify::Notifier;
use crate::session::{Message, Session, SessionId, StoreHandle};

/// Transcript text used in place of an answer when the backend call fails.
pub const ANSWER_FALLBACK: &str = "Sorry, I encountered an error responding to that.";
pub const ANSWER_FAILED_NOTICE: &str = "Failed to get response.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// No active session or a blank question; nothing was appended.
    Skipped,
    /// The session already has a question waiting; nothing was appended.
    Busy,
    Answered(String),
    Failed,
}

type WaitingSet = Arc<Mutex<HashSet<SessionId>>>;

/// A question already recorded in its session and holding that session's waiting
/// slot. The slot is released when this is dropped.
pub struct PendingQuestion {
    waiting: WaitingSet,
    session_id: SessionId,
    file_name: String,
    file_reference: FileReference,
    question: String,
}

impl PendingQuestion {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

impl Drop for PendingQuestion {
    fn drop(&mut self) {
        self.waiting
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.session_id);
    }
}

/// Question/answer exchange for one session at a time.
///
/// The user's question is appended before the backend is called and is never
/// retracted; a failure only adds an error message after it. A session holds at
/// most one waiting question; further questions are refused, not queued.
pub struct Conversation {
    service: Arc<dyn RemoteService>,
    store: StoreHandle,
    notifier: Arc<dyn Notifier>,
    waiting: WaitingSet,
}

impl Conversation {
    pub fn new(
        service: Arc<dyn RemoteService>,
        store: StoreHandle,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            service,
            store,
            notifier,
            waiting: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a question for `id` is still waiting on the backend.
    pub fn is_busy(&self, id: SessionId) -> bool {
        self.waiting
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }

    /// Records the question and claims the session's waiting slot without awaiting
    /// anything, so a caller can do this before handing the rest to another task.
    pub fn begin(
        &self,
        session: Option<&Session>,
        question: &str,
    ) -> Result<PendingQuestion, AskOutcome> {
        let Some(session) = session else {
            return Err(AskOutcome::Skipped);
        };
        let question = question.trim();
        if question.is_empty() {
            return Err(AskOutcome::Skipped);
        }

        let mut waiting = self.waiting.lock().unwrap_or_else(|e| e.into_inner());
        if !waiting.insert(session.id) {
            debug!("{} already has a question waiting", session.file_name);
            return Err(AskOutcome::Busy);
        }
        // Appended under the waiting lock so a busy session always shows its question.
        self.store.append_message(session.id, Message::user(question));
        drop(waiting);

        Ok(PendingQuestion {
            waiting: self.waiting.clone(),
            session_id: session.id,
            file_name: session.file_name.clone(),
            file_reference: session.file_reference.clone(),
            question: question.to_string(),
        })
    }

    /// Sends a begun question and appends the answer or the fallback error.
    pub async fn finish(&self, pending: PendingQuestion) -> AskOutcome {
        // The session may be gone by the time the answer lands; appends then no-op.
        match self.answer(&pending.file_reference, &pending.question).await {
            Ok(answer) => {
                self.store
                    .append_message(pending.session_id, Message::assistant(answer.clone()));
                AskOutcome::Answered(answer)
            }
            Err(e) => {
                warn!("Question on {} failed: {}", pending.file_name, e);
                self.notifier.error(ANSWER_FAILED_NOTICE);
                self.store
                    .append_message(pending.session_id, Message::error(ANSWER_FALLBACK));
                AskOutcome::Failed
            }
        }
    }

    pub async fn ask(&self, session: Option<&Session>, question: &str) -> AskOutcome {
        match self.begin(session, question) {
            Ok(pending) => self.finish(pending).await,
            Err(outcome) => outcome,
        }
    }

    async fn answer(
        &self,
        file_reference: &FileReference,
        question: &str,
    ) -> Result<String, AnswerError> {
        let answer = self.service.ask_question(file_reference, question).await?;
        debug!("Received {} chars for {}", answer.len(), file_reference);
        Ok(answer)
    }
}
