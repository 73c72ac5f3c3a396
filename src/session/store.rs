use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::client::models::FileReference;
use crate::session::models::{Message, Session, SessionId};

/// Every open paper session, newest first, plus the active pointer.
///
/// The active id, when set, always names a session still in the collection.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    active: Option<SessionId>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_session(&mut self, file_reference: FileReference, file_name: &str) -> Session {
        let session = Session::new(file_reference, file_name.to_string());
        debug!("Created session {} for {}", session.id, session.file_name);

        self.sessions.insert(0, session.clone());
        self.active = Some(session.id);
        session
    }

    /// Points at `id`, or at the upload view for `None`. Unknown ids are refused.
    pub fn set_active(&mut self, id: Option<SessionId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.active = id;
                true
            }
        }
    }

    /// Appends to one session's transcript. Unknown ids are ignored.
    pub fn append_message(&mut self, id: SessionId, message: Message) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.push(message);
                true
            }
            None => {
                debug!("Dropping message for missing session {}", id);
                false
            }
        }
    }

    pub fn delete_session(&mut self, id: SessionId) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.active == Some(id) {
            self.active = None;
        }
        self.sessions.len() != before
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Session at a 1-based position in display order.
    pub fn nth(&self, position: usize) -> Option<&Session> {
        position.checked_sub(1).and_then(|i| self.sessions.get(i))
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Cloneable handle to the one store shared by the flows and the front end.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    inner: Arc<Mutex<SessionStore>>,
}

impl StoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the store. The guard must not be held across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_session(&self, file_reference: FileReference, file_name: &str) -> Session {
        self.lock().create_session(file_reference, file_name)
    }

    pub fn set_active(&self, id: Option<SessionId>) -> bool {
        self.lock().set_active(id)
    }

    pub fn append_message(&self, id: SessionId, message: Message) -> bool {
        self.lock().append_message(id, message)
    }

    pub fn delete_session(&self, id: SessionId) -> bool {
        self.lock().delete_session(id)
    }

    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.lock().get(id).cloned()
    }

    pub fn active(&self) -> Option<Session> {
        self.lock().active().cloned()
    }

    pub fn snapshot(&self) -> Vec<Session> {
        self.lock().sessions().to_vec()
    }
}
