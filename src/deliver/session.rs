//! In-memory request sessions.
//!
//! Each chat request is an independent unit of work. Its field values and
//! artifacts are owned exclusively by the session and are discarded with it;
//! only the read-only catalog is shared between requests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::collect::FieldValueSet;

use super::DeliveryOutcome;

/// Request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    SelectingTemplate,
    CollectingFields,
    Rendering,
    Converting,
    Done,
}

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    /// Free-form label of the requesting user, used only in reports.
    pub user: Option<String>,
    pub state: SessionState,
    pub template_id: Option<String>,
    pub values: Option<FieldValueSet>,
    /// Set exactly once, on the terminal transition to `Done`.
    pub outcome: Option<DeliveryOutcome>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(user: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            state: SessionState::SelectingTemplate,
            template_id: None,
            values: None,
            outcome: None,
            created_at: Utc::now(),
        }
    }
}

/// Concurrent map of live sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, user: Option<String>) -> Uuid {
        let session = Session::new(user);
        let id = session.id;
        self.sessions.write().insert(id, session);
        id
    }

    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.sessions.read().get(&id).map(f)
    }

    pub fn with_session_mut<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.sessions.write().get_mut(&id).map(f)
    }

    /// Discard a session and everything it owns.
    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove() {
        let store = SessionStore::new();
        let id = store.create(Some("ana".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.with_session(id, |s| s.state),
            Some(SessionState::SelectingTemplate)
        );
        assert!(store.remove(id));
        assert!(store.is_empty());
        assert!(!store.remove(id));
    }
}
