//! Session store — in-memory map of live wizard sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::wizard::{Questionnaire, SessionState, WizardAction, WizardView};

/// One live session.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub id: Uuid,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let idle = now.signed_duration_since(self.last_active_at);
        idle.to_std().map(|idle| idle > timeout).unwrap_or(false)
    }
}

/// Sessions keyed by id, all sharing one read-only questionnaire.
pub struct SessionStore {
    questionnaire: Arc<Questionnaire>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(questionnaire: Arc<Questionnaire>, idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            questionnaire,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    /// Start a new session on the first question.
    pub async fn create(&self) -> WizardView {
        let now = Utc::now();
        let entry = SessionEntry {
            id: Uuid::new_v4(),
            state: self.questionnaire.start(),
            created_at: now,
            last_active_at: now,
        };
        let view = self.view_of(&entry);

        info!(session_id = %entry.id, questions = self.questionnaire.len(), "Session started");
        self.sessions.write().await.insert(entry.id, entry);
        view
    }

    /// Current view of a session.
    pub async fn view(&self, id: Uuid) -> Result<WizardView, SessionError> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id).ok_or(SessionError::NotFound { id })?;
        Ok(self.view_of(entry))
    }

    /// Snapshot of a session's state.
    pub async fn get(&self, id: Uuid) -> Option<SessionEntry> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Apply an action. Rejected actions leave the stored state untouched.
    pub async fn apply(&self, id: Uuid, action: &WizardAction) -> Result<WizardView, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound { id })?;
        entry.last_active_at = Utc::now();

        match self.questionnaire.apply(&entry.state, action) {
            Ok(next) => {
                entry.state = next;
                debug!(
                    session_id = %id,
                    action = action.name(),
                    index = entry.state.index,
                    "Action applied"
                );
                Ok(self.view_of(entry))
            }
            Err(e) if e.is_warning() => {
                debug!(session_id = %id, action = action.name(), warning = %e, "Action rejected");
                Err(e.into())
            }
            Err(e) => {
                warn!(session_id = %id, action = action.name(), error = %e, "Action failed");
                Err(e.into())
            }
        }
    }

    /// End a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Session ended");
        }
        removed
    }

    /// Drop sessions idle longer than the timeout. Returns how many were dropped.
    pub async fn expire_idle(&self) -> usize {
        self.expire_idle_at(Utc::now()).await
    }

    async fn expire_idle_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(now, self.idle_timeout));
        let expired = before - sessions.len();
        if expired > 0 {
            info!(count = expired, "Expired idle sessions");
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn view_of(&self, entry: &SessionEntry) -> WizardView {
        WizardView::project(&self.questionnaire, &entry.state).with_session(entry.id)
    }
}

/// Spawn a background task that sweeps idle sessions every `interval`.
pub fn spawn_expiry_task(store: Arc<SessionStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.expire_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ValidationError, WizardError};
    use crate::wizard::controller::tests::{abc, StubClassifier};
    use crate::wizard::Answer;

    fn store() -> Arc<SessionStore> {
        let q = abc(StubClassifier::new([0.3, 0.7]));
        SessionStore::new(Arc::new(q), Duration::from_secs(60))
    }

    fn select(feature: &str, answer: Answer) -> WizardAction {
        WizardAction::SelectAnswer {
            feature: feature.into(),
            answer,
        }
    }

    #[tokio::test]
    async fn create_and_view() {
        let store = store();
        assert!(store.is_empty().await);

        let view = store.create().await;
        let id = view.session_id.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.view(id).await.unwrap(), view);
    }

    #[tokio::test]
    async fn rejected_action_keeps_state() {
        let store = store();
        let id = store.create().await.session_id.unwrap();
        let before = store.get(id).await.unwrap().state;

        let err = store.apply(id, &WizardAction::Next).await.unwrap_err();
        assert_eq!(
            err,
            SessionError::Wizard(WizardError::Validation(ValidationError::Unanswered {
                feature: "A".into()
            }))
        );
        assert_eq!(store.get(id).await.unwrap().state, before);
    }

    #[tokio::test]
    async fn incomplete_submit_keeps_state() {
        let model = StubClassifier::new([0.3, 0.7]);
        let store = SessionStore::new(Arc::new(abc(Arc::clone(&model))), Duration::from_secs(60));
        let id = store.create().await.session_id.unwrap();

        store.apply(id, &select("A", Answer::Yes)).await.unwrap();
        store.apply(id, &WizardAction::Next).await.unwrap();
        store.apply(id, &select("B", Answer::No)).await.unwrap();
        store.apply(id, &WizardAction::Next).await.unwrap();
        let before = store.get(id).await.unwrap().state;

        let err = store.apply(id, &WizardAction::Submit).await.unwrap_err();
        assert_eq!(
            err,
            SessionError::Wizard(WizardError::Validation(ValidationError::Incomplete {
                unanswered: vec!["C".into()]
            }))
        );
        assert_eq!(store.get(id).await.unwrap().state, before);
        assert!(store.view(id).await.unwrap().probability.is_none());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn full_walkthrough_then_restart() {
        let store = store();
        let id = store.create().await.session_id.unwrap();

        for (feature, answer) in [("A", Answer::Yes), ("B", Answer::No), ("C", Answer::Yes)] {
            store.apply(id, &select(feature, answer)).await.unwrap();
            if feature != "C" {
                store.apply(id, &WizardAction::Next).await.unwrap();
            }
        }
        let view = store.apply(id, &WizardAction::Submit).await.unwrap();
        assert_eq!(view.probability, Some(0.7));
        assert_eq!(view.probability_display.as_deref(), Some("0.700"));

        let view = store.apply(id, &WizardAction::Restart).await.unwrap();
        assert_eq!(view.index, 0);
        assert!(view.probability.is_none());
        assert_eq!(view.answered, 0);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = store();
        let a = store.create().await.session_id.unwrap();
        let b = store.create().await.session_id.unwrap();

        store.apply(a, &select("A", Answer::Yes)).await.unwrap();
        store.apply(a, &WizardAction::Next).await.unwrap();

        assert_eq!(store.view(a).await.unwrap().index, 1);
        assert_eq!(store.view(b).await.unwrap().index, 0);
        assert_eq!(store.view(b).await.unwrap().answer, Answer::Unanswered);
    }

    #[tokio::test]
    async fn unknown_session() {
        let store = store();
        let id = Uuid::new_v4();
        assert_eq!(store.view(id).await.unwrap_err(), SessionError::NotFound { id });
        assert!(store.apply(id, &WizardAction::Next).await.is_err());
        assert!(!store.remove(id).await);
    }

    #[tokio::test]
    async fn expires_idle_sessions_only() {
        let store = store();
        let stale = store.create().await.session_id.unwrap();
        let fresh = store.create().await.session_id.unwrap();

        let later = Utc::now() + chrono::Duration::seconds(120);
        store
            .sessions
            .write()
            .await
            .get_mut(&fresh)
            .unwrap()
            .last_active_at = later;

        assert_eq!(store.expire_idle_at(later).await, 1);
        assert!(store.get(stale).await.is_none());
        assert!(store.get(fresh).await.is_some());
    }
}
