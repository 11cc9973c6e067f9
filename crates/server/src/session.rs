//! In-memory session storage.
//!
//! Sessions live until deleted or the process exits; there is no expiry.

use std::collections::HashMap;
use std::sync::Arc;

use codeflow_chunker::LanguageSelector;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Invalid language '{given}'. Must be one of: {}", LanguageSelector::ACCEPTED.join(", "))]
    InvalidLanguage { given: String },
}

/// Snapshot of one stored submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub code: String,
    pub language: LanguageSelector,
}

/// Map of session id to submission.
///
/// The map lock is held only for lookups and inserts; each session carries
/// its own lock so writers to different ids never wait on each other.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, code: String) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            code,
            language: LanguageSelector::Auto,
        };
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    async fn entry(&self, id: &str) -> Result<Arc<Mutex<Session>>, SessionError> {
        let not_found = || SessionError::NotFound(id.to_string());
        let key = Uuid::parse_str(id).map_err(|_| not_found())?;
        self.sessions
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(not_found)
    }

    /// Overwrite the language of an existing session.
    pub async fn set_language(
        &self,
        id: &str,
        language: &str,
    ) -> Result<LanguageSelector, SessionError> {
        let entry = self.entry(id).await?;
        let selector: LanguageSelector =
            language
                .parse()
                .map_err(|_| SessionError::InvalidLanguage {
                    given: language.to_string(),
                })?;
        entry.lock().await.language = selector;
        Ok(selector)
    }

    pub async fn get(&self, id: &str) -> Result<Session, SessionError> {
        let entry = self.entry(id).await?;
        let snapshot = entry.lock().await.clone();
        Ok(snapshot)
    }

    pub async fn delete(&self, id: &str) -> Result<(), SessionError> {
        let not_found = || SessionError::NotFound(id.to_string());
        let key = Uuid::parse_str(id).map_err(|_| not_found())?;
        self.sessions
            .write()
            .await
            .remove(&key)
            .map(|_| ())
            .ok_or_else(not_found)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeflow_chunker::Language;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_lifecycle() {
        let store = SessionStore::new();
        let id = store.create("print('hi')".into()).await.to_string();
        assert_eq!(store.len().await, 1);

        let session = store.get(&id).await.unwrap();
        assert_eq!(session.language, LanguageSelector::Auto);
        assert_eq!(session.code, "print('hi')");

        let selected = store.set_language(&id, "javascript").await.unwrap();
        assert_eq!(selected, LanguageSelector::Explicit(Language::JavaScript));
        assert_eq!(
            store.get(&id).await.unwrap().language,
            LanguageSelector::Explicit(Language::JavaScript)
        );

        store.delete(&id).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(
            store.get(&id).await,
            Err(SessionError::NotFound(id.clone()))
        );
        assert_eq!(
            store.delete(&id).await,
            Err(SessionError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn test_invalid_language_leaves_session_untouched() {
        let store = SessionStore::new();
        let id = store.create("x = 1".into()).await.to_string();
        store.set_language(&id, "c").await.unwrap();

        let err = store.set_language(&id, "rust").await.unwrap_err();
        assert!(err.to_string().contains("auto, python, javascript, c"));
        assert_eq!(
            store.get(&id).await.unwrap().language,
            LanguageSelector::Explicit(Language::C)
        );
    }

    #[tokio::test]
    async fn test_unknown_id_checked_before_language() {
        let store = SessionStore::new();
        assert_eq!(
            store.set_language("not-a-uuid", "rust").await,
            Err(SessionError::NotFound("not-a-uuid".into()))
        );
        let absent = Uuid::new_v4().to_string();
        assert!(matches!(
            store.set_language(&absent, "python").await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_distinct_sessions_are_independent() {
        let store = SessionStore::new();
        let a = store.create("a = 1".into()).await.to_string();
        let b = store.create("b = 2".into()).await.to_string();
        assert_ne!(a, b);

        let (ra, rb) = tokio::join!(
            store.set_language(&a, "python"),
            store.set_language(&b, "c")
        );
        ra.unwrap();
        rb.unwrap();
        assert_eq!(store.get(&b).await.unwrap().code, "b = 2");
    }
}
