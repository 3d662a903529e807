//! Live editor sessions, keyed by session id

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{CredentialManager, Directive, SessionState, TokenProvider};
use crate::error::{ComposerError, Result};

#[derive(Default)]
struct Sessions {
    by_id: HashMap<String, Arc<CredentialManager>>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

impl Sessions {
    fn remove(&mut self, id: &str) -> Option<Arc<CredentialManager>> {
        let removed = self.by_id.remove(id)?;
        self.order.retain(|held| held != id);
        Some(removed)
    }
}

/// Bounded registry of credential managers, one per editor session.
///
/// Failed sessions are dropped as soon as the failure is reported, and the
/// oldest session is evicted once `capacity` is reached.
pub struct SessionRegistry {
    provider: Arc<dyn TokenProvider>,
    capacity: usize,
    sessions: RwLock<Sessions>,
}

impl SessionRegistry {
    pub fn new(provider: Arc<dyn TokenProvider>, capacity: usize) -> Self {
        Self {
            provider,
            capacity: capacity.max(1),
            sessions: RwLock::new(Sessions::default()),
        }
    }

    /// Create a session and run its first token request.
    ///
    /// A session whose first request fails is not kept.
    pub async fn create(&self, uid: Option<String>) -> Result<Arc<CredentialManager>> {
        let id = Uuid::new_v4().to_string();
        let manager = Arc::new(CredentialManager::new(id.clone(), uid, self.provider.clone()));

        manager.authenticate().await?;

        let mut sessions = self.sessions.write().await;
        while sessions.by_id.len() >= self.capacity {
            let Some(oldest) = sessions.order.pop_front() else {
                break;
            };
            sessions.by_id.remove(&oldest);
            info!("Session {} evicted, registry at capacity", oldest);
        }
        sessions.by_id.insert(id.clone(), manager.clone());
        sessions.order.push_back(id.clone());
        info!("Session {} created", id);
        Ok(manager)
    }

    pub async fn get(&self, id: &str) -> Result<Arc<CredentialManager>> {
        self.sessions
            .read()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| ComposerError::not_found(id))
    }

    /// Deliver an editor code to session `id`.
    ///
    /// The session is discarded once it reaches `Failed`; later calls for
    /// the same id answer not found.
    pub async fn handle_code(&self, id: &str, code: i64) -> Result<(SessionState, Directive)> {
        let session = self.get(id).await?;
        let result = session.handle_code(code).await;
        let state = session.state().await;

        if state == SessionState::Failed && self.sessions.write().await.remove(id).is_some() {
            debug!("Session {} failed and was discarded", id);
        }

        Ok((state, result?))
    }

    /// Discard a session; the editor starts over with [`SessionRegistry::create`]
    pub async fn remove(&self, id: &str) -> Result<()> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                info!("Session {} discarded", id);
                Ok(())
            }
            None => Err(ComposerError::not_found(id)),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionCredential;
    use serde_json::json;

    struct StaticProvider {
        ok: bool,
    }

    #[async_trait::async_trait]
    impl TokenProvider for StaticProvider {
        async fn request_token(&self, uid: Option<&str>) -> Result<SessionCredential> {
            if self.ok {
                SessionCredential::issue(json!({ "uid": uid.unwrap_or("default-uid") }))
            } else {
                Err(ComposerError::Auth("denied".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = SessionRegistry::new(Arc::new(StaticProvider { ok: true }), 10);
        let session = registry.create(Some("user-7".to_string())).await.unwrap();
        assert_eq!(session.state().await, SessionState::Active);
        assert_eq!(session.credential().await.unwrap().as_map()["uid"], "user-7");

        let same = registry.get(session.id()).await.unwrap();
        assert!(Arc::ptr_eq(&session, &same));

        registry.remove(session.id()).await.unwrap();
        assert!(registry.is_empty().await);
        assert!(matches!(
            registry.get(session.id()).await,
            Err(ComposerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_first_request_is_not_kept() {
        let registry = SessionRegistry::new(Arc::new(StaticProvider { ok: false }), 10);
        assert!(matches!(registry.create(None).await, Err(ComposerError::Auth(_))));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_failed_session_is_discarded() {
        let registry = SessionRegistry::new(Arc::new(StaticProvider { ok: true }), 10);
        let kept = registry.create(None).await.unwrap();
        let corrupted = registry.create(None).await.unwrap();

        let (state, directive) = registry.handle_code(corrupted.id(), 5102).await.unwrap();
        assert_eq!(state, SessionState::Failed);
        assert_eq!(directive, Directive::Reinitialize);

        assert_eq!(registry.len().await, 1);
        assert!(matches!(
            registry.handle_code(corrupted.id(), 5101).await,
            Err(ComposerError::NotFound { .. })
        ));
        assert!(registry.get(kept.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_live_codes_keep_the_session() {
        let registry = SessionRegistry::new(Arc::new(StaticProvider { ok: true }), 10);
        let session = registry.create(None).await.unwrap();

        let (state, directive) = registry.handle_code(session.id(), 3000).await.unwrap();
        assert_eq!(state, SessionState::Active);
        assert_eq!(directive, Directive::Ignore);
        assert!(matches!(
            registry.handle_code(session.id(), 5101).await,
            Ok((SessionState::Active, Directive::UpdateToken { .. }))
        ));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_oldest_session_evicted_at_capacity() {
        let registry = SessionRegistry::new(Arc::new(StaticProvider { ok: true }), 2);
        let first = registry.create(None).await.unwrap();
        let second = registry.create(None).await.unwrap();
        let third = registry.create(None).await.unwrap();

        assert_eq!(registry.len().await, 2);
        assert!(matches!(
            registry.get(first.id()).await,
            Err(ComposerError::NotFound { .. })
        ));
        assert!(registry.get(second.id()).await.is_ok());
        assert!(registry.get(third.id()).await.is_ok());

        // a removed session frees its slot without disturbing the order
        registry.remove(second.id()).await.unwrap();
        let fourth = registry.create(None).await.unwrap();
        assert_eq!(registry.len().await, 2);
        assert!(registry.get(third.id()).await.is_ok());
        assert!(registry.get(fourth.id()).await.is_ok());
    }
}
