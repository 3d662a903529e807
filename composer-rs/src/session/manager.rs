//! Per-session credential manager
//!
//! Holds the live credential and lifecycle state of one editor session.
//! Acquisitions are single-flight: concurrent expiry signals join the
//! request already in flight instead of issuing another one.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::state::{transition, SessionEvent, SessionState};
use super::{SessionCredential, TokenProvider};
use crate::error::{ComposerError, Result};

/// Instruction returned to the live editor after an event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    /// Hand the new credential to the running editor
    UpdateToken { token: SessionCredential },
    /// Tear the editor down and start a new session
    Reinitialize,
    Ignore,
}

struct Inner {
    state: SessionState,
    credential: Option<SessionCredential>,
    /// Bumped every time a credential is installed
    generation: u64,
}

/// Credential manager for one editor session
pub struct CredentialManager {
    id: String,
    uid: Option<String>,
    provider: Arc<dyn TokenProvider>,
    inner: Mutex<Inner>,
    /// Held for the whole duration of a token request
    acquire_guard: Mutex<()>,
}

impl CredentialManager {
    pub fn new(id: impl Into<String>, uid: Option<String>, provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            id: id.into(),
            uid,
            provider,
            inner: Mutex::new(Inner {
                state: SessionState::Unauthenticated,
                credential: None,
                generation: 0,
            }),
            acquire_guard: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Current credential, if one is held
    pub async fn credential(&self) -> Option<SessionCredential> {
        self.inner.lock().await.credential.clone()
    }

    /// Obtain the first credential for this session.
    ///
    /// Returns the held credential when the session is already active.
    pub async fn authenticate(&self) -> Result<SessionCredential> {
        self.acquire(SessionEvent::TokenRequested).await
    }

    /// React to an error code reported by the editor
    pub async fn handle_code(&self, code: i64) -> Result<Directive> {
        self.handle_event(SessionEvent::from_code(code)).await
    }

    pub async fn handle_event(&self, event: SessionEvent) -> Result<Directive> {
        match event {
            SessionEvent::CredentialExpired => {
                let token = self.acquire(event).await?;
                Ok(Directive::UpdateToken { token })
            }
            SessionEvent::SessionCorrupted => {
                let mut inner = self.inner.lock().await;
                inner.state = transition(inner.state, event);
                inner.credential = None;
                warn!("Session {} corrupted, editor must reinitialize", self.id);
                Ok(Directive::Reinitialize)
            }
            SessionEvent::Unrecognized(code) => {
                debug!("Session {} ignoring editor code {}", self.id, code);
                Ok(Directive::Ignore)
            }
            SessionEvent::TokenRequested
            | SessionEvent::TokenIssued
            | SessionEvent::TokenRejected => Err(ComposerError::Validation(format!(
                "{:?} is an internal session event",
                event
            ))),
        }
    }

    /// Run (or join) a token request triggered by `event`
    async fn acquire(&self, event: SessionEvent) -> Result<SessionCredential> {
        let observed = self.inner.lock().await.generation;

        let _guard = self.acquire_guard.lock().await;

        {
            let mut inner = self.inner.lock().await;
            if inner.state == SessionState::Failed {
                return Err(ComposerError::SessionFailed(self.id.clone()));
            }
            if inner.generation != observed {
                // joined a request that completed while we waited
                return self.held_credential(&inner);
            }
            // a request abandoned mid-flight leaves Authenticating/Refreshing
            // behind, and re-running it is the recovery
            let next = transition(inner.state, event);
            if !matches!(next, SessionState::Authenticating | SessionState::Refreshing) {
                return self.held_credential(&inner);
            }
            debug!("Session {} {} -> {}", self.id, inner.state, next);
            inner.state = next;
        }

        // no state lock across the network call, only the guard
        let result = self.provider.request_token(self.uid.as_deref()).await;

        let mut inner = self.inner.lock().await;
        if !matches!(inner.state, SessionState::Authenticating | SessionState::Refreshing) {
            // a 5102 landed while the request was in flight
            inner.credential = None;
            warn!("Session {} failed during token request, discarding result", self.id);
            return Err(ComposerError::SessionFailed(self.id.clone()));
        }
        match result {
            Ok(credential) => {
                inner.state = transition(inner.state, SessionEvent::TokenIssued);
                inner.credential = Some(credential.clone());
                inner.generation += 1;
                info!("Session {} credential issued (generation {})", self.id, inner.generation);
                Ok(credential)
            }
            Err(e) => {
                inner.state = transition(inner.state, SessionEvent::TokenRejected);
                inner.credential = None;
                warn!("Session {} failed to obtain a credential: {}", self.id, e);
                Err(e)
            }
        }
    }

    fn held_credential(&self, inner: &Inner) -> Result<SessionCredential> {
        match (inner.state, &inner.credential) {
            (SessionState::Active, Some(credential)) => Ok(credential.clone()),
            (SessionState::Unauthenticated, _) => Err(ComposerError::Validation(format!(
                "Session {} has no credential to refresh",
                self.id
            ))),
            _ => Err(ComposerError::SessionFailed(self.id.clone())),
        }
    }
}
