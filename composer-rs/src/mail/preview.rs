//! Disposable in-process preview mailbox
//!
//! Stands in for a real SMTP relay when none is configured. Messages are
//! kept in memory, newest last, and served back as HTML under
//! `/preview/{id}`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Delivery, MailTransport, OutgoingMessage};
use crate::config::PreviewConfig;

/// A captured message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub received_at: DateTime<Utc>,
}

/// Bounded preview mailbox; the oldest message is evicted when full
pub struct PreviewMailbox {
    capacity: usize,
    public_base_url: String,
    from: String,
    messages: RwLock<VecDeque<StoredMessage>>,
}

impl PreviewMailbox {
    pub fn new(config: &PreviewConfig, public_base_url: &str) -> Self {
        Self {
            capacity: config.capacity.max(1),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            from: config.from.clone(),
            messages: RwLock::new(VecDeque::new()),
        }
    }

    /// Sender used for messages routed here
    pub fn sender(&self) -> &str {
        &self.from
    }

    pub fn preview_url(&self, id: &str) -> String {
        format!("{}/preview/{}", self.public_base_url, id)
    }

    pub async fn get(&self, id: &str) -> Option<StoredMessage> {
        self.messages.read().await.iter().find(|m| m.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

#[async_trait]
impl MailTransport for PreviewMailbox {
    async fn deliver(&self, message: OutgoingMessage) -> crate::error::Result<Delivery> {
        let id = Uuid::new_v4().to_string();
        let stored = StoredMessage {
            id: id.clone(),
            from: message.from,
            to: message.to,
            subject: message.subject,
            html: message.html,
            received_at: Utc::now(),
        };

        let mut messages = self.messages.write().await;
        while messages.len() >= self.capacity {
            messages.pop_front();
        }
        messages.push_back(stored);
        debug!("Captured preview message {} ({} held)", id, messages.len());

        Ok(Delivery {
            preview_url: Some(self.preview_url(&id)),
            message_id: id,
        })
    }

    fn is_preview(&self) -> bool {
        true
    }
}
