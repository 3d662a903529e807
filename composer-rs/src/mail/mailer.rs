//! Test-send orchestration: validate, substitute, deliver

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{MailTransport, OutgoingMessage};
use crate::error::{ComposerError, Result};
use crate::personalization::{substitute, Replacements};

/// Subject used when the request carries none
pub const DEFAULT_SUBJECT: &str = "Email Template Test";

/// Body of `POST /api/send-test`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendTestRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub html: Option<String>,
    /// Placeholder -> value mapping, applied in key order
    pub replacements: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTestResponse {
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    /// True when the message went to the preview mailbox
    pub using_ethereal: bool,
}

/// Sends personalized test emails through one transport
pub struct TestMailer {
    transport: Arc<dyn MailTransport>,
    from: String,
}

impl TestMailer {
    pub fn new(transport: Arc<dyn MailTransport>, from: impl Into<String>) -> Self {
        Self {
            transport,
            from: from.into(),
        }
    }

    pub async fn send(&self, request: SendTestRequest) -> Result<SendTestResponse> {
        let to = non_blank(request.to);
        let html = non_blank(request.html);
        let (to, html) = match (to, html) {
            (Some(to), Some(html)) => (to, html),
            _ => return Err(ComposerError::Validation("Missing \"to\" or \"html\"".to_string())),
        };

        let replacements = match request.replacements {
            None | Some(Value::Null) => Replacements::new(),
            Some(Value::Object(map)) => Replacements::from_json(&map),
            Some(_) => {
                return Err(ComposerError::Validation(
                    "\"replacements\" must be an object".to_string(),
                ))
            }
        };
        let html = substitute(&html, &replacements);
        let subject = non_blank(request.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let delivery = self
            .transport
            .deliver(OutgoingMessage {
                from: self.from.clone(),
                to: to.clone(),
                subject,
                html,
            })
            .await?;

        let using_ethereal = self.transport.is_preview();
        info!(
            "Test email {} sent to {} ({} replacements, preview: {})",
            delivery.message_id,
            to,
            replacements.len(),
            using_ethereal
        );

        Ok(SendTestResponse {
            message_id: delivery.message_id,
            preview_url: if using_ethereal { delivery.preview_url } else { None },
            using_ethereal,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
