//! Token providers
//!
//! [`HttpAuthClient`] talks to the real auth service; tests plug in their
//! own [`TokenProvider`].

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::SessionCredential;
use crate::config::AuthConfig;
use crate::error::{ComposerError, Result};

/// Source of session credentials
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Request a fresh credential; `None` uses the configured default uid
    async fn request_token(&self, uid: Option<&str>) -> Result<SessionCredential>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    uid: &'a str,
}

/// Auth service client
pub struct HttpAuthClient {
    url: String,
    client_id: String,
    client_secret: String,
    default_uid: String,
    client: reqwest::Client,
}

impl HttpAuthClient {
    pub fn from_config(config: &AuthConfig, timeout: Duration) -> Result<Self> {
        let (client_id, client_secret) = match (&config.client_id, &config.client_secret) {
            (Some(id), Some(secret)) => (id.clone(), secret.clone()),
            _ => {
                return Err(ComposerError::MissingCredentialsConfig(
                    "auth.client_id and auth.client_secret must be set".to_string(),
                ))
            }
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComposerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            client_id,
            client_secret,
            default_uid: config.default_uid.clone(),
            client,
        })
    }
}

fn transport_error(e: reqwest::Error) -> ComposerError {
    if e.is_timeout() {
        ComposerError::Timeout {
            service: "auth service".to_string(),
        }
    } else {
        ComposerError::Auth(e.to_string())
    }
}

#[async_trait::async_trait]
impl TokenProvider for HttpAuthClient {
    async fn request_token(&self, uid: Option<&str>) -> Result<SessionCredential> {
        let uid = uid.filter(|u| !u.is_empty()).unwrap_or(self.default_uid.as_str());
        debug!("Requesting editor token for uid {}", uid);

        let response = self
            .client
            .post(&self.url)
            .json(&LoginRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                uid,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            warn!("Auth service answered {}: {}", status, body);
            return Err(ComposerError::Auth(body));
        }

        let value = serde_json::from_str(&body).map_err(|_| ComposerError::Auth(body))?;
        SessionCredential::issue(value)
    }
}
