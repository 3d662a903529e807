//! SMTP transport backed by `lettre`

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Delivery, MailTransport, OutgoingMessage};
use crate::config::SmtpConfig;
use crate::error::{ComposerError, Result};

/// Relays test sends through a configured SMTP server
pub struct SmtpTransport {
    host: String,
    timeout: Duration,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn from_config(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls_for(config)?)
            .timeout(Some(timeout));
        if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        info!(
            "SMTP transport configured for {}:{} (secure: {})",
            config.host, config.port, config.secure
        );

        Ok(Self {
            host: config.host.clone(),
            timeout,
            transport: builder.build(),
        })
    }

    fn build_message(&self, message: &OutgoingMessage, message_id: &str) -> Result<Message> {
        let from: Mailbox = message
            .from
            .parse()
            .map_err(|_| ComposerError::Config(format!("Invalid sender address: {}", message.from)))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|_| ComposerError::Validation(format!("Invalid recipient address: {}", message.to)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .message_id(Some(message_id.to_string()))
            .header(header::ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| ComposerError::Send(e.to_string()))
    }
}

/// Implicit TLS when `secure`; otherwise STARTTLS if the server offers it
fn tls_for(config: &SmtpConfig) -> Result<Tls> {
    let parameters = TlsParameters::new(config.host.clone())
        .map_err(|e| ComposerError::Config(format!("Invalid SMTP TLS setup for {}: {}", config.host, e)))?;
    Ok(if config.secure {
        Tls::Wrapper(parameters)
    } else {
        Tls::Opportunistic(parameters)
    })
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn deliver(&self, message: OutgoingMessage) -> Result<Delivery> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.host);
        let email = self.build_message(&message, &message_id)?;

        debug!("Relaying test send to {} via {}", message.to, self.host);
        match tokio::time::timeout(self.timeout, self.transport.send(email)).await {
            Ok(Ok(_)) => Ok(Delivery {
                message_id,
                preview_url: None,
            }),
            Ok(Err(e)) => Err(ComposerError::Send(e.to_string())),
            Err(_) => Err(ComposerError::Timeout {
                service: "smtp".to_string(),
            }),
        }
    }

    fn is_preview(&self) -> bool {
        false
    }
}
