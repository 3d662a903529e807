//! composer-rs: backend gateway for an embedded email-template editor
//!
//! Sits between a browser-hosted visual email editor and the services it
//! depends on.
//!
//! # Features
//!
//! - Template document model with row splicing and display conditions
//! - Demo customer scenarios, personalization rows and named templates
//! - HTML <-> template conversion through an external service
//! - Editor session credentials with single-flight refresh on expiry
//! - Test sends with literal placeholder substitution, via SMTP or an
//!   in-process preview mailbox
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0:3001"
//! public_base_url = "http://localhost:3001"
//!
//! [auth]
//! client_id = "your-client-id"
//! client_secret = "your-client-secret"
//!
//! [conversion]
//! api_key = "your-conversion-key"
//!
//! [smtp]
//! host = "smtp.example.com"
//! port = 587
//! user = "mailer@example.com"
//! pass = "secret"
//! ```
//!
//! Every key can be overridden from the environment, e.g.
//! `COMPOSER_AUTH__CLIENT_SECRET`.

pub mod api;
pub mod config;
pub mod conversion;
pub mod error;
pub mod library;
pub mod mail;
pub mod personalization;
pub mod session;
pub mod template;

pub use api::{ApiServer, AppState};
pub use config::AppConfig;
pub use error::{ComposerError, Result};
