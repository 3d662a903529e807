//! Session and credential management
//!
//! Keeps an embedded editor authenticated: obtains the first credential,
//! refreshes it when the editor reports expiry (code 5101) and tells the
//! editor to start over on session corruption (code 5102).

pub mod credential;
pub mod manager;
pub mod provider;
pub mod registry;
pub mod state;

pub use credential::SessionCredential;
pub use manager::{CredentialManager, Directive};
pub use provider::{HttpAuthClient, TokenProvider};
pub use registry::SessionRegistry;
pub use state::{transition, SessionEvent, SessionState};
