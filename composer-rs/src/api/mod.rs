//! HTTP API
//!
//! Thin dispatcher: each handler forwards to the library, conversion,
//! session or mail modules and maps failures through `ComposerError`.

pub mod handlers;
pub mod server;

pub use handlers::AppState;
pub use server::{router, ApiServer};
