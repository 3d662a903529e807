//! API Server - HTTP surface for the editor

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::{self, AppState};

/// Build the router over shared state
pub fn router(state: Arc<AppState>) -> Router {
    // the editor is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Upstream proxies used by the editor page
    let proxy_routes = Router::new()
        .route("/bee-auth", post(handlers::editor_token))
        .route("/html-to-json", post(handlers::html_to_json));

    let api_routes = Router::new()
        .route("/json-to-html", post(handlers::json_to_html))
        .route("/streams/:id", get(handlers::get_stream))
        .route("/rows/:id", get(handlers::get_rows))
        .route("/templates/:id", get(handlers::get_template))
        .route("/editor/settings", get(handlers::editor_settings))
        .route("/send-test", post(handlers::send_test))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/:id/events", post(handlers::session_event));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/preview/:id", get(handlers::preview_message))
        .nest("/proxy", proxy_routes)
        .nest("/api", api_routes)
        // HTML imports and template documents can be large
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API server
pub struct ApiServer {
    state: Arc<AppState>,
    addr: String,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>, addr: impl Into<String>) -> Self {
        Self {
            state,
            addr: addr.into(),
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind and serve until the process exits
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("composer-rs listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router()).await
    }
}
