//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::conversion::{ConversionService, HttpConversionClient};
use crate::error::{ComposerError, Result};
use crate::library::{CustomerScenario, Library, ROW_FRAGMENT_IDS};
use crate::mail::{
    MailTransport, PreviewMailbox, SendTestRequest, SendTestResponse, SmtpTransport, TestMailer,
};
use crate::personalization::{EditorSettings, ExternalContentUrl};
use crate::session::{
    Directive, HttpAuthClient, SessionCredential, SessionRegistry, SessionState, TokenProvider,
};
use crate::template::{Row, TemplateDocument};

/// Shared application state
pub struct AppState {
    pub library: Library,
    pub conversion: Arc<dyn ConversionService>,
    pub auth: Arc<dyn TokenProvider>,
    pub sessions: SessionRegistry,
    pub mailer: TestMailer,
    pub preview: Arc<PreviewMailbox>,
    pub editor_settings: EditorSettings,
}

impl AppState {
    /// Wire up every collaborator from validated configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timeout = config.upstream_timeout();

        let auth: Arc<dyn TokenProvider> = Arc::new(HttpAuthClient::from_config(&config.auth, timeout)?);
        let conversion: Arc<dyn ConversionService> =
            Arc::new(HttpConversionClient::from_config(&config.conversion, timeout)?);

        let preview = Arc::new(PreviewMailbox::new(&config.preview, &config.server.public_base_url));
        let mailer = match &config.smtp {
            Some(smtp) => {
                let from = smtp.sender().unwrap_or_default().to_string();
                let transport: Arc<dyn MailTransport> = Arc::new(SmtpTransport::from_config(smtp, timeout)?);
                TestMailer::new(transport, from)
            }
            None => {
                info!("SMTP not configured, test sends go to the preview mailbox");
                TestMailer::new(preview.clone(), preview.sender().to_string())
            }
        };

        let library = Library::from_config(&config.library)?;
        let editor_settings = EditorSettings::new(external_rows(config));

        Ok(Self {
            library,
            conversion,
            auth: auth.clone(),
            sessions: SessionRegistry::new(auth, config.sessions.capacity),
            mailer,
            preview,
            editor_settings,
        })
    }
}

/// Row sources for the editor: configured ones, or the built-in fragments
fn external_rows(config: &AppConfig) -> Vec<ExternalContentUrl> {
    if !config.library.external_rows.is_empty() {
        return config
            .library
            .external_rows
            .iter()
            .map(|source| ExternalContentUrl {
                name: source.name.clone(),
                value: source.url.clone(),
            })
            .collect();
    }

    let base = config.server.public_base_url.trim_end_matches('/');
    ROW_FRAGMENT_IDS
        .iter()
        .map(|id| ExternalContentUrl {
            name: fragment_title(id),
            value: format!("{}/api/rows/{}", base, id),
        })
        .collect()
}

/// "product-loop" -> "Product loop"
fn fragment_title(id: &str) -> String {
    let words = id.replace('-', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Optional uid for token requests
#[derive(Debug, Default, Deserialize)]
pub struct UidRequest {
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HtmlResponse {
    pub html: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionCredential>,
}

/// Error event reported by the editor
#[derive(Debug, Deserialize)]
pub struct EditorEvent {
    pub code: i64,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub state: SessionState,
    #[serde(flatten)]
    pub directive: Directive,
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// POST /proxy/bee-auth - one-off editor token
pub async fn editor_token(
    State(state): State<Arc<AppState>>,
    body: Option<Json<UidRequest>>,
) -> Result<Json<SessionCredential>> {
    let Json(request) = body.unwrap_or_default();
    let credential = state.auth.request_token(request.uid.as_deref()).await?;
    Ok(Json(credential))
}

/// POST /proxy/html-to-json - import an HTML email
pub async fn html_to_json(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<TemplateDocument>> {
    if body.trim().is_empty() || !body.contains('<') || !body.contains('>') {
        return Err(ComposerError::Validation(
            "Request body must be an HTML document".to_string(),
        ));
    }

    let document = state.conversion.html_to_json(&body).await?;
    debug!("Imported HTML as {} rows", document.page.rows.len());
    Ok(Json(document))
}

/// POST /api/json-to-html - render a template document
pub async fn json_to_html(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<HtmlResponse>> {
    let document: TemplateDocument = serde_json::from_value(body)
        .map_err(|e| ComposerError::Validation(format!("Invalid template document: {}", e)))?;
    let html = state.conversion.json_to_html(&document).await?;
    Ok(Json(HtmlResponse { html }))
}

/// GET /api/streams/:id - demo customer scenario
pub async fn get_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerScenario>> {
    Ok(Json(state.library.scenario(&id)?))
}

/// GET /api/rows/:id - personalization row fragment
pub async fn get_rows(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Row>>> {
    Ok(Json(state.library.row_fragment(&id)?))
}

/// GET /api/templates/:id - named full template
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TemplateDocument>> {
    Ok(Json(state.library.template(&id)?))
}

/// GET /api/editor/settings
pub async fn editor_settings(State(state): State<Arc<AppState>>) -> Json<EditorSettings> {
    Json(state.editor_settings.clone())
}

/// POST /api/send-test
pub async fn send_test(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SendTestRequest>>,
) -> Result<Json<SendTestResponse>> {
    let Json(request) = body.unwrap_or_default();
    Ok(Json(state.mailer.send(request).await?))
}

/// POST /api/sessions - start a managed editor session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<UidRequest>>,
) -> Result<impl IntoResponse> {
    let Json(request) = body.unwrap_or_default();
    let session = state.sessions.create(request.uid).await?;

    let response = SessionResponse {
        session_id: session.id().to_string(),
        state: session.state().await,
        token: session.credential().await,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>> {
    let session = state.sessions.get(&id).await?;
    Ok(Json(SessionResponse {
        session_id: id,
        state: session.state().await,
        token: None,
    }))
}

/// POST /api/sessions/:id/events - editor error callback
pub async fn session_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(event): Json<EditorEvent>,
) -> Result<Json<EventResponse>> {
    debug!(
        "Session {} reported code {}: {}",
        id,
        event.code,
        event.message.as_deref().unwrap_or("")
    );

    let (session_state, directive) = state.sessions.handle_code(&id, event.code).await?;
    Ok(Json(EventResponse {
        state: session_state,
        directive,
    }))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.sessions.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /preview/:id - captured test send
pub async fn preview_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    state
        .preview
        .get(&id)
        .await
        .map(|message| Html(message.html))
        .ok_or_else(|| ComposerError::not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalRowsConfig;

    #[test]
    fn test_fragment_title() {
        assert_eq!(fragment_title("product-loop"), "Product loop");
        assert_eq!(fragment_title("recommendations"), "Recommendations");
    }

    #[test]
    fn test_external_rows_default_to_builtin_fragments() {
        let config = AppConfig::development();
        let rows = external_rows(&config);
        assert_eq!(rows.len(), ROW_FRAGMENT_IDS.len());
        assert_eq!(rows[0].value, "http://localhost:3001/api/rows/product-loop");

        let mut config = AppConfig::development();
        config.library.external_rows = vec![ExternalRowsConfig {
            name: "Shared".to_string(),
            url: "https://rows.example.com/shared".to_string(),
        }];
        let rows = external_rows(&config);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Shared");
    }

    #[test]
    fn test_event_response_shape() {
        let response = EventResponse {
            state: SessionState::Failed,
            directive: Directive::Reinitialize,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"state": "failed", "directive": "reinitialize"})
        );
    }
}
