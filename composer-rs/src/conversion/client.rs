//! HTTP client for the external conversion service

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

use super::ConversionService;
use crate::config::ConversionConfig;
use crate::error::{ComposerError, ConversionDirection, Result};
use crate::template::TemplateDocument;

const SERVICE: &str = "conversion service";

/// Conversion service client (`/v1/conversion/*` endpoints)
pub struct HttpConversionClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpConversionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComposerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build from validated configuration
    pub fn from_config(config: &ConversionConfig, timeout: Duration) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ComposerError::MissingCredentialsConfig("conversion.api_key must be set".to_string())
        })?;
        Self::new(config.base_url.clone(), api_key, timeout)
    }

    fn endpoint(&self, direction: ConversionDirection) -> String {
        format!("{}/v1/conversion/{}", self.base_url, direction)
    }

    /// Send a prepared request and return the successful response body
    async fn execute(
        &self,
        direction: ConversionDirection,
        request: reqwest::RequestBuilder,
    ) -> Result<String> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| transport_error(direction, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(direction, e))?;

        if !status.is_success() {
            warn!("Conversion {} failed with status {}: {}", direction, status, body);
            return Err(ComposerError::ConversionFailed {
                direction,
                diagnostic: body,
            });
        }

        Ok(body)
    }
}

fn transport_error(direction: ConversionDirection, e: reqwest::Error) -> ComposerError {
    if e.is_timeout() {
        ComposerError::Timeout {
            service: SERVICE.to_string(),
        }
    } else {
        ComposerError::ConversionFailed {
            direction,
            diagnostic: e.to_string(),
        }
    }
}

/// Pull the rendered HTML out of a json-to-html response.
///
/// The service answers with `{"html": "..."}`, a bare JSON string, or the
/// HTML itself.
fn extract_html(body: String) -> Result<String> {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(serde_json::Value::String(html)) => Ok(html),
        Ok(serde_json::Value::Object(mut map)) => match map.remove("html") {
            Some(serde_json::Value::String(html)) => Ok(html),
            _ => Err(ComposerError::ConversionFailed {
                direction: ConversionDirection::JsonToHtml,
                diagnostic: body,
            }),
        },
        Ok(_) => Err(ComposerError::ConversionFailed {
            direction: ConversionDirection::JsonToHtml,
            diagnostic: body,
        }),
        Err(_) => Ok(body),
    }
}

#[async_trait::async_trait]
impl ConversionService for HttpConversionClient {
    async fn html_to_json(&self, html: &str) -> Result<TemplateDocument> {
        let direction = ConversionDirection::HtmlToJson;
        debug!("Converting {} bytes of HTML", html.len());

        let request = self
            .client
            .post(self.endpoint(direction))
            .header(CONTENT_TYPE, "text/html")
            .body(html.to_string());
        let body = self.execute(direction, request).await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("Conversion service returned an unreadable document: {}", e);
            ComposerError::ConversionFailed {
                direction,
                diagnostic: body,
            }
        })
    }

    async fn json_to_html(&self, document: &TemplateDocument) -> Result<String> {
        let direction = ConversionDirection::JsonToHtml;
        debug!("Rendering template with {} rows", document.page.rows.len());

        let request = self.client.post(self.endpoint(direction)).json(document);
        let body = self.execute(direction, request).await?;

        extract_html(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        let client =
            HttpConversionClient::new("https://api.example.com/", "key", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            client.endpoint(ConversionDirection::HtmlToJson),
            "https://api.example.com/v1/conversion/html-to-json"
        );
        assert_eq!(
            client.endpoint(ConversionDirection::JsonToHtml),
            "https://api.example.com/v1/conversion/json-to-html"
        );
    }

    #[test]
    fn test_extract_html_shapes() {
        assert_eq!(extract_html(r#"{"html":"<p>a</p>"}"#.into()).unwrap(), "<p>a</p>");
        assert_eq!(extract_html(r#""<p>b</p>""#.into()).unwrap(), "<p>b</p>");
        assert_eq!(extract_html("<p>c</p>".into()).unwrap(), "<p>c</p>");
        assert!(matches!(
            extract_html(r#"{"error":"nope"}"#.into()),
            Err(ComposerError::ConversionFailed { .. })
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let config = ConversionConfig::default();
        assert!(matches!(
            HttpConversionClient::from_config(&config, Duration::from_secs(1)),
            Err(ComposerError::MissingCredentialsConfig(_))
        ));
    }
}
