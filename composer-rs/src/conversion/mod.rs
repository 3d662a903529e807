//! Conversion gateway
//!
//! Stateless adapter between HTML strings and [`TemplateDocument`]s. The
//! actual conversion happens in an external service; this module only
//! forwards requests and reports failures.

use crate::error::Result;
use crate::template::TemplateDocument;

pub mod client;

pub use client::HttpConversionClient;

/// Bidirectional HTML <-> template conversion
#[async_trait::async_trait]
pub trait ConversionService: Send + Sync {
    /// Import an HTML email as a template document
    async fn html_to_json(&self, html: &str) -> Result<TemplateDocument>;

    /// Render a template document to HTML
    async fn json_to_html(&self, document: &TemplateDocument) -> Result<String>;
}
