//! Named full templates built from the base frame and row fragments

use serde_json::{json, Map};
use std::path::Path;
use tracing::info;

use crate::error::{ComposerError, Result};
use crate::library::rows::row_fragment;
use crate::template::{
    compose, ComposeOptions, Column, Module, Page, Row, TemplateDocument, TemplateVersion,
};

/// Identifiers of every named template
pub const TEMPLATE_IDS: &[&str] = &["recommendations", "abandoned-cart"];

/// Version stamped on composed templates
pub const TEMPLATE_VERSION: &str = "2.0.0";

/// Built-in base frame: a hero header row and a footer row
pub fn builtin_base() -> TemplateDocument {
    let header = Row {
        name: Some("Header".to_string()),
        columns: vec![Column::full_width(vec![
            Module::paragraph("<h1 style=\"text-align:center\">{{ shop.name }}</h1>"),
        ])
        .with_style(json!({ "padding-top": "20px", "padding-bottom": "20px" }))],
        ..Row::default()
    };

    let footer = Row {
        name: Some("Footer".to_string()),
        columns: vec![Column::full_width(vec![Module::paragraph(
            "<p style=\"text-align:center;font-size:12px\"><a href=\"{{ unsubscribe_url }}\">Unsubscribe</a> | <a href=\"{{ preference_center_url }}\">Preferences</a></p>",
        )])],
        ..Row::default()
    };

    let mut extra = Map::new();
    extra.insert(
        "body".to_string(),
        json!({
            "container": { "style": { "background-color": "#F5F5F5" } },
            "content": {
                "computedStyle": { "linkColor": "#0068A5", "messageWidth": "600px" },
                "style": { "color": "#000000", "font-family": "Arial, Helvetica, sans-serif" }
            }
        }),
    );

    TemplateDocument {
        page: Page {
            rows: vec![header, footer],
            template: TemplateVersion {
                version: TEMPLATE_VERSION.to_string(),
                extra: Map::new(),
            },
            title: "Base".to_string(),
            description: None,
            extra,
        },
        comments: Map::new(),
    }
}

/// Load a base template from a JSON file
pub fn load_base(path: &Path) -> Result<TemplateDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ComposerError::Config(format!(
            "Failed to read base template {}: {}",
            path.display(),
            e
        ))
    })?;

    let base: TemplateDocument = serde_json::from_str(&content).map_err(|e| {
        ComposerError::Config(format!(
            "Failed to parse base template {}: {}",
            path.display(),
            e
        ))
    })?;

    info!(
        "Loaded base template '{}' with {} rows from {}",
        base.page.title,
        base.page.rows.len(),
        path.display()
    );
    Ok(base)
}

/// Compose a named template on top of `base`
pub fn named_template(base: &TemplateDocument, id: &str) -> Result<TemplateDocument> {
    let (fragment, options) = match id {
        "recommendations" => (
            "recommendations",
            ComposeOptions::new("Product Recommendations", TEMPLATE_VERSION)
                .with_description("Recommendations email"),
        ),
        "abandoned-cart" => (
            "product-loop",
            ComposeOptions::new("Abandoned Cart", TEMPLATE_VERSION)
                .with_description("Abandoned cart reminder"),
        ),
        _ => return Err(ComposerError::not_found(id)),
    };

    let rows = row_fragment(fragment)?;
    compose(base, &rows, &options)
}
