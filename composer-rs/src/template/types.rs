//! Template document types
//!
//! The document is a tree: page -> rows -> columns -> modules. Keys this
//! crate does not model (container styles, uuids, computed styles, ...) are
//! kept in `extra` maps so documents coming back from the conversion service
//! survive a round trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Module type name for paragraph blocks
pub const PARAGRAPH_MODULE: &str = "mailup-bee-newsletter-modules-paragraph";
/// Module type name for image blocks
pub const IMAGE_MODULE: &str = "mailup-bee-newsletter-modules-image";
/// Module type name for button blocks
pub const BUTTON_MODULE: &str = "mailup-bee-newsletter-modules-button";

/// Display condition kind used for every personalization directive
pub const PERSONALIZATION_KIND: &str = "Personalization";

/// Root template artifact handed to the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub page: Page,
    #[serde(default)]
    pub comments: Map<String, Value>,
}

/// Page section of a template document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub template: TemplateVersion,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Template schema version marker
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateVersion {
    #[serde(default)]
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A horizontal band of columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "colStackOnMobile", default)]
    pub col_stack_on_mobile: bool,
    #[serde(
        rename = "display-condition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_condition: Option<DisplayCondition>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A vertical slot inside a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "grid-columns", default = "default_grid_columns")]
    pub grid_columns: u8,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: Map<String, Value>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(
        rename = "display-condition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_condition: Option<DisplayCondition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_grid_columns() -> u8 {
    12
}

fn default_condition_kind() -> String {
    PERSONALIZATION_KIND.to_string()
}

/// Personalization directive bracketing a row or column.
///
/// `before` and `after` are emitted verbatim around the enclosing block by
/// the downstream renderer. They are never parsed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCondition {
    #[serde(rename = "type", default = "default_condition_kind")]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
}

impl DisplayCondition {
    /// Build a personalization directive
    pub fn personalization(
        label: impl Into<String>,
        description: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            kind: default_condition_kind(),
            label: label.into(),
            description: description.into(),
            before: before.into(),
            after: after.into(),
        }
    }

    /// Both markers are present and non-blank
    pub fn is_paired(&self) -> bool {
        !self.before.trim().is_empty() && !self.after.trim().is_empty()
    }
}

impl Row {
    /// Create an empty named row that stacks on mobile
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            col_stack_on_mobile: true,
            ..Self::default()
        }
    }

    /// Attach a display condition
    pub fn with_condition(mut self, condition: DisplayCondition) -> Self {
        self.display_condition = Some(condition);
        self
    }

    /// Append a column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Human readable label, falling back to the row position
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("row {}", index),
        }
    }

    /// Sum of the grid widths of all columns
    pub fn grid_total(&self) -> u32 {
        self.columns.iter().map(|c| u32::from(c.grid_columns)).sum()
    }
}

impl Column {
    /// Full-width column holding the given modules
    pub fn full_width(modules: Vec<Module>) -> Self {
        Self::with_width(12, modules)
    }

    /// Column of a given grid width
    pub fn with_width(grid_columns: u8, modules: Vec<Module>) -> Self {
        Self {
            grid_columns,
            style: Map::new(),
            modules,
            display_condition: None,
            extra: Map::new(),
        }
    }

    /// Attach a display condition
    pub fn with_condition(mut self, condition: DisplayCondition) -> Self {
        self.display_condition = Some(condition);
        self
    }

    /// Replace the column style
    pub fn with_style(mut self, style: Value) -> Self {
        if let Value::Object(map) = style {
            self.style = map;
        }
        self
    }
}

/// Content block inside a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModule", into = "RawModule")]
pub struct Module {
    pub descriptor: Descriptor,
    /// Module-level keys other than `type` and `descriptor`
    pub extra: Map<String, Value>,
}

/// Type-specific module payload
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Paragraph(ParagraphDescriptor),
    Image(ImageDescriptor),
    Button(ButtonDescriptor),
    /// Module types this crate does not model, carried verbatim
    Other { module_type: String, raw: Value },
}

impl Descriptor {
    /// Wire name of the module type
    pub fn module_type(&self) -> &str {
        match self {
            Descriptor::Paragraph(_) => PARAGRAPH_MODULE,
            Descriptor::Image(_) => IMAGE_MODULE,
            Descriptor::Button(_) => BUTTON_MODULE,
            Descriptor::Other { module_type, .. } => module_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParagraphDescriptor {
    pub paragraph: Paragraph,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub html: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub image: Image,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ButtonDescriptor {
    pub button: Button,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Button {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Module {
    fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            extra: Map::new(),
        }
    }

    /// Paragraph module with raw HTML content
    pub fn paragraph(html: impl Into<String>) -> Self {
        Self::new(Descriptor::Paragraph(ParagraphDescriptor {
            paragraph: Paragraph {
                html: html.into(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }))
    }

    /// Linked image module opening in a new tab
    pub fn image(src: impl Into<String>, href: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(Descriptor::Image(ImageDescriptor {
            image: Image {
                src: src.into(),
                href: Some(href.into()),
                target: Some("_blank".to_string()),
                alt: Some(alt.into()),
                extra: Map::new(),
            },
            extra: Map::new(),
        }))
    }

    /// Button module
    pub fn button(text: impl Into<String>, href: impl Into<String>, target: Option<&str>) -> Self {
        Self::new(Descriptor::Button(ButtonDescriptor {
            button: Button {
                text: Some(text.into()),
                link: Some(Link {
                    href: href.into(),
                    target: target.map(str::to_string),
                    extra: Map::new(),
                }),
                extra: Map::new(),
            },
            extra: Map::new(),
        }))
    }

    /// Merge extra keys into the descriptor (e.g. a `style` block)
    pub fn with_descriptor_extra(mut self, key: &str, value: Value) -> Self {
        match &mut self.descriptor {
            Descriptor::Paragraph(d) => {
                d.extra.insert(key.to_string(), value);
            }
            Descriptor::Image(d) => {
                d.extra.insert(key.to_string(), value);
            }
            Descriptor::Button(d) => {
                d.extra.insert(key.to_string(), value);
            }
            Descriptor::Other { raw, .. } => {
                if let Value::Object(map) = raw {
                    map.insert(key.to_string(), value);
                }
            }
        }
        self
    }

    /// Wire name of the module type
    pub fn module_type(&self) -> &str {
        self.descriptor.module_type()
    }
}

/// Wire shape of a module: `{ "type": ..., "descriptor": ..., ... }`
#[derive(Serialize, Deserialize)]
struct RawModule {
    #[serde(rename = "type")]
    module_type: String,
    #[serde(default)]
    descriptor: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawModule> for Module {
    type Error = String;

    fn try_from(raw: RawModule) -> Result<Self, Self::Error> {
        let invalid = |e: serde_json::Error| format!("invalid {} descriptor: {}", raw.module_type, e);
        let descriptor = match raw.module_type.as_str() {
            PARAGRAPH_MODULE => {
                Descriptor::Paragraph(serde_json::from_value(raw.descriptor.clone()).map_err(invalid)?)
            }
            IMAGE_MODULE => {
                Descriptor::Image(serde_json::from_value(raw.descriptor.clone()).map_err(invalid)?)
            }
            BUTTON_MODULE => {
                Descriptor::Button(serde_json::from_value(raw.descriptor.clone()).map_err(invalid)?)
            }
            _ => Descriptor::Other {
                module_type: raw.module_type.clone(),
                raw: raw.descriptor.clone(),
            },
        };

        Ok(Module {
            descriptor,
            extra: raw.extra,
        })
    }
}

impl From<Module> for RawModule {
    fn from(module: Module) -> Self {
        let module_type = module.module_type().to_string();
        // Serializing plain structs and maps into a Value cannot fail.
        let descriptor = match module.descriptor {
            Descriptor::Paragraph(d) => serde_json::to_value(d).unwrap_or(Value::Null),
            Descriptor::Image(d) => serde_json::to_value(d).unwrap_or(Value::Null),
            Descriptor::Button(d) => serde_json::to_value(d).unwrap_or(Value::Null),
            Descriptor::Other { raw, .. } => raw,
        };

        RawModule {
            module_type,
            descriptor,
            extra: module.extra,
        }
    }
}
