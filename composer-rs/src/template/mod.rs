//! Template document model
//!
//! Typed rows, columns and modules plus the composition rules used to
//! splice personalization rows into a base template.

pub mod composer;
pub mod types;

pub use composer::{compose, validate_rows, ComposeOptions, FrameRules};
pub use types::{
    Column, Descriptor, DisplayCondition, Module, Page, Row, TemplateDocument, TemplateVersion,
    BUTTON_MODULE, IMAGE_MODULE, PARAGRAPH_MODULE, PERSONALIZATION_KIND,
};
