//! Personalization: placeholder substitution and editor catalogs

pub mod catalog;
pub mod substitution;

pub use catalog::{
    display_conditions, merge_tags, special_links, EditorSettings, ExternalContentUrl,
    MergeTagEntry, SpecialLink,
};
pub use substitution::{substitute, Replacements};
