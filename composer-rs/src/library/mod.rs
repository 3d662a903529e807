//! Row and scenario library
//!
//! Read-only catalog of demo customer scenarios, personalization row
//! fragments and named templates. Every lookup builds a fresh value, so
//! callers own what they get and identical ids give identical results.

pub mod rows;
pub mod scenarios;
pub mod templates;

pub use rows::{row_fragment, ROW_FRAGMENT_IDS};
pub use scenarios::{scenario, CartItem, Customer, CustomerScenario, Product, SCENARIO_IDS};
pub use templates::{builtin_base, load_base, named_template, TEMPLATE_IDS};

use crate::config::LibraryConfig;
use crate::error::Result;
use crate::template::{Row, TemplateDocument};

/// Catalog facade holding the base frame template
#[derive(Debug, Clone)]
pub struct Library {
    base: TemplateDocument,
}

impl Library {
    /// Create a library around an explicit base template
    pub fn new(base: TemplateDocument) -> Self {
        Self { base }
    }

    /// Create a library from configuration, loading the base template file if set
    pub fn from_config(config: &LibraryConfig) -> Result<Self> {
        let base = match &config.base_template_path {
            Some(path) => load_base(path)?,
            None => builtin_base(),
        };
        Ok(Self::new(base))
    }

    /// Look up a customer scenario
    pub fn scenario(&self, id: &str) -> Result<CustomerScenario> {
        scenario(id)
    }

    /// Look up a row fragment
    pub fn row_fragment(&self, id: &str) -> Result<Vec<Row>> {
        row_fragment(id)
    }

    /// Compose a named template on top of the base frame
    pub fn template(&self, id: &str) -> Result<TemplateDocument> {
        named_template(&self.base, id)
    }

    /// Base frame template
    pub fn base(&self) -> &TemplateDocument {
        &self.base
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(builtin_base())
    }
}
