//! Template composition
//!
//! Splices personalization rows into a base template between its frame
//! rows (header and footer). The base is never touched: the output is an
//! owned structural copy.

use tracing::{debug, warn};

use crate::error::{ComposerError, Result};
use crate::template::types::{Row, TemplateDocument};

/// Number of base rows kept at each end of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRules {
    /// Rows kept from the top of the base (e.g. hero/header)
    pub leading: usize,
    /// Rows kept from the bottom of the base (e.g. footer)
    pub trailing: usize,
}

impl Default for FrameRules {
    fn default() -> Self {
        Self {
            leading: 1,
            trailing: 1,
        }
    }
}

/// Caller-controlled metadata for a composed document
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub frame: FrameRules,
}

impl ComposeOptions {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            frame: FrameRules::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_frame(mut self, frame: FrameRules) -> Self {
        self.frame = frame;
        self
    }
}

/// Check that every directive in `rows` has both markers.
///
/// Column directives are reported against the row that contains them.
/// Column widths must each span 1 to 12 grid columns.
pub fn validate_rows(rows: &[Row]) -> Result<()> {
    for (index, row) in rows.iter().enumerate() {
        let row_paired = row
            .display_condition
            .as_ref()
            .map_or(true, |condition| condition.is_paired());
        let columns_paired = row.columns.iter().all(|column| {
            column
                .display_condition
                .as_ref()
                .map_or(true, |condition| condition.is_paired())
        });

        if !row_paired || !columns_paired {
            return Err(ComposerError::MalformedDirective {
                row_name: row.label(index),
            });
        }

        if let Some(column) = row
            .columns
            .iter()
            .find(|column| !(1..=12).contains(&column.grid_columns))
        {
            return Err(ComposerError::Validation(format!(
                "Row '{}' has a column spanning {} grid columns, expected 1 to 12",
                row.label(index),
                column.grid_columns
            )));
        }

        let total = row.grid_total();
        if !row.columns.is_empty() && total != 12 {
            warn!(
                "Row '{}' column widths sum to {} instead of 12",
                row.label(index),
                total
            );
        }
    }

    Ok(())
}

/// Build a new document from `base` with `injected` rows between its frames.
pub fn compose(
    base: &TemplateDocument,
    injected: &[Row],
    options: &ComposeOptions,
) -> Result<TemplateDocument> {
    validate_rows(injected)?;

    let mut document = base.clone();
    let mut base_rows = std::mem::take(&mut document.page.rows);

    let total = base_rows.len();
    let leading = options.frame.leading.min(total);
    let trailing = options.frame.trailing.min(total - leading);

    let footer = base_rows.split_off(total - trailing);
    base_rows.truncate(leading);

    debug!(
        "Composing '{}': {} header rows, {} injected rows, {} footer rows",
        options.title,
        base_rows.len(),
        injected.len(),
        footer.len()
    );

    let mut rows = base_rows;
    rows.extend(injected.iter().cloned());
    rows.extend(footer);

    document.page.rows = rows;
    document.page.title = options.title.clone();
    document.page.template.version = options.version.clone();
    if let Some(description) = &options.description {
        document.page.description = Some(description.clone());
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::types::{Column, DisplayCondition, Module, Page};
    use serde_json::Map;

    fn base_template() -> TemplateDocument {
        TemplateDocument {
            page: Page {
                rows: vec![
                    Row::named("header").with_column(Column::full_width(vec![Module::paragraph("<h1>Shop</h1>")])),
                    Row::named("body").with_column(Column::full_width(vec![Module::paragraph("<p>old body</p>")])),
                    Row::named("footer").with_column(Column::full_width(vec![Module::paragraph("<p>bye</p>")])),
                ],
                title: "Base".to_string(),
                ..Page::default()
            },
            comments: Map::new(),
        }
    }

    fn loop_row(name: &str) -> Row {
        Row::named(name)
            .with_condition(DisplayCondition::personalization(
                "Product loop",
                "Loop products",
                "{% for product in products %}",
                "{% endfor %}",
            ))
            .with_column(Column::full_width(vec![Module::paragraph("{{ product.title }}")]))
    }

    fn names(doc: &TemplateDocument) -> Vec<String> {
        doc.page
            .rows
            .iter()
            .map(|r| r.name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_splices_between_frames_in_order() {
        let base = base_template();
        let options = ComposeOptions::new("Product Recommendations", "2.0.0");
        let doc = compose(&base, &[loop_row("a"), loop_row("b")], &options).unwrap();

        assert_eq!(names(&doc), vec!["header", "a", "b", "footer"]);
        assert_eq!(doc.page.title, "Product Recommendations");
        assert_eq!(doc.page.template.version, "2.0.0");
    }

    #[test]
    fn test_output_is_independent_of_base() {
        let base = base_template();
        let snapshot = base.clone();
        let mut doc = compose(&base, &[loop_row("a")], &ComposeOptions::new("T", "2.0.0")).unwrap();

        doc.page.rows[0].name = Some("changed".to_string());
        doc.page.rows[0].columns.clear();
        doc.page.title.push_str(" edited");

        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_unpaired_row_directive_is_rejected() {
        let mut row = loop_row("Broken Loop");
        row.display_condition.as_mut().unwrap().after.clear();

        let err = compose(&base_template(), &[row], &ComposeOptions::new("T", "2.0.0")).unwrap_err();
        assert!(matches!(err, ComposerError::MalformedDirective { ref row_name } if row_name == "Broken Loop"));
    }

    #[test]
    fn test_unpaired_column_directive_names_unnamed_row() {
        let row = Row::default().with_column(
            Column::full_width(vec![]).with_condition(DisplayCondition::personalization(
                "VIP",
                "VIP only",
                "",
                "{% endif %}",
            )),
        );

        let err = compose(&base_template(), &[loop_row("ok"), row], &ComposeOptions::new("T", "2.0.0"))
            .unwrap_err();
        assert!(matches!(err, ComposerError::MalformedDirective { ref row_name } if row_name == "row 1"));
    }

    #[test]
    fn test_short_base_frames_do_not_duplicate_rows() {
        let mut base = base_template();
        base.page.rows.truncate(1);

        let doc = compose(&base, &[loop_row("a")], &ComposeOptions::new("T", "2.0.0")).unwrap();
        assert_eq!(names(&doc), vec!["header", "a"]);
    }

    #[test]
    fn test_custom_frame_rules() {
        let options = ComposeOptions::new("T", "2.0.0").with_frame(FrameRules {
            leading: 2,
            trailing: 0,
        });
        let doc = compose(&base_template(), &[loop_row("a")], &options).unwrap();
        assert_eq!(names(&doc), vec!["header", "body", "a"]);
    }

    #[test]
    fn test_uneven_grid_is_permitted() {
        let row = Row::named("narrow").with_column(Column::with_width(6, vec![]));
        assert!(validate_rows(&[row]).is_ok());
    }

    #[test]
    fn test_out_of_range_width_is_rejected() {
        for width in [0, 13] {
            let row = Row::named("broken").with_column(Column::with_width(width, vec![]));
            match validate_rows(&[row]) {
                Err(ComposerError::Validation(message)) => assert!(message.contains("'broken'")),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }
}
