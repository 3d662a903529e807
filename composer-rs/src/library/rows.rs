//! Reusable personalization row fragments
//!
//! Each fragment is a list of rows the editor can drop into a design, or the
//! composer can splice into a base template.

use serde_json::{json, Map, Value};

use crate::error::{ComposerError, Result};
use crate::template::{Column, DisplayCondition, Module, Row};

/// Identifiers of every built-in row fragment
pub const ROW_FRAGMENT_IDS: &[&str] = &[
    "product-loop",
    "display-or-hide",
    "mixed-examples",
    "recommendations",
];

/// Look up a row fragment by id
pub fn row_fragment(id: &str) -> Result<Vec<Row>> {
    match id {
        "product-loop" => Ok(vec![product_loop_row()]),
        "display-or-hide" => Ok(vec![favorite_color_row()]),
        "mixed-examples" => Ok(vec![yellow_cta_row()]),
        "recommendations" => Ok(vec![vip_greeting_row(), recommendations_loop_row()]),
        _ => Err(ComposerError::not_found(id)),
    }
}

fn product_loop_row() -> Row {
    Row::named("Product Loop Row")
        .with_condition(DisplayCondition::personalization(
            "Product loop",
            "Iterate items in customer.abandoned_cart",
            "{% for item in customer.abandoned_cart %}",
            "{% endfor %}",
        ))
        .with_column(Column::full_width(vec![
            Module::paragraph(
                "<p><strong>{{ item.product_name }}</strong><br/>Price: {{ item.price | money }}<br/>Qty: {{ item.quantity }}</p>",
            ),
            Module::image("{{ item.image }}", "{{ item.product_url }}", "Product image"),
            Module::button("Buy now", "{{ item.product_url }}", Some("_blank")),
        ]))
}

fn favorite_color_row() -> Row {
    Row::named("Display if Favorite Color")
        .with_condition(DisplayCondition::personalization(
            "Display or hide",
            "Display when customer.favorite_color matches",
            "{% if customer.favorite_color == 'green' %}",
            "{% endif %}",
        ))
        .with_column(Column::full_width(vec![Module::paragraph(
            "<p>Hi {{ customer.first_name }}, green deals just for you!</p>",
        )]))
}

fn yellow_cta_row() -> Row {
    Row::named("Headline + CTA (Conditional)")
        .with_condition(DisplayCondition::personalization(
            "Display or hide",
            "Show CTA to yellow lovers",
            "{% if customer.favorite_color == 'yellow' %}",
            "{% endif %}",
        ))
        .with_column(Column::full_width(vec![
            Module::paragraph("<h3 style=\"text-align:center\">Yellow Collection Picks</h3>"),
            Module::button("Shop now", "https://example.com/yellow", None),
        ]))
}

/// Container and content styling shared by the full-template rows
fn white_band() -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert(
        "container".to_string(),
        json!({ "style": { "background-color": "#FFFFFF" } }),
    );
    extra.insert(
        "content".to_string(),
        json!({ "style": { "background-color": "transparent", "color": "#000000" } }),
    );
    extra
}

fn vip_greeting_row() -> Row {
    let column = Column::full_width(vec![
        Module::paragraph(
            "<p style=\"text-align:center\">Hi {{ customer.first_name }}, we picked these for you.</p>",
        ),
        Module::paragraph(
            "<p style=\"text-align:center;color:#FBB51B\"><strong>VIP early access</strong></p>",
        ),
    ])
    .with_style(json!({
        "background-color": "#FFFFFF",
        "padding-top": "20px",
        "padding-bottom": "10px"
    }))
    .with_condition(DisplayCondition::personalization(
        "Display or hide",
        "VIP only",
        "{% if customer.is_vip %}",
        "{% endif %}",
    ));

    Row {
        name: Some("VIP Greeting".to_string()),
        columns: vec![column],
        extra: white_band(),
        ..Row::default()
    }
}

fn recommendations_loop_row() -> Row {
    let column = Column::full_width(vec![
        Module::paragraph("<h2 style=\"text-align:center\">Recommended for you</h2>"),
        Module::image("{{ product.image }}", "{{ product.url }}", "Product").with_descriptor_extra(
            "style",
            json!({ "padding-top": "10px", "padding-bottom": "10px" }),
        ),
        Module::paragraph(
            "<p style=\"text-align:center\"><strong>{{ product.title }}</strong><br/>{{ product.price | money }}</p>",
        ),
        Module::button("Shop now", "{{ product.url }}", Some("_blank")),
    ])
    .with_style(json!({
        "background-color": "#FFFFFF",
        "padding-top": "10px",
        "padding-bottom": "10px"
    }))
    .with_condition(DisplayCondition::personalization(
        "Product loop",
        "Loop products",
        "{% for product in products %}",
        "{% endfor %}",
    ));

    Row {
        name: Some("Recommendations Loop".to_string()),
        columns: vec![column],
        extra: white_band(),
        ..Row::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::validate_rows;

    #[test]
    fn test_every_fragment_has_paired_directives() {
        for id in ROW_FRAGMENT_IDS {
            let rows = row_fragment(id).unwrap();
            assert!(!rows.is_empty(), "fragment {} is empty", id);
            assert!(validate_rows(&rows).is_ok(), "fragment {} is malformed", id);

            for row in &rows {
                let conditions = row
                    .display_condition
                    .iter()
                    .chain(row.columns.iter().filter_map(|c| c.display_condition.as_ref()));
                for condition in conditions {
                    assert!(!condition.before.is_empty());
                    assert!(!condition.after.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_fragments_are_deterministic() {
        assert_eq!(
            row_fragment("product-loop").unwrap(),
            row_fragment("product-loop").unwrap()
        );
    }

    #[test]
    fn test_product_loop_wire_shape() {
        let value = serde_json::to_value(row_fragment("product-loop").unwrap()).unwrap();
        let row = &value[0];
        assert_eq!(row["name"], "Product Loop Row");
        assert_eq!(row["display-condition"]["before"], "{% for item in customer.abandoned_cart %}");
        assert_eq!(row["columns"][0]["grid-columns"], 12);
        assert_eq!(row["columns"][0]["modules"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_fragment() {
        assert!(matches!(
            row_fragment("nope"),
            Err(ComposerError::NotFound { .. })
        ));
    }
}
