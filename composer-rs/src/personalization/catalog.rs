//! Static catalogs the editor is started with
//!
//! Merge tags, special links, display-condition use cases and rows
//! configuration. This is data for the editor's insertion UI only; nothing
//! here is substituted or evaluated.

use serde::Serialize;

use crate::template::{DisplayCondition, PERSONALIZATION_KIND};

/// Named placeholder token exposed to the editor's merge-tag menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeTagEntry {
    /// Label shown in the editor
    pub name: String,
    /// Token inserted into the design
    pub value: String,
}

/// Tokens whose display name is the token itself, so drag and drop shows
/// the exact Liquid syntax that lands in the design.
const MERGE_TAG_TOKENS: &[&str] = &[
    // Customer
    "{{ customer.first_name }}",
    "{{ customer.last_name }}",
    "{{ customer.email }}",
    "{{ customer.phone }}",
    "{{ customer.default_address.city }}",
    "{{ customer.default_address.country }}",
    "{{ customer.tags }}",
    "{{ customer.favorite_color }}",
    // Last order
    "{{ last_order.id }}",
    "{{ last_order.name }}",
    "{{ last_order.created_at }}",
    "{{ last_order.total_price | money }}",
    "{{ last_order.shipping_address.address1 }}",
    "{{ last_order.shipping_address.city }}",
    "{{ last_order.shipping_address.country }}",
    // Loop item
    "{{ item.product_name }}",
    "{{ item.title }}",
    "{{ item.price | money }}",
    "{{ item.image }}",
    "{{ item.quantity }}",
    "{{ item.product_url }}",
    // Recommendation loop
    "{{ product.title }}",
    "{{ product.price | money }}",
    "{{ product.image }}",
    "{{ product.url }}",
    // Shop and compliance
    "{{ shop.name }}",
    "{{ shop.url }}",
    "{{ 'now' | date: '%Y-%m-%d' }}",
    "{{ unsubscribe_url }}",
    "{{ preference_center_url }}",
];

/// The merge-tag catalog
pub fn merge_tags() -> Vec<MergeTagEntry> {
    MERGE_TAG_TOKENS
        .iter()
        .map(|token| MergeTagEntry {
            name: token.to_string(),
            value: token.to_string(),
        })
        .collect()
}

/// Special link offered in the editor's link menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub link: String,
}

pub fn special_links() -> Vec<SpecialLink> {
    [
        ("Unsubscribe link", "http://[unsubscribe]/"),
        ("Preference center link", "http://[preference_center]/"),
    ]
    .into_iter()
    .map(|(label, link)| SpecialLink {
        kind: "Frequently used".to_string(),
        label: label.to_string(),
        link: link.to_string(),
    })
    .collect()
}

/// Display-condition presets offered when a row's condition is edited
pub fn display_conditions() -> Vec<DisplayCondition> {
    vec![
        DisplayCondition::personalization(
            "Display if favorite color = green",
            "Show row only to customers who prefer green",
            "{% if customer.favorite_color == 'green' %}",
            "{% endif %}",
        ),
        DisplayCondition::personalization(
            "Display if favorite color = yellow",
            "Show row only to customers who prefer yellow",
            "{% if customer.favorite_color == 'yellow' %}",
            "{% endif %}",
        ),
        DisplayCondition::personalization(
            "Loop - Abandoned cart items",
            "Repeat row for each item in abandoned cart",
            "{% for item in customer.abandoned_cart %}",
            "{% endfor %}",
        ),
        DisplayCondition::personalization(
            "Loop - Recommendations",
            "Repeat row for each recommended product",
            "{% for product in products %}",
            "{% endfor %}",
        ),
        DisplayCondition::personalization(
            "Display if VIP",
            "Show row only for VIP customers",
            "{% if customer.is_vip %}",
            "{% endif %}",
        ),
    ]
}

/// External row source listed in the editor's rows panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalContentUrl {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsConfiguration {
    pub empty_rows: bool,
    pub default_rows: bool,
    pub selected_row_type: String,
    #[serde(rename = "externalContentURLs")]
    pub external_content_urls: Vec<ExternalContentUrl>,
}

/// Everything the editor needs from this service at start-up
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub merge_tags: Vec<MergeTagEntry>,
    pub special_links: Vec<SpecialLink>,
    pub display_conditions: Vec<DisplayCondition>,
    pub rows_configuration: RowsConfiguration,
}

impl EditorSettings {
    /// Assemble the settings, listing the given external row sources
    pub fn new(external_rows: Vec<ExternalContentUrl>) -> Self {
        Self {
            merge_tags: merge_tags(),
            special_links: special_links(),
            display_conditions: display_conditions(),
            rows_configuration: RowsConfiguration {
                empty_rows: true,
                default_rows: true,
                selected_row_type: format!("{} Rows", PERSONALIZATION_KIND),
                external_content_urls: external_rows,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_merge_tag_tokens_are_unique() {
        let tags = merge_tags();
        let unique: HashSet<_> = tags.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(unique.len(), tags.len());
        assert!(tags.iter().all(|t| !t.value.is_empty()));
    }

    #[test]
    fn test_display_conditions_are_paired() {
        assert!(display_conditions().iter().all(DisplayCondition::is_paired));
    }

    #[test]
    fn test_settings_wire_shape() {
        let settings = EditorSettings::new(vec![ExternalContentUrl {
            name: "Demo rows".to_string(),
            value: "http://localhost:3001/api/rows/product-loop".to_string(),
        }]);
        let value = serde_json::to_value(&settings).unwrap();

        assert_eq!(value["mergeTags"][0]["name"], "{{ customer.first_name }}");
        assert_eq!(value["specialLinks"][0]["type"], "Frequently used");
        assert_eq!(value["rowsConfiguration"]["selectedRowType"], "Personalization Rows");
        assert_eq!(
            value["rowsConfiguration"]["externalContentURLs"][0]["name"],
            "Demo rows"
        );
        assert_eq!(value["displayConditions"][4]["before"], "{% if customer.is_vip %}");
    }
}
