//! Demo customer scenarios used to preview personalized content

use serde::{Deserialize, Serialize};

use crate::error::{ComposerError, Result};

/// Identifiers of every built-in scenario
pub const SCENARIO_IDS: &[&str] = &["green", "yellow", "recommendations"];

/// A named fixture bundling a sample customer and related data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerScenario {
    pub stream: String,
    pub customer: Customer,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
}

/// Sample customer profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub favorite_color: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abandoned_cart: Vec<CartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vip: Option<bool>,
}

/// Item left in an abandoned cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_name: String,
    pub price: f64,
    pub quantity: u32,
    pub image: String,
    pub product_url: String,
}

/// Recommended product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: f64,
    pub image: String,
    pub url: String,
}

fn cart_item(product_name: &str, price: f64, quantity: u32, image: &str, product_url: &str) -> CartItem {
    CartItem {
        product_name: product_name.to_string(),
        price,
        quantity,
        image: image.to_string(),
        product_url: product_url.to_string(),
    }
}

fn product(title: &str, price: f64, image: &str, url: &str) -> Product {
    Product {
        title: title.to_string(),
        price,
        image: image.to_string(),
        url: url.to_string(),
    }
}

fn customer(email: &str, first_name: &str, last_name: &str, favorite_color: &str) -> Customer {
    Customer {
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        favorite_color: favorite_color.to_string(),
        abandoned_cart: Vec::new(),
        is_vip: None,
    }
}

/// Look up a scenario by id
pub fn scenario(id: &str) -> Result<CustomerScenario> {
    let scenario = match id {
        "green" => CustomerScenario {
            stream: "green".to_string(),
            customer: Customer {
                abandoned_cart: vec![
                    cart_item(
                        "Green t-shirt",
                        19.99,
                        1,
                        "https://media.istockphoto.com/id/1346570499/photo/smiling-climate-activists-in-public-park.jpg?s=612x612&w=0&k=20&c=5RLd1Dr-zPsSzqn4eZX1rOeqQcstlrJW0cIlYMsCKRo=",
                        "https://www.target.com/s/green+t+shirt",
                    ),
                    cart_item(
                        "Green shorts",
                        29.99,
                        2,
                        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcSqrblpnHi7gldR9rjWB5-GfJNAi_VFsueGdQ&s",
                        "https://www.target.com/s?searchTerm=green+shorts",
                    ),
                ],
                ..customer("greenlover@example.com", "Casey", "Green", "green")
            },
            products: Vec::new(),
        },
        "yellow" => CustomerScenario {
            stream: "yellow".to_string(),
            customer: Customer {
                abandoned_cart: vec![
                    cart_item(
                        "Yellow t-shirt",
                        19.99,
                        1,
                        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcT3VM83dh9a-yuMH5-yu8jeQZK6-nHGAI2bKg&s=",
                        "https://www.target.com/s/yellow+shirt",
                    ),
                    cart_item(
                        "Yellow shorts",
                        29.99,
                        2,
                        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQCEiM412YUpO0mou51izxter00hOoF9Cs2e0kKjJSCSVMdiLNEYbI-5h15OPznoANBd3A&usqp=CAU",
                        "https://www.target.com/s/mens+yellow+shorts",
                    ),
                ],
                ..customer("yellowfan@example.com", "Jordan", "Yellow", "yellow")
            },
            products: Vec::new(),
        },
        "recommendations" => CustomerScenario {
            stream: "recommendations".to_string(),
            customer: Customer {
                is_vip: Some(true),
                ..customer("shopper@example.com", "Alex", "Shopper", "yellow")
            },
            products: vec![
                product(
                    "Eco Hoodie",
                    49.0,
                    "https://images.unsplash.com/photo-1521572267360-ee0c2909d518",
                    "https://example.com/p/eco-hoodie",
                ),
                product(
                    "Organic Tee",
                    19.0,
                    "https://images.unsplash.com/photo-1512436991641-6745cdb1723f",
                    "https://example.com/p/organic-tee",
                ),
                product(
                    "Canvas Tote",
                    15.0,
                    "https://images.unsplash.com/photo-1541099649105-f69ad21f3246",
                    "https://example.com/p/canvas-tote",
                ),
            ],
        },
        _ => return Err(ComposerError::not_found(id)),
    };

    Ok(scenario)
}
