use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::money::validate_money;

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image_url: String,
    pub in_stock: i32,
}

/// Payload for creating a new product. Doubles as the `POST /api/products` body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(custom(function = "validate_money"))]
    pub price: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 2048))]
    pub image_url: String,
    #[serde(default = "default_in_stock")]
    #[validate(range(min = 0))]
    pub in_stock: i32,
}

fn default_in_stock() -> i32 {
    1
}
