//! Retailer product entity and list query.

use serde::{Deserialize, Serialize};
use spiral_core::inventory::ProductInput;
use spiral_core::types::{DbId, Timestamp};

/// A product in the shared catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub variants: Vec<String>,
    pub discount: Option<f64>,
    pub image_url: String,
    pub category: String,
    pub sku: String,
    pub description: String,
    /// Time of the last create or update.
    pub timestamp: Timestamp,
}

impl Product {
    pub(crate) fn from_input(id: DbId, input: ProductInput, timestamp: Timestamp) -> Self {
        Self {
            id,
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            variants: input.variants,
            discount: input.discount,
            image_url: input.image_url,
            category: input.category,
            sku: input.sku,
            description: input.description,
            timestamp,
        }
    }
}

/// DTO for creating a product. Shares its rules with CSV rows.
pub type CreateProduct = ProductInput;

/// DTO for replacing a product's fields.
pub type UpdateProduct = ProductInput;

/// Query parameters for `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Exact category, case-insensitive. `all` disables the filter.
    pub category: Option<String>,
    /// Case-insensitive substring over name, description and category.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
