//! Retailer inventory: product input validation, CSV import, stock stats.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::validation::{field_errors, invalid};

/// Products with fewer units than this count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Largest inventory file accepted by the upload endpoint.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Downloadable template offered to retailers before their first import.
pub const CSV_TEMPLATE: &str = "\
name,price,quantity,variants,discount,imageUrl,category,sku,description
\"Premium Coffee Beans\",24.99,150,\"Dark Roast,Medium Roast,Light Roast\",10,https://example.com/images/coffee.jpg,Food & Beverage,COF001,\"Premium arabica coffee beans\"
\"Wireless Headphones\",89.99,75,\"Black,White\",15,,Electronics,ELE001,\"Noise-cancelling wireless headphones\"
";

/// Fields a retailer supplies for a product, via form or CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price must be non-negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Quantity must be a non-negative integer"))]
    pub quantity: i64,
    #[serde(default)]
    pub variants: Vec<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount: Option<f64>,
    #[serde(default)]
    #[validate(custom(function = "validate_image_url"))]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub description: String,
}

/// Image URLs are optional; when present they must be an absolute URL or a
/// path served by the platform.
pub fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.starts_with('/') || value.validate_url() {
        Ok(())
    } else {
        Err(invalid("url", "Image URL must be a valid URL"))
    }
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

/// Outcome of parsing an inventory file. Valid rows are returned for import;
/// each invalid row contributes exactly one entry to `errors`.
#[derive(Debug, Default)]
pub struct CsvImport {
    /// Data rows seen (header excluded).
    pub total_rows: usize,
    pub products: Vec<ProductInput>,
    pub errors: Vec<String>,
}

/// Column lookup keyed by lowercased header name.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.trim().to_lowercase(), idx))
                .collect(),
        )
    }

    /// First non-empty cell among the given header aliases.
    fn cell<'r>(&self, record: &'r csv::StringRecord, aliases: &[&str]) -> &'r str {
        aliases
            .iter()
            .filter_map(|alias| self.0.get(*alias))
            .filter_map(|idx| record.get(*idx))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }
}

/// Parse an inventory CSV.
///
/// The first record is the header; column names are matched
/// case-insensitively. Row numbers in error messages count the header as
/// row 1, so the first data row is "Row 2".
pub fn parse_inventory_csv(bytes: &[u8]) -> CsvImport {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns = match reader.headers() {
        Ok(headers) => Columns::new(headers),
        Err(_) => {
            return CsvImport {
                errors: vec![
                    "Failed to parse file. Please ensure it's a valid CSV file.".to_string(),
                ],
                ..CsvImport::default()
            };
        }
    };

    let mut import = CsvImport::default();
    for (idx, record) in reader.records().enumerate() {
        import.total_rows += 1;
        let row_number = idx + 2;

        let outcome = match record {
            Ok(record) => parse_row(&columns, &record),
            Err(_) => Err(vec!["Invalid data format".to_string()]),
        };

        match outcome {
            Ok(product) => import.products.push(product),
            Err(messages) => import
                .errors
                .push(format!("Row {row_number}: {}", messages.join(", "))),
        }
    }
    import
}

fn parse_row(columns: &Columns, record: &csv::StringRecord) -> Result<ProductInput, Vec<String>> {
    let mut problems = Vec::new();

    let price = match columns.cell(record, &["price"]) {
        "" => 0.0,
        raw => raw.parse::<f64>().ok().filter(|p| p.is_finite()).unwrap_or_else(|| {
            problems.push("Price must be a number".to_string());
            0.0
        }),
    };

    let quantity = match columns.cell(record, &["quantity", "qty"]) {
        "" => 0,
        raw => raw.parse::<i64>().unwrap_or_else(|_| {
            problems.push("Quantity must be a whole number".to_string());
            0
        }),
    };

    let discount = match columns.cell(record, &["discount"]) {
        "" => None,
        raw => match raw.trim_end_matches('%').parse::<f64>() {
            Ok(d) if d.is_finite() => Some(d),
            _ => {
                problems.push("Discount must be a number".to_string());
                None
            }
        },
    };

    let variants = columns
        .cell(record, &["variants"])
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    let product = ProductInput {
        name: columns.cell(record, &["name"]).to_string(),
        price,
        quantity,
        variants,
        discount,
        image_url: columns
            .cell(record, &["imageurl", "image_url"])
            .to_string(),
        category: columns.cell(record, &["category"]).to_string(),
        sku: columns.cell(record, &["sku"]).to_string(),
        description: columns.cell(record, &["description"]).to_string(),
    };

    if let Err(errors) = product.validate() {
        problems.extend(field_errors(&errors).into_iter().map(|e| e.message));
    }

    if problems.is_empty() {
        Ok(product)
    } else {
        Err(problems)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregate stock figures for the retailer dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: usize,
    pub total_value: f64,
    pub low_stock_products: usize,
    pub out_of_stock_products: usize,
    pub categories: usize,
    pub average_price: f64,
}

impl InventoryStats {
    /// Compute stats over `(price, quantity, category)` triples.
    ///
    /// `average_price` is the mean stock value per product, matching the
    /// dashboard's historical definition.
    pub fn compute<'a>(items: impl IntoIterator<Item = (f64, i64, &'a str)>) -> Self {
        let mut total_products = 0;
        let mut total_value = 0.0;
        let mut low_stock_products = 0;
        let mut out_of_stock_products = 0;
        let mut categories = HashSet::new();

        for (price, quantity, category) in items {
            total_products += 1;
            total_value += price * quantity as f64;
            if quantity < LOW_STOCK_THRESHOLD {
                low_stock_products += 1;
            }
            if quantity == 0 {
                out_of_stock_products += 1;
            }
            if !category.is_empty() {
                categories.insert(category);
            }
        }

        let average_price = if total_products > 0 {
            total_value / total_products as f64
        } else {
            0.0
        };

        Self {
            total_products,
            total_value,
            low_stock_products,
            out_of_stock_products,
            categories: categories.len(),
            average_price,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
