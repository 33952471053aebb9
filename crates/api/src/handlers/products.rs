//! Handlers for the product catalog and inventory import.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use spiral_core::error::CoreError;
use spiral_core::inventory::{parse_inventory_csv, InventoryStats, CSV_TEMPLATE};
use spiral_core::types::DbId;
use spiral_db::models::product::{CreateProduct, Product, ProductQuery, UpdateProduct};
use spiral_db::repositories::ProductRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Multipart field carrying the inventory file.
const CSV_FIELD: &str = "csv";

/// GET /api/products
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(ProductRepo::list(&state.pool, &query).await))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Product>> {
    let product = ProductRepo::find_by_id(&state.pool, id)
        .await
        .ok_or(AppError::Core(CoreError::not_found("Product", id)))?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    input.validate()?;
    let product = ProductRepo::create(&state.pool, input).await;
    tracing::info!(product_id = product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProduct>,
) -> AppResult<Json<Product>> {
    input.validate()?;
    let product = ProductRepo::update(&state.pool, id, input)
        .await
        .ok_or(AppError::Core(CoreError::not_found("Product", id)))?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Product>> {
    let product = ProductRepo::delete(&state.pool, id)
        .await
        .ok_or(AppError::Core(CoreError::not_found("Product", id)))?;
    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(product))
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStats {
    pub total_rows: usize,
    pub successful_uploads: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub products: Vec<Product>,
    pub stats: UploadStats,
}

/// POST /api/upload-csv
///
/// Valid rows are imported and malformed rows reported; nothing is rolled
/// back.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let limit = state.config.upload_max_bytes;
    let mut file = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(CSV_FIELD) {
            continue;
        }

        let named_csv = field
            .file_name()
            .is_some_and(|n| n.to_ascii_lowercase().ends_with(".csv"));
        let typed_csv = field.content_type().is_some_and(|ct| ct.contains("csv"));
        if !named_csv && !typed_csv {
            return Err(AppError::BadRequest("Only CSV files are allowed".into()));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::BadRequest(format!(
                    "File exceeds the {limit} byte upload limit"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        file = Some(bytes);
        break;
    }

    let bytes = file.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    let import = parse_inventory_csv(&bytes);
    let products = ProductRepo::create_many(&state.pool, import.products).await;

    tracing::info!(
        total_rows = import.total_rows,
        imported = products.len(),
        rejected = import.errors.len(),
        "Inventory upload processed"
    );

    Ok(Json(UploadResponse {
        message: format!(
            "Inventory upload completed: {}/{} products processed successfully",
            products.len(),
            import.total_rows
        ),
        stats: UploadStats {
            total_rows: import.total_rows,
            successful_uploads: products.len(),
            errors: import.errors,
        },
        products,
    }))
}

/// GET /api/inventory/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<InventoryStats>> {
    Ok(Json(ProductRepo::stats(&state.pool).await))
}

/// GET /api/inventory/template
pub async fn template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory-template.csv\"",
            ),
        ],
        CSV_TEMPLATE,
    )
}
