use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// Product catalog and inventory routes.
///
/// ```text
/// GET    /products              list (?category, search, limit, offset)
/// POST   /products              create
/// GET    /products/{id}         get
/// PUT    /products/{id}         replace
/// DELETE /products/{id}         delete
/// POST   /upload-csv            multipart inventory import
/// GET    /inventory/stats       stock figures
/// GET    /inventory/template    CSV template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::delete),
        )
        // The handler enforces the configured upload limit while streaming.
        .route(
            "/upload-csv",
            post(products::upload_csv).layer(DefaultBodyLimit::disable()),
        )
        .route("/inventory/stats", get(products::stats))
        .route("/inventory/template", get(products::template))
}
