//! Admin key extractor.
//!
//! When `ADMIN_API_KEY` is configured, admin handlers require a matching
//! `x-admin-key` header. Without a configured key the extractor admits
//! every request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use spiral_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Rejects with 403 Forbidden unless the admin key matches.
///
/// ```ignore
/// async fn unlock(_admin: RequireAdmin, State(state): State<AppState>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_key.as_deref() else {
            return Ok(RequireAdmin);
        };

        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(key) if key == expected => Ok(RequireAdmin),
            Some(_) => Err(AppError::Core(CoreError::Forbidden(
                "Invalid admin key".into(),
            ))),
            None => Err(AppError::Core(CoreError::Forbidden(
                "Admin key required".into(),
            ))),
        }
    }
}
