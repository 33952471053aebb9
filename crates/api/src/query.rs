//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?limit=` for listings that are only capped, not paged.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
