//! SPIRAL storage layer.
//!
//! All state is process-local: a [`Store`] owns one table per entity, each
//! behind its own `tokio::sync::RwLock`. Repositories in [`repositories`]
//! take `&Store` the way SQL repositories take a pool.

pub mod models;
pub mod repositories;
pub mod seed;
mod store;

pub use store::Store;

/// Handle type shared through application state.
pub type DbPool = Store;

/// Create an empty store.
pub fn create_store() -> DbPool {
    Store::default()
}

/// Verify every table can be locked for reading.
pub async fn health_check(store: &DbPool) -> Result<(), spiral_core::error::CoreError> {
    store.ping().await
}
