//! SPIRAL API server library.
//!
//! Exposes config, state, error handling, routes and background services so
//! the integration tests and the binary entrypoint share them.

pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
