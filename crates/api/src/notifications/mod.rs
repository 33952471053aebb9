//! Event-driven notification dispatch.

pub mod router;

pub use router::NotificationRouter;
