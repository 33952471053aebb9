//! Long-running background tasks spawned by the binary.

pub mod campaign_launcher;
