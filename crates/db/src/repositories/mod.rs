//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&Store` as the first argument. A method takes each table lock at
//! most once, so every call is atomic with respect to other callers.

pub mod audit_repo;
pub mod business_profile_repo;
pub mod campaign_repo;
pub mod mall_event_repo;
pub mod product_repo;
pub mod test_run_repo;
pub mod wallet_repo;

pub use audit_repo::AuditRepo;
pub use business_profile_repo::BusinessProfileRepo;
pub use campaign_repo::CampaignRepo;
pub use mall_event_repo::MallEventRepo;
pub use product_repo::ProductRepo;
pub use test_run_repo::TestRunRepo;
pub use wallet_repo::WalletRepo;

/// Default page size for list queries.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize
}

/// Negative offsets are treated as zero.
pub fn clamp_offset(offset: Option<i64>) -> usize {
    offset.unwrap_or(0).max(0) as usize
}
