//! SPIRAL domain core.
//!
//! Pure business rules shared by the store, event and API crates: entity
//! enums, input validation, campaign gating, inventory CSV parsing, mall
//! event moderation, wallet arithmetic and smoke-test evaluation. Nothing in
//! here performs I/O.

pub mod business_profile;
pub mod campaign;
pub mod error;
pub mod inventory;
pub mod mall_event;
pub mod test_suite;
pub mod types;
pub mod validation;
pub mod wallet;
