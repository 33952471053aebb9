//! Entity structs and DTOs.
//!
//! Each submodule contains:
//! - A `Serialize` entity struct as held in the store
//! - `Deserialize` request DTOs, validated with `validator` where the input
//!   has field-level rules
//! - `Serialize` views returned by repository queries

pub mod audit;
pub mod business_profile;
pub mod campaign;
pub mod mall_event;
pub mod product;
pub mod test_run;
pub mod wallet;
