pub mod business_profile;
pub mod campaigns;
pub mod mall_events;
pub mod products;
pub mod test_suites;
pub mod wallet;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::AppResult;
use crate::extract::parse_json;

/// Parse an optional JSON body. An empty or whitespace-only body yields the
/// default value.
pub(crate) fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_json(body)
}
