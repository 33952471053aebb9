//! Retailer business profile entity, submit DTO and analytics view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spiral_core::business_profile::{
    validate_business_type, validate_employees, validate_locations, validate_sales_volume,
    validate_years_in_business, BusinessType, EmployeeCount, LocationCount, SalesVolume,
    YearsInBusiness,
};
use spiral_core::types::{DbId, Timestamp};
use validator::Validate;

/// A submitted profile. Profiles are append-only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub id: DbId,
    pub sales_volume: SalesVolume,
    pub locations: LocationCount,
    pub years_in_business: YearsInBusiness,
    pub employees: EmployeeCount,
    pub business_type: BusinessType,
    pub retailer_id: Option<String>,
    pub submitted_at: Timestamp,
}

/// DTO for `POST /retailer-business-profile`.
///
/// Fields arrive as plain strings so that a missing or unknown bucket is
/// reported per field instead of failing deserialization as a whole.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBusinessProfile {
    #[validate(custom(function = "validate_sales_volume"))]
    pub sales_volume: String,
    #[validate(custom(function = "validate_locations"))]
    pub locations: String,
    #[validate(custom(function = "validate_years_in_business"))]
    pub years_in_business: String,
    #[validate(custom(function = "validate_employees"))]
    pub employees: String,
    #[validate(custom(function = "validate_business_type"))]
    pub business_type: String,
    pub retailer_id: Option<String>,
}

/// Per-field bucket counts. Every bucket is present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDistributions {
    pub sales_volume: BTreeMap<&'static str, usize>,
    pub locations: BTreeMap<&'static str, usize>,
    pub years_in_business: BTreeMap<&'static str, usize>,
    pub employees: BTreeMap<&'static str, usize>,
    pub business_type: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalytics {
    pub total_profiles: usize,
    pub distributions: ProfileDistributions,
}
