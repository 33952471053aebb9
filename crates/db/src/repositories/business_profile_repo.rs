//! Repository for retailer business profiles.

use std::str::FromStr;

use chrono::Utc;
use spiral_core::business_profile::{distribution, Bucket};
use spiral_core::error::CoreError;

use crate::models::business_profile::{
    BusinessProfile, CreateBusinessProfile, ProfileAnalytics, ProfileDistributions,
};
use crate::Store;

pub struct BusinessProfileRepo;

impl BusinessProfileRepo {
    /// Append a profile. The input must already have passed validation;
    /// an unparseable bucket here is an internal error.
    pub async fn create(
        store: &Store,
        input: &CreateBusinessProfile,
    ) -> Result<BusinessProfile, CoreError> {
        let sales_volume = parse_bucket(&input.sales_volume)?;
        let locations = parse_bucket(&input.locations)?;
        let years_in_business = parse_bucket(&input.years_in_business)?;
        let employees = parse_bucket(&input.employees)?;
        let business_type = parse_bucket(&input.business_type)?;

        let mut table = store.tables().profiles.write().await;
        let profile = BusinessProfile {
            id: table.seq.next(),
            sales_volume,
            locations,
            years_in_business,
            employees,
            business_type,
            retailer_id: input.retailer_id.clone().filter(|r| !r.trim().is_empty()),
            submitted_at: Utc::now(),
        };
        table.rows.push(profile.clone());

        tracing::info!(
            profile_id = profile.id,
            business_type = %profile.business_type,
            sales_volume = %profile.sales_volume,
            "Business profile submitted"
        );
        Ok(profile)
    }

    pub async fn list(store: &Store) -> Vec<BusinessProfile> {
        store.tables().profiles.read().await.rows.clone()
    }

    /// Bucket distributions across every submitted profile.
    pub async fn analytics(store: &Store) -> ProfileAnalytics {
        let table = store.tables().profiles.read().await;
        let rows = &table.rows;
        ProfileAnalytics {
            total_profiles: rows.len(),
            distributions: ProfileDistributions {
                sales_volume: distribution(rows.iter().map(|p| p.sales_volume)),
                locations: distribution(rows.iter().map(|p| p.locations)),
                years_in_business: distribution(rows.iter().map(|p| p.years_in_business)),
                employees: distribution(rows.iter().map(|p| p.employees)),
                business_type: distribution(rows.iter().map(|p| p.business_type)),
            },
        }
    }
}

fn parse_bucket<B: Bucket + FromStr<Err = String>>(raw: &str) -> Result<B, CoreError> {
    B::from_str(raw).map_err(CoreError::Internal)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
