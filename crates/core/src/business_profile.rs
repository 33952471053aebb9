//! Retailer business profile buckets and distribution analytics.
//!
//! Every profile field is a closed set of buckets. The wire value of each
//! bucket (e.g. `"500k-2M"`) is what the retailer dashboard submits.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::validation::validate_choice;

/// A closed set of profile buckets with stable wire names.
pub trait Bucket: Copy + 'static {
    /// Every bucket, in display order.
    const ALL: &'static [Self];

    /// Wire name of the bucket.
    fn as_str(self) -> &'static str;

    /// All wire names, in display order.
    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|b| b.as_str()).collect()
    }
}

macro_rules! bucket_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl Bucket for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{other}'", stringify!($name))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

bucket_enum! {
    /// Annual sales volume.
    SalesVolume {
        Under500k => "<500k",
        From500kTo2M => "500k-2M",
        From2MTo10M => "2M-10M",
        Over10M => "10M+",
    }
}

bucket_enum! {
    /// Number of store locations.
    LocationCount {
        Single => "1",
        From2To10 => "2-10",
        From10To50 => "10-50",
        Over50 => "50+",
    }
}

bucket_enum! {
    /// Years the business has been operating.
    YearsInBusiness {
        UnderThree => "<3",
        ThreeToTen => "3-10",
        OverTen => "10+",
    }
}

bucket_enum! {
    /// Head count.
    EmployeeCount {
        OneToFive => "1-5",
        SixToTwenty => "6-20",
        TwentyOneToHundred => "21-100",
        OverHundred => "100+",
    }
}

bucket_enum! {
    /// Where the retailer trades from.
    BusinessType {
        Standalone => "standalone",
        Mall => "mall",
        Strip => "strip",
        Other => "other",
    }
}

// ---------------------------------------------------------------------------
// Field validators (used by `#[validate(custom(...))]` on the submit DTO)
// ---------------------------------------------------------------------------

fn validate_bucket<B: Bucket>(value: &str, label: &str) -> Result<(), ValidationError> {
    validate_choice(value, &B::names(), label)
}

pub fn validate_sales_volume(value: &str) -> Result<(), ValidationError> {
    validate_bucket::<SalesVolume>(value, "sales volume")
}

pub fn validate_locations(value: &str) -> Result<(), ValidationError> {
    validate_bucket::<LocationCount>(value, "location count")
}

pub fn validate_years_in_business(value: &str) -> Result<(), ValidationError> {
    validate_bucket::<YearsInBusiness>(value, "years in business")
}

pub fn validate_employees(value: &str) -> Result<(), ValidationError> {
    validate_bucket::<EmployeeCount>(value, "employee count")
}

pub fn validate_business_type(value: &str) -> Result<(), ValidationError> {
    validate_bucket::<BusinessType>(value, "business type")
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Count occurrences per bucket. Every bucket appears in the result, zero
/// when unseen.
pub fn distribution<B: Bucket>(values: impl IntoIterator<Item = B>) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> =
        B::ALL.iter().map(|b| (b.as_str(), 0)).collect();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
