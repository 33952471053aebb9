//! Wallet rules: gift-card and mall-credit enums, SPIRAL point fees and
//! rewards, loyalty tiers, and code generation.

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::types::Timestamp;
use crate::validation::invalid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuerType {
    Retailer,
    Mall,
    Spiral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MallCreditSource {
    Promotion,
    LoyaltyBonus,
    Event,
    Referral,
}

impl MallCreditSource {
    /// Human label used when a credit is earned without a description.
    pub fn label(self) -> &'static str {
        match self {
            MallCreditSource::Promotion => "promotion",
            MallCreditSource::LoyaltyBonus => "loyalty bonus",
            MallCreditSource::Event => "event",
            MallCreditSource::Referral => "referral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    GiftCardRedeem,
    MallCreditEarn,
    MallCreditRedeem,
    PointsTransferOut,
    PointsTransferIn,
    Purchase,
    PointsEarn,
}

// ---------------------------------------------------------------------------
// Amount limits
// ---------------------------------------------------------------------------

/// Smallest gift card that can be sent, in dollars.
pub const GIFT_CARD_MIN: i64 = 5;
/// Largest gift card that can be sent, in dollars.
pub const GIFT_CARD_MAX: i64 = 500;
/// Sent gift cards expire this many days after issue.
pub const GIFT_CARD_VALIDITY_DAYS: i64 = 365;

/// Transfer fee, in percent of the transferred points (rounded up).
pub const TRANSFER_FEE_PERCENT: i64 = 2;
/// Purchase reward, in percent of the purchase amount (rounded down).
pub const PURCHASE_REWARD_PERCENT: i64 = 5;

pub fn validate_gift_card_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount >= Decimal::from(GIFT_CARD_MIN) && *amount <= Decimal::from(GIFT_CARD_MAX) {
        Ok(())
    } else {
        Err(invalid(
            "range",
            format!("Gift card amount must be between ${GIFT_CARD_MIN} and ${GIFT_CARD_MAX}"),
        ))
    }
}

/// Fee charged to the sender of a points transfer: 2%, rounded up.
///
/// `None` when the amount is too large to price.
pub fn transfer_fee(points: i64) -> Option<i64> {
    points
        .checked_mul(TRANSFER_FEE_PERCENT)?
        .checked_add(99)
        .map(|scaled| scaled / 100)
}

/// SPIRAL points earned on a purchase: 5% of the amount, rounded down.
pub fn purchase_reward(amount: Decimal) -> i64 {
    (amount * Decimal::from(PURCHASE_REWARD_PERCENT) / Decimal::ONE_HUNDRED)
        .floor()
        .to_i64()
        .unwrap_or(0)
        .max(0)
}

/// A card or credit with an expiry in the past can no longer be used.
pub fn is_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    expires_at.is_some_and(|exp| exp <= now)
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub const EVENT_GIFT_CARD_REDEEMED: &str = "wallet.gift_card_redeemed";
pub const EVENT_GIFT_CARD_SENT: &str = "wallet.gift_card_sent";
pub const EVENT_MALL_CREDIT_EARNED: &str = "wallet.mall_credit_earned";
pub const EVENT_MALL_CREDIT_REDEEMED: &str = "wallet.mall_credit_redeemed";
pub const EVENT_POINTS_TRANSFERRED: &str = "wallet.points_transferred";
pub const EVENT_PURCHASE: &str = "wallet.purchase";

// ---------------------------------------------------------------------------
// Loyalty tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTier {
    pub name: &'static str,
    pub required_points: i64,
    pub benefits: &'static [&'static str],
    pub color: &'static str,
}

pub const LOYALTY_TIERS: [LoyaltyTier; 4] = [
    LoyaltyTier {
        name: "Bronze",
        required_points: 0,
        benefits: &["5% SPIRAL earning", "Standard support"],
        color: "#CD7F32",
    },
    LoyaltyTier {
        name: "Silver",
        required_points: 500,
        benefits: &["7% SPIRAL earning", "Priority support", "Free shipping on $50+"],
        color: "#C0C0C0",
    },
    LoyaltyTier {
        name: "Gold",
        required_points: 1000,
        benefits: &[
            "10% SPIRAL earning",
            "Premium support",
            "Free shipping",
            "Early sale access",
        ],
        color: "#FFD700",
    },
    LoyaltyTier {
        name: "Platinum",
        required_points: 2500,
        benefits: &[
            "15% SPIRAL earning",
            "VIP support",
            "Free shipping",
            "Early access",
            "Birthday bonuses",
        ],
        color: "#E5E4E2",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTier {
    pub name: &'static str,
    pub points_needed: i64,
    pub progress_percentage: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    pub current_tier: &'static str,
    pub current_points: i64,
    /// `None` at the top tier.
    pub next_tier: Option<NextTier>,
    pub progress_percentage: u8,
}

/// Highest tier whose threshold `points` meets.
pub fn tier_for(points: i64) -> &'static LoyaltyTier {
    let mut current = &LOYALTY_TIERS[0];
    for tier in &LOYALTY_TIERS {
        if points >= tier.required_points {
            current = tier;
        }
    }
    current
}

/// Progress towards the next tier, measured against that tier's threshold.
pub fn tier_progress(points: i64) -> TierProgress {
    let current = tier_for(points);
    let next = LOYALTY_TIERS
        .iter()
        .find(|t| t.required_points > current.required_points);

    let next_tier = next.map(|next| {
        let earned = points.clamp(0, next.required_points);
        NextTier {
            name: next.name,
            points_needed: next.required_points - earned,
            progress_percentage: u8::try_from(earned * 100 / next.required_points)
                .unwrap_or(100),
        }
    });

    TierProgress {
        current_tier: current.name,
        current_points: points,
        progress_percentage: next_tier.as_ref().map_or(100, |n| n.progress_percentage),
        next_tier,
    }
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

/// Unambiguous code alphabet (no 0/O or 1/I).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn random_block(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Gift card code in the form `SPRL-XXXX-XXXX`.
pub fn generate_gift_card_code() -> String {
    let mut rng = rand::rng();
    format!(
        "SPRL-{}-{}",
        random_block(&mut rng, 4),
        random_block(&mut rng, 4)
    )
}

/// Transfer confirmation code in the form `SPRL-XXXXXXXX`.
pub fn generate_confirmation_code() -> String {
    let mut rng = rand::rng();
    format!("SPRL-{}", random_block(&mut rng, 8))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn transfer_fee_rounds_up() {
        assert_eq!(transfer_fee(100), Some(2));
        assert_eq!(transfer_fee(101), Some(3));
        assert_eq!(transfer_fee(1), Some(1));
        assert_eq!(transfer_fee(0), Some(0));
    }

    #[test]
    fn transfer_fee_refuses_overflowing_amounts() {
        assert_eq!(transfer_fee(i64::MAX), None);
        assert_eq!(transfer_fee(i64::MAX / 2), None);
        assert!(transfer_fee(i64::MAX / 4).is_some());
    }

    #[test]
    fn purchase_reward_rounds_down() {
        assert_eq!(purchase_reward(Decimal::new(10000, 2)), 5);
        assert_eq!(purchase_reward(Decimal::new(3999, 2)), 1);
        assert_eq!(purchase_reward(Decimal::new(1999, 2)), 0);
    }

    #[test]
    fn gift_card_amount_bounds() {
        assert!(validate_gift_card_amount(&Decimal::from(5)).is_ok());
        assert!(validate_gift_card_amount(&Decimal::from(500)).is_ok());
        assert!(validate_gift_card_amount(&Decimal::new(499, 2)).is_err());
        assert!(validate_gift_card_amount(&Decimal::from(501)).is_err());
    }

    #[test]
    fn expiry_check() {
        let now = Utc::now();
        assert!(!is_expired(None, now));
        assert!(is_expired(Some(now - Duration::days(1)), now));
        assert!(!is_expired(Some(now + Duration::days(1)), now));
    }

    #[test]
    fn tiers_by_points() {
        assert_eq!(tier_for(0).name, "Bronze");
        assert_eq!(tier_for(499).name, "Bronze");
        assert_eq!(tier_for(500).name, "Silver");
        assert_eq!(tier_for(1250).name, "Gold");
        assert_eq!(tier_for(10_000).name, "Platinum");
    }

    #[test]
    fn progress_towards_next_tier() {
        let progress = tier_progress(1250);
        assert_eq!(progress.current_tier, "Gold");
        let next = progress.next_tier.unwrap();
        assert_eq!(next.name, "Platinum");
        assert_eq!(next.points_needed, 1250);
        assert_eq!(next.progress_percentage, 50);

        let fresh = tier_progress(0).next_tier.unwrap();
        assert_eq!(fresh.name, "Silver");
        assert_eq!(fresh.progress_percentage, 0);
    }

    #[test]
    fn top_tier_is_complete() {
        let progress = tier_progress(3000);
        assert_eq!(progress.current_tier, "Platinum");
        assert!(progress.next_tier.is_none());
        assert_eq!(progress.progress_percentage, 100);
    }

    #[test]
    fn codes_have_expected_shape() {
        let code = generate_gift_card_code();
        assert_eq!(code.len(), "SPRL-XXXX-XXXX".len());
        assert!(code.starts_with("SPRL-"));
        assert_eq!(code.matches('-').count(), 2);

        let confirmation = generate_confirmation_code();
        assert_eq!(confirmation.len(), "SPRL-XXXXXXXX".len());
        assert!(confirmation[5..].bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }
}
