//! Demo data loaded at startup when `SEED_DEMO_DATA` is enabled.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use spiral_core::inventory::ProductInput;
use spiral_core::mall_event::ModerationAction;
use spiral_core::types::Timestamp;
use spiral_core::wallet::{IssuerType, MallCreditSource};

use crate::models::mall_event::{CreateMallEvent, ModerateMallEvent};
use crate::models::wallet::{GiftCard, MallCredit};
use crate::repositories::{MallEventRepo, ProductRepo, WalletRepo};
use crate::Store;

/// User that owns the seeded wallet balances.
pub const DEMO_USER_ID: i64 = 1;

/// Points credited to the demo user.
pub const DEMO_POINTS: i64 = 1250;

/// Counts of what [`seed_demo_data`] inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub products: usize,
    pub gift_cards: usize,
    pub mall_credits: usize,
    pub mall_events: usize,
}

pub async fn seed_demo_data(store: &Store) -> SeedReport {
    let products = ProductRepo::create_many(store, demo_products()).await.len();

    let now = Utc::now();
    let gift_cards = [
        GiftCard {
            id: "gc_seed_1".into(),
            code: "SPRL-GIFT-2024".into(),
            issuer_type: IssuerType::Spiral,
            amount: Decimal::from(25),
            remaining_balance: Decimal::from(25),
            is_active: true,
            expires_at: Some(now + Duration::days(365)),
            title: "SPIRAL Welcome Bonus".into(),
            description: Some("Welcome to SPIRAL! Use this gift card at any participating store.".into()),
            terms: Some("Valid at participating SPIRAL retailers. No cash value.".into()),
            created_at: now,
        },
        GiftCard {
            id: "gc_seed_2".into(),
            code: "MALL-50-PROMO".into(),
            issuer_type: IssuerType::Mall,
            amount: Decimal::from(50),
            remaining_balance: Decimal::from(50),
            is_active: true,
            expires_at: Some(now + Duration::days(180)),
            title: "Mall Promo Gift Card".into(),
            description: Some("Spend at any store inside a participating mall.".into()),
            terms: Some("Mall locations only.".into()),
            created_at: now,
        },
    ];
    let gift_card_count = gift_cards.len();
    for card in gift_cards {
        WalletRepo::insert_gift_card(store, card).await;
    }

    WalletRepo::insert_mall_credit(
        store,
        MallCredit {
            id: "mc_seed_1".into(),
            user_id: DEMO_USER_ID,
            mall_id: "burnsville-mall".into(),
            mall_name: "Burnsville Mall".into(),
            amount: Decimal::from(15),
            remaining_balance: Decimal::from(15),
            source: MallCreditSource::Promotion,
            description: "Grand opening promotion credit".into(),
            is_active: true,
            expires_at: Some(now + Duration::days(60)),
            earned_at: now,
        },
    )
    .await;

    WalletRepo::award_points(store, DEMO_USER_ID, DEMO_POINTS).await;

    let mall_events = seed_mall_events(store, now).await;

    let report = SeedReport {
        products,
        gift_cards: gift_card_count,
        mall_credits: 1,
        mall_events,
    };
    tracing::info!(
        products = report.products,
        gift_cards = report.gift_cards,
        mall_credits = report.mall_credits,
        mall_events = report.mall_events,
        "Seeded demo data"
    );
    report
}

/// Four published events and one awaiting moderation, with two demo RSVPs
/// on the first.
async fn seed_mall_events(store: &Store, now: Timestamp) -> usize {
    let event = |mall: (&str, &str, &str),
                 title: &str,
                 event_type: &str,
                 location: &str,
                 days: i64,
                 hours: i64,
                 max_rsvp: i64,
                 reward_points: i64| {
        let start = now + Duration::days(days);
        CreateMallEvent {
            mall_id: mall.0.into(),
            mall_name: Some(mall.1.into()),
            mall_location: Some(mall.2.into()),
            title: title.into(),
            description: format!("{title}. Free for SPIRAL members, RSVP to earn SPIRALs."),
            start_time: start,
            end_time: start + Duration::hours(hours),
            image_url: None,
            event_type: event_type.into(),
            location: location.into(),
            max_rsvp: Some(max_rsvp),
            reward_points: Some(reward_points),
        }
    };
    let downtown = ("downtown-center", "Downtown Shopping Center", "Downtown District");
    let family = ("family-plaza", "Family Plaza Mall", "Suburbs");
    let westside = ("westside-market", "Westside Marketplace", "West End");

    let published = [
        event(downtown, "Holiday Fashion Show & Styling Workshop", "Fashion", "Main Plaza", 7, 2, 80, 15),
        event(family, "Kids' Science Discovery Day", "Kids", "Community Center", 8, 2, 60, 12),
        event(downtown, "Tech Innovation Showcase", "Technology", "Tech Hub Wing", 10, 3, 100, 20),
        event(family, "Live Music & Local Artists Night", "Music & Arts", "Main Atrium", 14, 3, 120, 18),
    ];
    let pending = event(westside, "Local Food & Wine Tasting", "Food & Beverage", "Food Court", 12, 3, 50, 25);

    let mut seeded = Vec::new();
    for input in published.iter().chain(std::iter::once(&pending)) {
        match MallEventRepo::create(store, input, now).await {
            Ok(created) => seeded.push(created),
            Err(e) => tracing::warn!(title = %input.title, error = %e, "Skipping demo mall event"),
        }
    }

    let approve = ModerateMallEvent {
        action: ModerationAction::Approve,
        published: true,
    };
    for created in seeded.iter().filter(|e| e.title != pending.title) {
        if let Err(e) = MallEventRepo::moderate(store, created.id, &approve).await {
            tracing::warn!(event_id = created.id, error = %e, "Demo mall event not published");
        }
    }

    if let Some(first) = seeded.first() {
        for user_id in [DEMO_USER_ID, DEMO_USER_ID + 1] {
            if let Err(e) = MallEventRepo::rsvp(store, first.id, user_id, now).await {
                tracing::warn!(event_id = first.id, user_id, error = %e, "Demo RSVP not created");
            }
        }
    }

    seeded.len()
}

fn demo_products() -> Vec<ProductInput> {
    let product = |name: &str, price: f64, quantity: i64, category: &str, sku: &str, description: &str| {
        ProductInput {
            name: name.into(),
            price,
            quantity,
            variants: vec![],
            discount: None,
            image_url: String::new(),
            category: category.into(),
            sku: sku.into(),
            description: description.into(),
        }
    };
    vec![
        product(
            "Wireless Bluetooth Headphones",
            89.99,
            25,
            "Electronics",
            "ELEC-HP-001",
            "Over-ear headphones with 30 hour battery life",
        ),
        product(
            "Organic Coffee Beans",
            14.5,
            8,
            "Food",
            "FOOD-CB-010",
            "Locally roasted single-origin beans, 12oz bag",
        ),
        product(
            "Summer Fashion Dress",
            49.0,
            0,
            "Clothing",
            "CLO-DR-204",
            "Lightweight cotton dress in seasonal prints",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mall_event::EventQuery;
    use crate::models::product::ProductQuery;
    use crate::models::wallet::RedeemGiftCard;

    #[tokio::test]
    async fn seeds_catalog_and_demo_wallet() {
        let store = Store::default();
        let report = seed_demo_data(&store).await;
        assert_eq!(report.products, 3);
        assert_eq!(report.mall_events, 5);

        assert_eq!(
            ProductRepo::list(&store, &ProductQuery::default()).await.len(),
            3
        );

        let summary = WalletRepo::summary(&store, DEMO_USER_ID, Utc::now()).await;
        assert_eq!(summary.spiral_points, DEMO_POINTS);
        assert_eq!(summary.loyalty_tier, "Gold");
        assert_eq!(summary.mall_credits.len(), 1);
        assert!(summary.gift_cards.is_empty());
    }

    #[tokio::test]
    async fn seeds_published_and_pending_mall_events() {
        let store = Store::default();
        seed_demo_data(&store).await;

        let listing = MallEventRepo::list(&store, &EventQuery::default(), Utc::now()).await;
        assert_eq!(listing.total, 4);
        assert_eq!(listing.events[0].current_rsvp, 2);
        assert_eq!(MallEventRepo::pending(&store).await.len(), 1);
        assert_eq!(
            MallEventRepo::rsvps_for_user(&store, DEMO_USER_ID, None).await.len(),
            1
        );
    }

    #[tokio::test]
    async fn seeded_gift_card_is_redeemable() {
        let store = Store::default();
        seed_demo_data(&store).await;

        let redeemed = WalletRepo::redeem_gift_card(
            &store,
            &RedeemGiftCard {
                code: "SPRL-GIFT-2024".into(),
                user_id: DEMO_USER_ID,
            },
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(redeemed.gift_card.amount, Decimal::from(25));
    }
}
