//! Wallet entities (gift cards, mall credits, transactions), request DTOs
//! and the receipts returned by wallet operations.
//!
//! Dollar amounts are [`Decimal`]. SPIRAL points are whole `i64` counts;
//! `points_*` transactions carry their point count in `amount`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spiral_core::types::{DbId, Timestamp};
use spiral_core::validation::{validate_non_negative_amount, validate_positive_amount};
use spiral_core::wallet::{validate_gift_card_amount, IssuerType, MallCreditSource, TransactionType};
use validator::Validate;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    pub id: String,
    pub code: String,
    pub issuer_type: IssuerType,
    pub amount: Decimal,
    pub remaining_balance: Decimal,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
    pub title: String,
    pub description: Option<String>,
    pub terms: Option<String>,
    pub created_at: Timestamp,
}

/// Link between a user's wallet and a gift card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletGiftCard {
    pub id: String,
    pub user_id: DbId,
    pub gift_card_id: String,
    pub added_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MallCredit {
    pub id: String,
    pub user_id: DbId,
    pub mall_id: String,
    pub mall_name: String,
    pub amount: Decimal,
    pub remaining_balance: Decimal,
    pub source: MallCreditSource,
    pub description: String,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
    pub earned_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: String,
    pub user_id: DbId,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub gift_card_id: Option<String>,
    pub mall_credit_id: Option<String>,
    pub order_id: Option<String>,
    pub description: String,
    pub transaction_date: Timestamp,
}

impl WalletTransaction {
    /// Whether the entry adds value to the wallet.
    pub fn is_credit(&self) -> bool {
        matches!(
            self.transaction_type,
            TransactionType::GiftCardRedeem
                | TransactionType::MallCreditEarn
                | TransactionType::PointsTransferIn
                | TransactionType::PointsEarn
        )
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemGiftCard {
    #[validate(length(min = 1, message = "Gift card code is required"))]
    pub code: String,
    pub user_id: DbId,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendGiftCard {
    #[validate(email(message = "Recipient email must be a valid email address"))]
    pub recipient_email: String,
    #[validate(custom(function = "validate_gift_card_amount"))]
    pub amount: Decimal,
    pub message: Option<String>,
    #[validate(length(min = 1, message = "Sender name is required"))]
    pub sender_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EarnMallCredit {
    pub user_id: DbId,
    #[validate(length(min = 1, message = "Mall id is required"))]
    pub mall_id: String,
    #[validate(length(min = 1, message = "Mall name is required"))]
    pub mall_name: String,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    pub source: MallCreditSource,
    pub description: Option<String>,
    pub expires_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemMallCredit {
    pub user_id: DbId,
    #[validate(length(min = 1, message = "Mall credit id is required"))]
    pub mall_credit_id: String,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferPoints {
    pub from_user_id: DbId,
    pub to_user_id: DbId,
    #[validate(range(min = 1, message = "Transfer amount must be at least 1 SPIRAL"))]
    pub amount: i64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WalletPurchase {
    pub user_id: DbId,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    /// SPIRAL points tendered, one point per dollar.
    #[serde(default)]
    #[validate(range(min = 0, message = "SPIRAL amount must not be negative"))]
    pub spiral_amount: i64,
    #[serde(default)]
    #[validate(custom(function = "validate_non_negative_amount"))]
    pub gift_card_amount: Decimal,
    pub description: Option<String>,
}

/// Query parameters for the transaction history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Views and receipts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletCardView {
    #[serde(flatten)]
    pub link: WalletGiftCard,
    pub gift_card: GiftCard,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub user_id: DbId,
    pub gift_cards: Vec<WalletCardView>,
    pub mall_credits: Vec<MallCredit>,
    pub total_gift_card_balance: Decimal,
    pub total_mall_credits: Decimal,
    pub spiral_points: i64,
    pub loyalty_tier: &'static str,
    pub recent_transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTotals {
    pub total_earned: Decimal,
    pub total_redeemed: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
    pub transactions: Vec<WalletTransaction>,
    /// Matching transactions before `limit` is applied.
    pub total_count: usize,
    pub summary: TransactionTotals,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemedGiftCard {
    pub wallet: WalletGiftCard,
    pub gift_card: GiftCard,
    pub transaction: WalletTransaction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentGiftCard {
    pub gift_card: GiftCard,
    pub recipient_email: String,
    pub redemption_link: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedMallCredit {
    pub mall_credit: MallCredit,
    pub transaction: WalletTransaction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemedMallCredit {
    pub applied_amount: Decimal,
    pub remaining_balance: Decimal,
    pub transaction: WalletTransaction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub transfer_id: String,
    pub from_user: DbId,
    pub to_user: DbId,
    pub amount: i64,
    pub message: Option<String>,
    pub fee: i64,
    pub timestamp: Timestamp,
    pub confirmation_code: String,
    /// Sender's balance after amount and fee.
    pub remaining_points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingBalance {
    pub spiral: i64,
    pub gift_card: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub transaction_id: String,
    pub total_amount: Decimal,
    pub spiral_used: i64,
    pub gift_card_used: Decimal,
    pub spirals_earned: i64,
    pub remaining_balance: RemainingBalance,
    pub transaction: WalletTransaction,
}
