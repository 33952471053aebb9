//! Handlers for the SPIRAL wallet: balances, gift cards, mall credits,
//! point transfers and wallet purchases.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use spiral_core::types::DbId;
use spiral_core::wallet::{
    tier_progress, TierProgress, EVENT_GIFT_CARD_REDEEMED, EVENT_GIFT_CARD_SENT,
    EVENT_MALL_CREDIT_EARNED, EVENT_MALL_CREDIT_REDEEMED, EVENT_POINTS_TRANSFERRED,
    EVENT_PURCHASE,
};
use spiral_db::models::wallet::{
    EarnMallCredit, EarnedMallCredit, PurchaseReceipt, RedeemGiftCard, RedeemMallCredit,
    RedeemedGiftCard, RedeemedMallCredit, SendGiftCard, SentGiftCard, TransactionHistory,
    TransactionQuery, TransferPoints, TransferReceipt, WalletPurchase, WalletSummary,
};
use spiral_db::repositories::WalletRepo;
use spiral_events::PlatformEvent;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/wallet/{user_id}
pub async fn summary(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<WalletSummary>> {
    Ok(Json(
        WalletRepo::summary(&state.pool, user_id, Utc::now()).await,
    ))
}

/// GET /api/wallet/{user_id}/transactions
pub async fn transactions(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<TransactionHistory>> {
    Ok(Json(
        WalletRepo::transactions(&state.pool, user_id, &query).await,
    ))
}

/// GET /api/wallet/{user_id}/loyalty-tier
pub async fn loyalty_tier(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<TierProgress>> {
    let points = WalletRepo::points(&state.pool, user_id).await;
    Ok(Json(tier_progress(points)))
}

// ---------------------------------------------------------------------------
// Gift cards
// ---------------------------------------------------------------------------

/// POST /api/wallet/giftcard/redeem
pub async fn redeem_gift_card(
    State(state): State<AppState>,
    AppJson(input): AppJson<RedeemGiftCard>,
) -> AppResult<Json<RedeemedGiftCard>> {
    input.validate()?;
    let redeemed = WalletRepo::redeem_gift_card(&state.pool, &input, Utc::now()).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_GIFT_CARD_REDEEMED)
            .with_source("gift_card", &redeemed.gift_card.id)
            .with_actor(input.user_id)
            .with_payload(json!({ "amount": redeemed.gift_card.remaining_balance })),
    );
    Ok(Json(redeemed))
}

/// POST /api/wallet/giftcard/send
///
/// Issues a new SPIRAL card and emails the redemption link. A failed email
/// is logged; the card stays issued.
pub async fn send_gift_card(
    State(state): State<AppState>,
    AppJson(input): AppJson<SendGiftCard>,
) -> AppResult<(StatusCode, Json<SentGiftCard>)> {
    input.validate()?;
    let sent = WalletRepo::issue_gift_card(&state.pool, &input, Utc::now()).await;

    let body = format!(
        "{} sent you a ${} SPIRAL gift card.\n{}\nRedeem it at {}",
        input.sender_name.trim(),
        sent.gift_card.amount,
        input.message.as_deref().unwrap_or_default(),
        sent.redemption_link
    );
    if let Err(e) = state
        .mailer
        .send(
            &sent.recipient_email,
            "You received a SPIRAL gift card".to_string(),
            body,
        )
        .await
    {
        tracing::warn!(error = %e, gift_card_id = %sent.gift_card.id, "Gift card email not sent");
    }

    state.event_bus.publish(
        PlatformEvent::new(EVENT_GIFT_CARD_SENT)
            .with_source("gift_card", &sent.gift_card.id)
            .with_actor(input.sender_name.trim())
            .with_payload(json!({
                "recipientEmail": sent.recipient_email,
                "amount": sent.gift_card.amount,
            })),
    );
    Ok((StatusCode::CREATED, Json(sent)))
}

// ---------------------------------------------------------------------------
// Mall credits
// ---------------------------------------------------------------------------

/// POST /api/wallet/mall-credit/earn
pub async fn earn_mall_credit(
    State(state): State<AppState>,
    AppJson(input): AppJson<EarnMallCredit>,
) -> AppResult<(StatusCode, Json<EarnedMallCredit>)> {
    input.validate()?;
    let earned = WalletRepo::earn_mall_credit(&state.pool, &input, Utc::now()).await;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_MALL_CREDIT_EARNED)
            .with_source("mall_credit", &earned.mall_credit.id)
            .with_actor(input.user_id)
            .with_payload(json!({
                "mallId": earned.mall_credit.mall_id,
                "amount": earned.mall_credit.amount,
                "source": earned.mall_credit.source,
            })),
    );
    Ok((StatusCode::CREATED, Json(earned)))
}

/// POST /api/wallet/mall-credit/redeem
pub async fn redeem_mall_credit(
    State(state): State<AppState>,
    AppJson(input): AppJson<RedeemMallCredit>,
) -> AppResult<Json<RedeemedMallCredit>> {
    input.validate()?;
    let redeemed = WalletRepo::redeem_mall_credit(&state.pool, &input, Utc::now()).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_MALL_CREDIT_REDEEMED)
            .with_source("mall_credit", &input.mall_credit_id)
            .with_actor(input.user_id)
            .with_payload(json!({
                "amount": redeemed.applied_amount,
                "remainingBalance": redeemed.remaining_balance,
                "orderId": input.order_id,
            })),
    );
    Ok(Json(redeemed))
}

// ---------------------------------------------------------------------------
// Points and purchases
// ---------------------------------------------------------------------------

/// POST /api/wallet/transfer
pub async fn transfer(
    State(state): State<AppState>,
    AppJson(input): AppJson<TransferPoints>,
) -> AppResult<Json<TransferReceipt>> {
    input.validate()?;
    let receipt = WalletRepo::transfer_points(&state.pool, &input, Utc::now()).await?;

    tracing::info!(
        transfer_id = %receipt.transfer_id,
        from_user = receipt.from_user,
        to_user = receipt.to_user,
        amount = receipt.amount,
        fee = receipt.fee,
        "SPIRAL points transferred"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_POINTS_TRANSFERRED)
            .with_source("transfer", &receipt.transfer_id)
            .with_actor(receipt.from_user)
            .with_payload(json!({
                "toUser": receipt.to_user,
                "amount": receipt.amount,
                "fee": receipt.fee,
            })),
    );
    Ok(Json(receipt))
}

/// POST /api/wallet/purchase
pub async fn purchase(
    State(state): State<AppState>,
    AppJson(input): AppJson<WalletPurchase>,
) -> AppResult<Json<PurchaseReceipt>> {
    input.validate()?;
    let receipt = WalletRepo::purchase(&state.pool, &input, Utc::now()).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_PURCHASE)
            .with_source("transaction", &receipt.transaction_id)
            .with_actor(input.user_id)
            .with_payload(json!({
                "totalAmount": receipt.total_amount,
                "spiralUsed": receipt.spiral_used,
                "giftCardUsed": receipt.gift_card_used,
                "spiralsEarned": receipt.spirals_earned,
            })),
    );
    Ok(Json(receipt))
}
