use axum::routing::{get, post};
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Wallet routes, mounted at `/wallet`.
///
/// ```text
/// GET  /{user_id}                  wallet summary
/// GET  /{user_id}/transactions     history (?type, limit)
/// GET  /{user_id}/loyalty-tier     tier progress
/// POST /giftcard/redeem            add a gift card to a wallet
/// POST /giftcard/send              issue and email a gift card
/// POST /mall-credit/earn           issue a mall credit
/// POST /mall-credit/redeem         spend a mall credit
/// POST /transfer                   transfer SPIRAL points
/// POST /purchase                   pay with points and gift cards
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(wallet::summary))
        .route("/{user_id}/transactions", get(wallet::transactions))
        .route("/{user_id}/loyalty-tier", get(wallet::loyalty_tier))
        .route("/giftcard/redeem", post(wallet::redeem_gift_card))
        .route("/giftcard/send", post(wallet::send_gift_card))
        .route("/mall-credit/earn", post(wallet::earn_mall_credit))
        .route("/mall-credit/redeem", post(wallet::redeem_mall_credit))
        .route("/transfer", post(wallet::transfer))
        .route("/purchase", post(wallet::purchase))
}
