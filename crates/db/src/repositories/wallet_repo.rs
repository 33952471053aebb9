//! Repository for wallets: gift cards, mall credits, SPIRAL points and the
//! transaction ledger.

use chrono::Duration;
use rust_decimal::Decimal;
use spiral_core::error::CoreError;
use spiral_core::types::{DbId, Timestamp};
use spiral_core::wallet::{
    generate_confirmation_code, generate_gift_card_code, is_expired, purchase_reward, tier_for,
    transfer_fee, IssuerType, TransactionType, GIFT_CARD_VALIDITY_DAYS,
};

use crate::models::wallet::{
    EarnMallCredit, EarnedMallCredit, GiftCard, MallCredit, PurchaseReceipt, RedeemGiftCard,
    RedeemMallCredit, RedeemedGiftCard, RedeemedMallCredit, RemainingBalance, SendGiftCard,
    SentGiftCard, TransactionHistory, TransactionQuery, TransactionTotals, TransferPoints,
    TransferReceipt, WalletCardView, WalletGiftCard, WalletPurchase, WalletSummary,
    WalletTransaction,
};
use crate::repositories::clamp_limit;
use crate::store::WalletLedger;
use crate::Store;

/// Transactions shown on the wallet summary.
const RECENT_TRANSACTIONS: usize = 10;

/// Default page size for the transaction history.
const DEFAULT_HISTORY_LIMIT: i64 = 20;

pub struct WalletRepo;

impl WalletRepo {
    // ---- reads ----

    pub async fn summary(store: &Store, user_id: DbId, now: Timestamp) -> WalletSummary {
        let ledger = store.tables().wallet.read().await;

        let gift_cards: Vec<WalletCardView> = ledger
            .wallet_cards
            .iter()
            .filter(|link| link.user_id == user_id)
            .filter_map(|link| {
                let card = ledger.gift_cards.iter().find(|c| c.id == link.gift_card_id)?;
                Some(WalletCardView {
                    link: link.clone(),
                    gift_card: card.clone(),
                })
            })
            .collect();

        let mall_credits: Vec<MallCredit> = ledger
            .mall_credits
            .iter()
            .filter(|mc| mc.user_id == user_id && mc.is_active)
            .cloned()
            .collect();

        let total_gift_card_balance: Decimal = gift_cards
            .iter()
            .map(|v| &v.gift_card)
            .filter(|card| card_is_usable(card, now))
            .map(|card| card.remaining_balance)
            .sum();
        let total_mall_credits: Decimal = mall_credits.iter().map(|mc| mc.remaining_balance).sum();
        let spiral_points = ledger.points_of(user_id);

        WalletSummary {
            user_id,
            gift_cards,
            mall_credits,
            total_gift_card_balance,
            total_mall_credits,
            spiral_points,
            loyalty_tier: tier_for(spiral_points).name,
            recent_transactions: newest_first(&ledger, user_id)
                .take(RECENT_TRANSACTIONS)
                .cloned()
                .collect(),
        }
    }

    /// Transaction history, newest first, optionally filtered by type.
    pub async fn transactions(
        store: &Store,
        user_id: DbId,
        query: &TransactionQuery,
    ) -> TransactionHistory {
        let ledger = store.tables().wallet.read().await;
        let matching: Vec<&WalletTransaction> = newest_first(&ledger, user_id)
            .filter(|t| query.transaction_type.is_none_or(|ty| t.transaction_type == ty))
            .collect();

        let mut summary = TransactionTotals::default();
        for t in &matching {
            if t.is_credit() {
                summary.total_earned += t.amount;
            } else {
                summary.total_redeemed += t.amount;
            }
        }

        TransactionHistory {
            total_count: matching.len(),
            transactions: matching
                .into_iter()
                .take(clamp_limit(query.limit.or(Some(DEFAULT_HISTORY_LIMIT))))
                .cloned()
                .collect(),
            summary,
        }
    }

    pub async fn points(store: &Store, user_id: DbId) -> i64 {
        store.tables().wallet.read().await.points_of(user_id)
    }

    // ---- gift cards ----

    /// Add an existing gift card to a user's wallet.
    pub async fn redeem_gift_card(
        store: &Store,
        input: &RedeemGiftCard,
        now: Timestamp,
    ) -> Result<RedeemedGiftCard, CoreError> {
        let mut ledger = store.tables().wallet.write().await;
        let code = input.code.trim();

        let card = ledger
            .gift_cards
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code) && c.is_active)
            .cloned()
            .ok_or_else(|| CoreError::not_found("Gift card", code))?;

        if is_expired(card.expires_at, now) {
            return Err(CoreError::Validation("Gift card has expired".into()));
        }
        if ledger
            .wallet_cards
            .iter()
            .any(|w| w.user_id == input.user_id && w.gift_card_id == card.id)
        {
            return Err(CoreError::Validation(
                "Gift card already added to wallet".into(),
            ));
        }

        let link = WalletGiftCard {
            id: ledger.next_id("wallet"),
            user_id: input.user_id,
            gift_card_id: card.id.clone(),
            added_at: now,
        };
        ledger.wallet_cards.push(link.clone());

        let transaction = record(
            &mut ledger,
            input.user_id,
            TransactionType::GiftCardRedeem,
            card.amount,
            format!("Added gift card: {}", card.title),
            now,
            |t| t.gift_card_id = Some(card.id.clone()),
        );

        Ok(RedeemedGiftCard {
            wallet: link,
            gift_card: card,
            transaction,
        })
    }

    /// Issue a new SPIRAL gift card for a recipient.
    pub async fn issue_gift_card(
        store: &Store,
        input: &SendGiftCard,
        now: Timestamp,
    ) -> SentGiftCard {
        let mut ledger = store.tables().wallet.write().await;

        let code = loop {
            let candidate = generate_gift_card_code();
            if !ledger.gift_cards.iter().any(|c| c.code == candidate) {
                break candidate;
            }
        };

        let card = GiftCard {
            id: ledger.next_id("gc"),
            code: code.clone(),
            issuer_type: IssuerType::Spiral,
            amount: input.amount,
            remaining_balance: input.amount,
            is_active: true,
            expires_at: Some(now + Duration::days(GIFT_CARD_VALIDITY_DAYS)),
            title: format!("Gift from {}", input.sender_name.trim()),
            description: Some(
                input
                    .message
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "A SPIRAL gift card sent with love".to_string()),
            ),
            terms: Some("Valid for 1 year from issue date.".to_string()),
            created_at: now,
        };
        ledger.gift_cards.push(card.clone());

        SentGiftCard {
            redemption_link: format!("/wallet/redeem?code={code}"),
            recipient_email: input.recipient_email.clone(),
            gift_card: card,
        }
    }

    // ---- mall credits ----

    pub async fn earn_mall_credit(
        store: &Store,
        input: &EarnMallCredit,
        now: Timestamp,
    ) -> EarnedMallCredit {
        let mut ledger = store.tables().wallet.write().await;

        let credit = MallCredit {
            id: ledger.next_id("mc"),
            user_id: input.user_id,
            mall_id: input.mall_id.clone(),
            mall_name: input.mall_name.clone(),
            amount: input.amount,
            remaining_balance: input.amount,
            source: input.source,
            description: input
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| format!("{} credit", input.source.label())),
            is_active: true,
            expires_at: input.expires_at,
            earned_at: now,
        };
        ledger.mall_credits.push(credit.clone());

        let transaction = record(
            &mut ledger,
            input.user_id,
            TransactionType::MallCreditEarn,
            credit.amount,
            format!("Earned mall credit: {}", credit.description),
            now,
            |t| t.mall_credit_id = Some(credit.id.clone()),
        );

        EarnedMallCredit {
            mall_credit: credit,
            transaction,
        }
    }

    /// Spend part of a mall credit. The credit deactivates at zero.
    pub async fn redeem_mall_credit(
        store: &Store,
        input: &RedeemMallCredit,
        now: Timestamp,
    ) -> Result<RedeemedMallCredit, CoreError> {
        let mut ledger = store.tables().wallet.write().await;

        let credit = ledger
            .mall_credits
            .iter_mut()
            .find(|mc| mc.id == input.mall_credit_id && mc.user_id == input.user_id && mc.is_active)
            .ok_or_else(|| CoreError::not_found("Mall credit", &input.mall_credit_id))?;

        if is_expired(credit.expires_at, now) {
            return Err(CoreError::Validation("Mall credit has expired".into()));
        }
        if credit.remaining_balance < input.amount {
            return Err(CoreError::Validation(
                "Insufficient mall credit balance".into(),
            ));
        }

        credit.remaining_balance -= input.amount;
        if credit.remaining_balance.is_zero() {
            credit.is_active = false;
        }
        let remaining_balance = credit.remaining_balance;
        let credit_id = credit.id.clone();

        let transaction = record(
            &mut ledger,
            input.user_id,
            TransactionType::MallCreditRedeem,
            input.amount,
            format!(
                "Used mall credit for order {}",
                input.order_id.as_deref().unwrap_or("checkout")
            ),
            now,
            |t| {
                t.mall_credit_id = Some(credit_id);
                t.order_id = input.order_id.clone();
            },
        );

        Ok(RedeemedMallCredit {
            applied_amount: input.amount,
            remaining_balance,
            transaction,
        })
    }

    // ---- points ----

    /// Move SPIRAL points between users. The sender also pays the fee.
    pub async fn transfer_points(
        store: &Store,
        input: &TransferPoints,
        now: Timestamp,
    ) -> Result<TransferReceipt, CoreError> {
        if input.from_user_id == input.to_user_id {
            return Err(CoreError::Validation(
                "Cannot transfer SPIRALs to yourself".into(),
            ));
        }

        let (fee, debit) = transfer_fee(input.amount)
            .and_then(|fee| input.amount.checked_add(fee).map(|debit| (fee, debit)))
            .ok_or_else(|| CoreError::Validation("Transfer amount is too large".into()))?;

        let mut ledger = store.tables().wallet.write().await;
        let available = ledger.points_of(input.from_user_id);
        if available < debit {
            return Err(CoreError::Validation(format!(
                "Insufficient SPIRAL balance: {debit} needed including fee, {available} available"
            )));
        }

        let credited = ledger
            .points_of(input.to_user_id)
            .checked_add(input.amount)
            .ok_or_else(|| CoreError::Validation("Recipient balance would overflow".into()))?;

        let remaining_points = available - debit;
        ledger.points.insert(input.from_user_id, remaining_points);
        ledger.points.insert(input.to_user_id, credited);

        let transfer_id = ledger.next_id("transfer");
        record(
            &mut ledger,
            input.from_user_id,
            TransactionType::PointsTransferOut,
            Decimal::from(debit),
            format!("Sent {} SPIRALs to user {} (fee {fee})", input.amount, input.to_user_id),
            now,
            |t| t.order_id = Some(transfer_id.clone()),
        );
        record(
            &mut ledger,
            input.to_user_id,
            TransactionType::PointsTransferIn,
            Decimal::from(input.amount),
            format!("Received {} SPIRALs from user {}", input.amount, input.from_user_id),
            now,
            |t| t.order_id = Some(transfer_id.clone()),
        );

        Ok(TransferReceipt {
            transfer_id,
            from_user: input.from_user_id,
            to_user: input.to_user_id,
            amount: input.amount,
            message: input.message.clone(),
            fee,
            timestamp: now,
            confirmation_code: generate_confirmation_code(),
            remaining_points,
        })
    }

    /// Pay for a purchase with SPIRAL points and gift-card balance, and award
    /// the purchase reward.
    ///
    /// Gift-card balance is drained across the user's usable cards in the
    /// order they were added to the wallet.
    pub async fn purchase(
        store: &Store,
        input: &WalletPurchase,
        now: Timestamp,
    ) -> Result<PurchaseReceipt, CoreError> {
        let spiral_tender = Decimal::from(input.spiral_amount);
        if spiral_tender + input.gift_card_amount > input.amount {
            return Err(CoreError::Validation(
                "Payment exceeds purchase amount".into(),
            ));
        }

        let mut ledger = store.tables().wallet.write().await;

        let points = ledger.points_of(input.user_id);
        if points < input.spiral_amount {
            return Err(CoreError::Validation(format!(
                "Insufficient SPIRAL balance: {} needed, {points} available",
                input.spiral_amount
            )));
        }

        let card_ids = usable_card_ids(&ledger, input.user_id, now);
        let card_balance: Decimal = ledger
            .gift_cards
            .iter()
            .filter(|c| card_ids.contains(&c.id))
            .map(|c| c.remaining_balance)
            .sum();
        if card_balance < input.gift_card_amount {
            return Err(CoreError::Validation(format!(
                "Insufficient gift card balance: {} needed, {card_balance} available",
                input.gift_card_amount
            )));
        }

        let mut owed = input.gift_card_amount;
        for id in &card_ids {
            if owed.is_zero() {
                break;
            }
            if let Some(card) = ledger.gift_cards.iter_mut().find(|c| &c.id == id) {
                let taken = owed.min(card.remaining_balance);
                card.remaining_balance -= taken;
                if card.remaining_balance.is_zero() {
                    card.is_active = false;
                }
                owed -= taken;
            }
        }

        let earned = purchase_reward(input.amount);
        let spiral_balance = points - input.spiral_amount + earned;
        ledger.points.insert(input.user_id, spiral_balance);

        let description = input
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "Wallet purchase".to_string());
        let transaction = record(
            &mut ledger,
            input.user_id,
            TransactionType::Purchase,
            input.amount,
            description,
            now,
            |_| {},
        );
        if earned > 0 {
            record(
                &mut ledger,
                input.user_id,
                TransactionType::PointsEarn,
                Decimal::from(earned),
                format!("Earned {earned} SPIRALs on purchase"),
                now,
                |t| t.order_id = Some(transaction.id.clone()),
            );
        }

        Ok(PurchaseReceipt {
            transaction_id: transaction.id.clone(),
            total_amount: input.amount,
            spiral_used: input.spiral_amount,
            gift_card_used: input.gift_card_amount,
            spirals_earned: earned,
            remaining_balance: RemainingBalance {
                spiral: spiral_balance,
                gift_card: card_balance - input.gift_card_amount,
            },
            transaction,
        })
    }

    /// Credit points directly (seed data and promotions).
    pub async fn award_points(store: &Store, user_id: DbId, points: i64) -> i64 {
        let mut ledger = store.tables().wallet.write().await;
        let balance = ledger.points.entry(user_id).or_insert(0);
        *balance = balance.saturating_add(points);
        *balance
    }

    /// Credit earned points and record them in the user's history. Returns
    /// the new balance.
    pub async fn credit_points(
        store: &Store,
        user_id: DbId,
        points: i64,
        description: String,
        now: Timestamp,
    ) -> i64 {
        let mut ledger = store.tables().wallet.write().await;
        let balance = ledger.points_of(user_id).saturating_add(points);
        ledger.points.insert(user_id, balance);
        record(
            &mut ledger,
            user_id,
            TransactionType::PointsEarn,
            Decimal::from(points),
            description,
            now,
            |_| {},
        );
        balance
    }

    /// Insert a pre-built gift card (seed data and partner issuers).
    pub async fn insert_gift_card(store: &Store, card: GiftCard) {
        store.tables().wallet.write().await.gift_cards.push(card);
    }

    /// Insert a pre-built mall credit (seed data).
    pub async fn insert_mall_credit(store: &Store, credit: MallCredit) {
        store.tables().wallet.write().await.mall_credits.push(credit);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn card_is_usable(card: &GiftCard, now: Timestamp) -> bool {
    card.is_active && !is_expired(card.expires_at, now) && card.remaining_balance > Decimal::ZERO
}

/// Ids of the user's usable cards, in wallet order.
fn usable_card_ids(ledger: &WalletLedger, user_id: DbId, now: Timestamp) -> Vec<String> {
    ledger
        .wallet_cards
        .iter()
        .filter(|link| link.user_id == user_id)
        .filter(|link| {
            ledger
                .gift_cards
                .iter()
                .any(|c| c.id == link.gift_card_id && card_is_usable(c, now))
        })
        .map(|link| link.gift_card_id.clone())
        .collect()
}

fn newest_first(ledger: &WalletLedger, user_id: DbId) -> impl Iterator<Item = &WalletTransaction> {
    ledger
        .transactions
        .iter()
        .rev()
        .filter(move |t| t.user_id == user_id)
}

/// Append a transaction and return a copy. `extra` fills the optional
/// reference fields.
fn record(
    ledger: &mut WalletLedger,
    user_id: DbId,
    transaction_type: TransactionType,
    amount: Decimal,
    description: String,
    now: Timestamp,
    extra: impl FnOnce(&mut WalletTransaction),
) -> WalletTransaction {
    let mut transaction = WalletTransaction {
        id: ledger.next_id("txn"),
        user_id,
        transaction_type,
        amount,
        gift_card_id: None,
        mall_credit_id: None,
        order_id: None,
        description,
        transaction_date: now,
    };
    extra(&mut transaction);
    ledger.transactions.push(transaction.clone());
    transaction
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
