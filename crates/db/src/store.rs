//! The in-memory tables behind [`Store`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use spiral_core::error::CoreError;
use spiral_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::audit::AuditEntry;
use crate::models::business_profile::BusinessProfile;
use crate::models::campaign::Campaign;
use crate::models::mall_event::{EventRsvp, MallEvent};
use crate::models::product::Product;
use crate::models::test_run::TestRun;
use crate::models::wallet::{GiftCard, MallCredit, WalletGiftCard, WalletTransaction};

/// How long [`Store::ping`] waits on any one table lock.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Monotonic id source for a table. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub(crate) struct Sequence(DbId);

impl Sequence {
    pub(crate) fn next(&mut self) -> DbId {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
pub(crate) struct ProductTable {
    pub(crate) seq: Sequence,
    pub(crate) rows: BTreeMap<DbId, Product>,
}

#[derive(Debug, Default)]
pub(crate) struct ProfileTable {
    pub(crate) seq: Sequence,
    pub(crate) rows: Vec<BusinessProfile>,
}

/// Campaign scheduling state. `active` always names a campaign in
/// `scheduled` when set.
#[derive(Debug)]
pub(crate) struct CampaignBoard {
    pub(crate) active: Option<Uuid>,
    pub(crate) scheduled: Vec<Campaign>,
    pub(crate) admin_unlocked: bool,
    pub(crate) last_updated: Timestamp,
}

impl Default for CampaignBoard {
    fn default() -> Self {
        Self {
            active: None,
            scheduled: Vec::new(),
            admin_unlocked: false,
            last_updated: Utc::now(),
        }
    }
}

impl CampaignBoard {
    pub(crate) fn active(&self) -> Option<&Campaign> {
        let id = self.active?;
        self.scheduled.iter().find(|c| c.id == id)
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut Campaign> {
        let id = self.active?;
        self.scheduled.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

/// Mall events keyed by id, and every RSVP ever made. A user holds at most
/// one RSVP per event; cancelling and re-booking reuses it.
#[derive(Debug, Default)]
pub(crate) struct MallEventTable {
    pub(crate) event_seq: Sequence,
    pub(crate) rsvp_seq: Sequence,
    pub(crate) events: BTreeMap<DbId, MallEvent>,
    pub(crate) rsvps: Vec<EventRsvp>,
}

impl MallEventTable {
    pub(crate) fn rsvp_mut(&mut self, event_id: DbId, user_id: DbId) -> Option<&mut EventRsvp> {
        self.rsvps
            .iter_mut()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
    }
}

#[derive(Debug, Default)]
pub(crate) struct WalletLedger {
    pub(crate) seq: Sequence,
    pub(crate) gift_cards: Vec<GiftCard>,
    pub(crate) wallet_cards: Vec<WalletGiftCard>,
    pub(crate) mall_credits: Vec<MallCredit>,
    pub(crate) transactions: Vec<WalletTransaction>,
    pub(crate) points: HashMap<DbId, i64>,
}

impl WalletLedger {
    /// Next id for any wallet entity, rendered with a type prefix
    /// (`gc_7`, `txn_12`).
    pub(crate) fn next_id(&mut self, prefix: &str) -> String {
        format!("{prefix}_{}", self.seq.next())
    }

    pub(crate) fn points_of(&self, user_id: DbId) -> i64 {
        self.points.get(&user_id).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct AuditTable {
    pub(crate) seq: Sequence,
    pub(crate) rows: Vec<AuditEntry>,
}

#[derive(Debug, Default)]
pub(crate) struct TestRunTable {
    pub(crate) seq: Sequence,
    pub(crate) rows: Vec<TestRun>,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) products: RwLock<ProductTable>,
    pub(crate) profiles: RwLock<ProfileTable>,
    pub(crate) campaigns: RwLock<CampaignBoard>,
    pub(crate) mall_events: RwLock<MallEventTable>,
    pub(crate) wallet: RwLock<WalletLedger>,
    pub(crate) audit: RwLock<AuditTable>,
    pub(crate) test_runs: RwLock<TestRunTable>,
}

/// Cheaply cloneable handle to every table.
#[derive(Debug, Clone, Default)]
pub struct Store {
    tables: Arc<Tables>,
}

impl Store {
    pub(crate) fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Acquire and release a read lock on every table.
    ///
    /// A table still locked after [`PROBE_TIMEOUT`] is reported as an
    /// internal error naming it.
    pub async fn ping(&self) -> Result<(), CoreError> {
        let t = &self.tables;
        ping_table("products", t.products.read()).await?;
        ping_table("profiles", t.profiles.read()).await?;
        ping_table("campaigns", t.campaigns.read()).await?;
        ping_table("mall_events", t.mall_events.read()).await?;
        ping_table("wallet", t.wallet.read()).await?;
        ping_table("audit", t.audit.read()).await?;
        ping_table("test_runs", t.test_runs.read()).await?;
        Ok(())
    }
}

async fn ping_table<F: std::future::Future>(table: &str, lock: F) -> Result<(), CoreError> {
    tokio::time::timeout(PROBE_TIMEOUT, lock)
        .await
        .map(|_| ())
        .map_err(|_| CoreError::Internal(format!("{table} table did not respond")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
