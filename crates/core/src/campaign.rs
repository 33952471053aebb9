//! Campaign lifecycle rules.
//!
//! A campaign is a bundle of marketing asset packs that unlocks for every
//! retailer at its launch date, or earlier when an admin unlocks it. The
//! lifecycle is one-way: `scheduled` -> `live`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Scheduled,
    Live,
}

impl CampaignStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        matches!(
            (self, next),
            (CampaignStatus::Scheduled, CampaignStatus::Live)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Live => "live",
        }
    }
}

/// What caused a campaign to go live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchTrigger {
    /// The launcher tick found the launch date had passed.
    Schedule,
    /// An admin forced the unlock.
    Admin,
}

// ---------------------------------------------------------------------------
// Defaults and asset packs
// ---------------------------------------------------------------------------

pub const DEFAULT_TITLE: &str = "SPIRAL National Campaign";
pub const DEFAULT_MESSAGE: &str = "New SPIRAL campaign materials are ready!";
pub const DEFAULT_OPT_OUT_REASON: &str = "Not specified";

pub const DEFAULT_PACKS: [&str; 5] = [
    "TikTok Video Pack",
    "Instagram Graphics Bundle",
    "Facebook & X Posts",
    "QR Flyers & Posters",
    "Email Templates",
];

/// A downloadable pack offered once campaigns are unlocked.
#[derive(Debug, Clone, Serialize)]
pub struct AssetPack {
    pub name: &'static str,
    pub download: &'static str,
    pub description: &'static str,
}

pub const ASSET_PACKS: [AssetPack; 5] = [
    AssetPack {
        name: "TikTok Video Pack",
        download: "/assets/campaigns/tiktok-pack.zip",
        description: "Short-form video templates and trending audio clips",
    },
    AssetPack {
        name: "Instagram Graphics Bundle",
        download: "/assets/campaigns/instagram-pack.zip",
        description: "Stories, posts, and reels graphics with SPIRAL branding",
    },
    AssetPack {
        name: "Facebook & X Posts",
        download: "/assets/campaigns/fb-x-pack.zip",
        description: "Social media posts optimized for Facebook and X",
    },
    AssetPack {
        name: "QR Flyers & Posters",
        download: "/assets/campaigns/qr-flyers.zip",
        description: "Print-ready materials with QR codes for in-store promotion",
    },
    AssetPack {
        name: "Email Templates",
        download: "/assets/campaigns/email-templates.zip",
        description: "Professional email marketing templates for customer outreach",
    },
];

/// Preview image path for a pack: lowercased, whitespace runs collapsed to
/// a single `-`.
pub fn preview_asset_path(pack: &str) -> String {
    let slug = pack
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("/assets/campaigns/preview/{slug}-preview.jpg")
}

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const EVENT_SCHEDULED: &str = "campaign.scheduled";
pub const EVENT_ACTIVATED: &str = "campaign.activated";
pub const EVENT_PREVIEW_ACCESS: &str = "campaign.preview_access";
pub const EVENT_OPT_OUT: &str = "campaign.opt_out";
pub const EVENT_LOCKED: &str = "campaign.locked";
pub const EVENT_NOTIFICATIONS_SENT: &str = "campaign.notifications_sent";

/// Prefix shared by every campaign event type.
pub const EVENT_PREFIX: &str = "campaign.";

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// A campaign is due once the wall clock reaches its launch date.
pub fn is_due(launch_date: Timestamp, now: Timestamp) -> bool {
    now >= launch_date
}

/// Milliseconds until launch, clamped at zero.
pub fn countdown_ms(launch_date: Timestamp, now: Timestamp) -> i64 {
    (launch_date - now).num_milliseconds().max(0)
}

/// Breakdown of a countdown into the units the dashboard displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub countdown: i64,
    pub countdown_minutes: i64,
    pub countdown_hours: i64,
}

impl Countdown {
    pub fn until(launch_date: Timestamp, now: Timestamp) -> Self {
        let ms = countdown_ms(launch_date, now);
        Self {
            countdown: ms,
            countdown_minutes: ms / 1000 / 60,
            countdown_hours: ms / 1000 / 60 / 60,
        }
    }
}

/// Parse a launch date as submitted by the admin scheduler.
///
/// Accepts RFC 3339 (`2025-09-01T09:00:00Z`), a zone-less date-time
/// (`2025-09-01T09:00`, interpreted as UTC), or a bare date (midnight UTC).
pub fn parse_launch_date(raw: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    Err(CoreError::Validation(format!(
        "Invalid launch date '{raw}'. Expected an ISO 8601 date or date-time"
    )))
}

/// Tally opt-out reasons, keyed by reason text.
pub fn tally_reasons<'a>(reasons: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut tally = BTreeMap::new();
    for reason in reasons {
        *tally.entry(reason.to_string()).or_insert(0) += 1;
    }
    tally
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    #[test]
    fn only_scheduled_to_live_is_legal() {
        assert!(CampaignStatus::Scheduled.can_transition_to(CampaignStatus::Live));
        assert!(!CampaignStatus::Live.can_transition_to(CampaignStatus::Scheduled));
        assert!(!CampaignStatus::Live.can_transition_to(CampaignStatus::Live));
        assert!(!CampaignStatus::Scheduled.can_transition_to(CampaignStatus::Scheduled));
    }

    #[test]
    fn preview_path_slugifies_pack_name() {
        assert_eq!(
            preview_asset_path("TikTok Video Pack"),
            "/assets/campaigns/preview/tiktok-video-pack-preview.jpg"
        );
        assert_eq!(
            preview_asset_path("QR  Flyers &\tPosters"),
            "/assets/campaigns/preview/qr-flyers-&-posters-preview.jpg"
        );
    }

    #[test]
    fn countdown_clamps_at_zero() {
        let now = Utc::now();
        assert_eq!(countdown_ms(now - Duration::minutes(5), now), 0);

        let countdown = Countdown::until(now + Duration::minutes(150), now);
        assert_eq!(countdown.countdown, 150 * 60 * 1000);
        assert_eq!(countdown.countdown_minutes, 150);
        assert_eq!(countdown.countdown_hours, 2);
    }

    #[test]
    fn due_at_exact_launch_instant() {
        let now = Utc::now();
        assert!(is_due(now, now));
        assert!(!is_due(now + Duration::seconds(1), now));
    }

    #[test]
    fn parses_supported_launch_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap();
        assert_eq!(parse_launch_date("2025-09-01T09:00:00Z").unwrap(), expected);
        assert_eq!(parse_launch_date("2025-09-01T11:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_launch_date("2025-09-01T09:00").unwrap(), expected);
        assert_eq!(
            parse_launch_date("2025-09-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_unparseable_launch_date() {
        assert_matches!(parse_launch_date("next tuesday"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn reasons_are_tallied() {
        let tally = tally_reasons(["busy", "busy", "Not specified"]);
        assert_eq!(tally["busy"], 2);
        assert_eq!(tally["Not specified"], 1);
    }
}
