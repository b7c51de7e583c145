//! Onboarding Status Report Derivation
//!
//! Turns raw onboarding/member rows into report rows:
//!
//! - `days_from_eta`: floor whole days of `today - eta`, so positive values
//!   are overdue and negative values are time remaining; absent ETA renders
//!   as `"N/A"`.
//! - `tier`: the member's free-text tier normalized to a canonical `tierN`
//!   token when a digit can be extracted, the lowercased raw string
//!   otherwise, `"N/A"` when absent.

use std::sync::LazyLock;

use regex::Regex;

use crate::db::repository::onboarding::ReportSource;
use shared::models::{Heat, OnboardingStatus, OnboardingStatusRow};

const MILLIS_PER_DAY: i64 = 86_400_000;

static TIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tier\s*(\d+)").expect("tier pattern is valid"));

/// Normalize a free-text tier value to a canonical token
pub fn normalize_tier(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "N/A".to_string();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "N/A".to_string();
    }
    match TIER_PATTERN.captures(trimmed) {
        Some(caps) => format!("tier{}", &caps[1]),
        None => trimmed.to_lowercase(),
    }
}

/// Whole days of `now - eta` (floor division, so -1 means "due tomorrow
/// less than a day out", +10 means ten days overdue)
pub fn days_from_eta(now_millis: i64, eta_millis: i64) -> i64 {
    (now_millis - eta_millis).div_euclid(MILLIS_PER_DAY)
}

/// Build one report row; errors only on corrupt stored enum values
pub fn build_row(src: ReportSource, now_millis: i64) -> Result<OnboardingStatusRow, String> {
    let status = src.status.parse::<OnboardingStatus>()?;
    let heat = src
        .heat
        .as_deref()
        .map(|h| h.parse::<Heat>())
        .transpose()?;

    Ok(OnboardingStatusRow {
        id: src.id,
        task_number: src.task_number,
        member_id: src.member_id,
        artist_name: src.artist_name,
        spoc: src.spoc,
        status,
        heat,
        tier: normalize_tier(src.tier.as_deref()),
        days_from_eta: src.eta_closure.map(|eta| days_from_eta(now_millis, eta)),
    })
}
