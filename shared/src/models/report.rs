//! Report Rows
//!
//! Derived rows served by `/api/onboarding/reports/onboarding-status` and
//! consumed by the external daily email job.

use serde::{Deserialize, Serialize, Serializer};

use crate::models::{Heat, OnboardingStatus};

/// Serialize `days_from_eta` as a number or the literal `"N/A"`.
///
/// The downstream report template renders the cell verbatim, so the
/// missing-ETA case is the string, not null.
pub fn serialize_days_from_eta<S: Serializer>(
    days: &Option<i64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match days {
        Some(d) => serializer.serialize_i64(*d),
        None => serializer.serialize_str("N/A"),
    }
}

/// One row of the onboarding-status report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingStatusRow {
    pub id: i64,
    pub task_number: i64,
    pub member_id: i64,
    pub artist_name: String,
    pub spoc: Option<String>,
    pub status: OnboardingStatus,
    pub heat: Option<Heat>,
    /// Canonical tier token: `tierN`, a lowercased raw string, or `N/A`
    pub tier: String,
    /// Whole days of `today - eta` (positive = overdue); `"N/A"` without an ETA
    #[serde(serialize_with = "serialize_days_from_eta")]
    #[serde(deserialize_with = "deserialize_days_from_eta")]
    pub days_from_eta: Option<i64>,
}

fn deserialize_days_from_eta<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Days(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Days(d) => Ok(Some(d)),
        Raw::Text(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(days: Option<i64>) -> OnboardingStatusRow {
        OnboardingStatusRow {
            id: 1,
            task_number: 7,
            member_id: 2,
            artist_name: "Asha".into(),
            spoc: None,
            status: OnboardingStatus::ReviewL2,
            heat: Some(Heat::Warm),
            tier: "tier2".into(),
            days_from_eta: days,
        }
    }

    #[test]
    fn days_from_eta_serializes_number_or_na() {
        let v = serde_json::to_value(row(Some(10))).unwrap();
        assert_eq!(v["daysFromEta"], serde_json::json!(10));

        let v = serde_json::to_value(row(None)).unwrap();
        assert_eq!(v["daysFromEta"], serde_json::json!("N/A"));
    }

    #[test]
    fn days_from_eta_round_trips() {
        let json = serde_json::to_string(&row(None)).unwrap();
        let back: OnboardingStatusRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back.days_from_eta, None);
    }
}
