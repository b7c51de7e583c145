//! Onboarding Model
//!
//! One onboarding record tracks a single artist engagement through the
//! staged workflow:
//!
//! ```text
//! pending → contact-established → spoc-assigned → review-l2 → closed-won
//!                                                           ↘ closed-lost
//! ```
//!
//! Each stage stores its captured data in a dedicated payload
//! (`step1_data`, `l1_questionnaire_data`, `l2_review_data`). The informal
//! hot/warm/cold classification used by reporting is a separate [`Heat`]
//! field and never gates the formal transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Formal workflow status (canonical vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStatus {
    Pending,
    ContactEstablished,
    SpocAssigned,
    ReviewL2,
    ClosedWon,
    ClosedLost,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ContactEstablished => "contact-established",
            Self::SpocAssigned => "spoc-assigned",
            Self::ReviewL2 => "review-l2",
            Self::ClosedWon => "closed-won",
            Self::ClosedLost => "closed-lost",
        }
    }

    /// Terminal statuses end the engagement; no further stage writes expected.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

impl Default for OnboardingStatus {
    fn default() -> Self {
        // Intake creates records with contact already established
        Self::ContactEstablished
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OnboardingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "contact-established" => Ok(Self::ContactEstablished),
            "spoc-assigned" => Ok(Self::SpocAssigned),
            "review-l2" => Ok(Self::ReviewL2),
            "closed-won" => Ok(Self::ClosedWon),
            "closed-lost" => Ok(Self::ClosedLost),
            other => Err(format!("unknown onboarding status '{other}'")),
        }
    }
}

/// Informal reporting classification (legacy "heat" vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Heat {
    Hot,
    Warm,
    Cold,
    ColdStorage,
}

impl Heat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Cold => "cold",
            Self::ColdStorage => "cold-storage",
        }
    }
}

impl fmt::Display for Heat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Heat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(Self::Hot),
            "warm" => Ok(Self::Warm),
            "cold" => Ok(Self::Cold),
            "cold-storage" => Ok(Self::ColdStorage),
            other => Err(format!("unknown heat '{other}'")),
        }
    }
}

/// A value arriving in a `status` position of the legacy API.
///
/// Older clients wrote heat tokens (hot/warm/cold/cold-storage) into the
/// status field. The compat shim routes those to [`Heat`] instead of
/// widening the formal status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Status(OnboardingStatus),
    Heat(Heat),
}

/// Parse a raw status string, accepting both vocabularies.
///
/// Comparison is case-insensitive; the canonical enum wins when a token is
/// somehow valid in both (none are today).
pub fn parse_status_field(raw: &str) -> Result<StatusField, String> {
    let token = raw.trim().to_lowercase();
    if let Ok(status) = token.parse::<OnboardingStatus>() {
        return Ok(StatusField::Status(status));
    }
    if let Ok(heat) = token.parse::<Heat>() {
        return Ok(StatusField::Heat(heat));
    }
    Err(format!("unknown status '{raw}'"))
}

/// Stage 1 payload — initial source/contact capture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Data {
    pub source: Option<String>,
    pub contact_status: Option<String>,
    pub notes: Option<String>,
}

/// L1 questionnaire payload — the full artist profile
///
/// Everything is optional; the form is filled incrementally and replaced
/// wholesale on each submit. The five KYC fields are cascaded onto the
/// linked member when this stage is advanced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1QuestionnaireData {
    // Identity
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    // Representation
    pub manager_name: Option<String>,
    pub manager_phone: Option<String>,
    pub manager_email: Option<String>,
    pub agency: Option<String>,
    // Socials
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub spotify: Option<String>,
    pub website: Option<String>,
    // Professional
    pub category: Option<String>,
    pub genre: Option<String>,
    pub languages: Option<String>,
    pub experience_years: Option<i64>,
    pub current_projects: Option<String>,
    pub notable_works: Option<String>,
    // KYC
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub pan_number: Option<String>,
    pub aadhar_number: Option<String>,
    // Consent
    pub agreement_accepted: Option<bool>,
    pub data_consent: Option<bool>,
    pub notes: Option<String>,
}

/// One free-form closure-checklist row (consumed by the daily report job)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureChecklistRow {
    pub status: Option<String>,
    pub spoc: Option<String>,
    pub eta: Option<String>,
}

/// Metadata of an uploaded document (the bytes live in the blob store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub title: String,
    pub description: Option<String>,
    /// Stable locator into the blob store
    pub path: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_at: i64,
}

/// L2 review payload — meeting + verification checklist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2ReviewData {
    pub meeting_date: Option<String>,
    pub meeting_mode: Option<String>,
    pub meeting_notes: Option<String>,
    // Fixed checklist
    #[serde(default)]
    pub profile_verified: bool,
    #[serde(default)]
    pub kyc_verified: bool,
    #[serde(default)]
    pub agreement_signed: bool,
    #[serde(default)]
    pub fee_discussed: bool,
    pub membership_type: Option<crate::models::MembershipType>,
    pub notes: Option<String>,
    #[serde(default)]
    pub closure_checklist: Vec<ClosureChecklistRow>,
    /// Preserved across l2-review updates that omit it (merge, not replace)
    #[serde(default)]
    pub documents: Vec<DocumentMeta>,
}

/// Onboarding entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    pub id: i64,
    pub task_number: i64,
    pub member_id: i64,
    /// Denormalized from the member at creation time
    pub artist_name: String,
    pub spoc: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Target closure date (millis since epoch)
    pub eta_closure: Option<i64>,
    pub status: OnboardingStatus,
    pub heat: Option<Heat>,
    pub step1_data: Option<Step1Data>,
    pub l1_questionnaire_data: Option<L1QuestionnaireData>,
    pub l2_review_data: Option<L2ReviewData>,
    pub created_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create onboarding payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingCreate {
    pub member_id: i64,
    pub artist_name: Option<String>,
    pub spoc: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub eta_closure: Option<i64>,
    /// Canonical status or a legacy heat token (compat shim)
    pub status: Option<String>,
}

/// Update onboarding payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingUpdate {
    pub artist_name: Option<String>,
    pub spoc: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub eta_closure: Option<i64>,
    pub status: Option<String>,
    pub heat: Option<Heat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            OnboardingStatus::Pending,
            OnboardingStatus::ContactEstablished,
            OnboardingStatus::SpocAssigned,
            OnboardingStatus::ReviewL2,
            OnboardingStatus::ClosedWon,
            OnboardingStatus::ClosedLost,
        ] {
            assert_eq!(s.as_str().parse::<OnboardingStatus>().unwrap(), s);
        }
        assert!(OnboardingStatus::ClosedWon.is_closed());
        assert!(!OnboardingStatus::ReviewL2.is_closed());
    }

    #[test]
    fn legacy_heat_tokens_route_to_heat() {
        assert_eq!(
            parse_status_field("hot").unwrap(),
            StatusField::Heat(Heat::Hot)
        );
        assert_eq!(
            parse_status_field("Cold-Storage").unwrap(),
            StatusField::Heat(Heat::ColdStorage)
        );
        assert_eq!(
            parse_status_field("closed-won").unwrap(),
            StatusField::Status(OnboardingStatus::ClosedWon)
        );
        assert!(parse_status_field("lukewarm").is_err());
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&OnboardingStatus::ContactEstablished).unwrap();
        assert_eq!(json, "\"contact-established\"");
    }

    #[test]
    fn l2_review_defaults_keep_documents_empty() {
        let l2: L2ReviewData = serde_json::from_str("{}").unwrap();
        assert!(l2.documents.is_empty());
        assert!(l2.closure_checklist.is_empty());
        assert!(!l2.kyc_verified);
    }
}
