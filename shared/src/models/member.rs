//! Member Model
//!
//! A member is a signed (or in-progress) artist. Profile, classification
//! and KYC fields live here; the onboarding workflow references a member
//! and cascades questionnaire KYC data back onto it.

use serde::{Deserialize, Serialize};

/// Member lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
}

impl Default for MemberStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Membership tier sold to the artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MembershipType {
    Basic,
    Premium,
    Vip,
}

/// Member entity
///
/// `email` is unique only when present (sparse uniqueness — any number of
/// members may have no email). `member_number` is allocated once from the
/// sequence counter and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    pub member_number: i64,
    pub name: String,
    pub artist_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub tier: Option<String>,
    pub talent_role: Option<String>,
    pub genre: Option<String>,
    pub source: Option<String>,
    pub spoc: Option<String>,
    // KYC
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub pan_number: Option<String>,
    pub aadhar_number: Option<String>,
    pub status: MemberStatus,
    pub membership_type: Option<MembershipType>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create member payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreate {
    pub name: String,
    pub artist_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub tier: Option<String>,
    pub talent_role: Option<String>,
    pub genre: Option<String>,
    pub source: Option<String>,
    pub spoc: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub pan_number: Option<String>,
    pub aadhar_number: Option<String>,
    pub status: Option<MemberStatus>,
    pub membership_type: Option<MembershipType>,
}

/// Update member payload (partial; absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub tier: Option<String>,
    pub talent_role: Option<String>,
    pub genre: Option<String>,
    pub source: Option<String>,
    pub spoc: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub pan_number: Option<String>,
    pub aadhar_number: Option<String>,
    pub status: Option<MemberStatus>,
    pub membership_type: Option<MembershipType>,
}
