//! Data Models
//!
//! Entity structs plus the `*Create` / `*Update` payload DTOs used by the
//! HTTP handlers. Entities derive `sqlx::FromRow` behind the `db` feature
//! so the models crate stays database-free for other consumers.

pub mod member;
pub mod onboarding;
pub mod picklist;
pub mod report;

pub use member::{Member, MemberCreate, MemberStatus, MemberUpdate, MembershipType};
pub use onboarding::{
    ClosureChecklistRow, DocumentMeta, Heat, L1QuestionnaireData, L2ReviewData, Onboarding,
    OnboardingCreate, OnboardingStatus, OnboardingUpdate, StatusField, Step1Data,
    parse_status_field,
};
pub use picklist::{Picklist, PicklistCreate, PicklistItem, PicklistItemCreate};
pub use report::{OnboardingStatusRow, serialize_days_from_eta};
