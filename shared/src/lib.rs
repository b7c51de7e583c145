//! Shared types for the Encore CRM
//!
//! Data models and small utilities used by the server crate and by
//! external tooling (report consumers, import scripts).

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
