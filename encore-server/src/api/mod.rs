//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`members`] - 会员 (艺人) 管理接口
//! - [`onboarding`] - 入驻工作流接口 (CRUD、阶段推进、文档、报表)
//! - [`picklists`] - 词表管理接口

pub mod health;
pub mod members;
pub mod onboarding;
pub mod picklists;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};
