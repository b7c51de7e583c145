//! Encore CRM Server - 艺人入驻管理后端
//!
//! # 架构概述
//!
//! - **数据库** (`db`): SQLite (sqlx) 存储, 阶段数据以 JSON 列保存
//! - **认证** (`auth`): JWT Bearer 验证 + 角色门禁
//! - **HTTP API** (`api`): 会员 / 入驻工作流 / 词表 / 报表
//! - **文档存储** (`storage`): 上传文件的文件系统 blob 存储
//!
//! # 模块结构
//!
//! ```text
//! encore-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (repository)
//! ├── storage/       # 文档 blob 存储
//! └── utils/         # 错误、日志等工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use storage::DocumentStore;
pub use utils::{ApiResponse, AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
