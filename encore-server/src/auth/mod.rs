//! 认证模块 - JWT 验证与角色检查
//!
//! 令牌签发由外部认证服务负责；这里只做验证、解析和角色门禁。

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_role};
