//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] / [`AppResult`] - 应用错误类型
//! - [`ApiResponse`] - API 响应信封
//! - 日志初始化

pub mod error;
pub mod logger;
pub mod result;

pub use error::{ApiResponse, AppError};
pub use error::{ok, ok_with_message};
pub use result::AppResult;
