use std::path::Path;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::storage::DocumentStore;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 在每个请求间以 Clone 方式共享；内部全部是
/// 池/Arc 句柄，拷贝成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | jwt_service | JWT 验证服务 |
/// | documents | 上传文档的文件系统存储 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt_service: Arc<JwtService>,
    pub documents: DocumentStore,
}

impl ServerState {
    /// 初始化所有服务 (工作目录、数据库、认证、文档存储)
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let work_dir = Path::new(&config.work_dir);
        std::fs::create_dir_all(work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.database_path).await?;
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let documents = DocumentStore::new(work_dir)?;

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service,
            documents,
        })
    }

    /// 数据库连接池快捷访问
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.db.pool
    }
}
