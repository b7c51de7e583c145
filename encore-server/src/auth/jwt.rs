//! JWT 令牌服务
//!
//! 校验 `Authorization: Bearer <token>` 里的 HS256 令牌。令牌由外部认证
//! 服务签发（同一共享密钥）；本服务只负责验证与解析。
//! `generate_token` 供测试和运维工具使用。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 共享密钥 (应至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development default");
            "encore-development-secret-do-not-use-in-prod".to_string()
        });
        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12 * 60),
            issuer: "encore".to_string(),
        }
    }
}

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户标识
    pub sub: String,
    /// 显示名
    pub name: String,
    /// 角色: staff | admin
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT 服务 - 令牌生成与验证
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    /// 生成令牌 (测试 / 工具用)
    pub fn generate_token(
        &self,
        user_id: &str,
        name: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.expiration_minutes)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }

    /// 验证令牌并返回 Claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// 从 `Authorization` 头提取 Bearer 令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim)
    }
}

/// 当前请求用户 (由认证中间件注入请求扩展)
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            display_name: claims.name,
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-test-secret-test-secret!".into(),
            expiration_minutes: 5,
            issuer: "encore".into(),
        })
    }

    #[test]
    fn generated_token_validates() {
        let svc = service();
        let token = svc.generate_token("u1", "Priya", "admin").unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        let user = CurrentUser::from(claims);
        assert!(user.is_admin());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let mut token = svc.generate_token("u1", "Priya", "staff").unwrap();
        token.push('x');
        assert!(matches!(
            svc.validate_token(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
