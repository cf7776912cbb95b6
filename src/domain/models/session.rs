//! 로그인 세션 모델

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::oauth::IdentityClaims;

/// 검증된 ID 토큰으로 만든 서버 측 세션
///
/// 프로바이더 토큰(access/refresh)은 저장하지 않고 신원 정보만 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub subject: String,
    pub provider: String,
    pub issuer: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn from_claims(provider: &str, claims: &IdentityClaims, now: DateTime<Utc>, ttl_seconds: u64) -> Self {
        AuthSession {
            subject: claims.sub.clone(),
            provider: provider.to_string(),
            issuer: claims.iss.clone(),
            email: claims.email.clone(),
            email_verified: claims.email_verified.unwrap_or(false),
            name: claims.name.clone(),
            picture: claims.picture.clone(),
            authenticated_at: now,
            expires_at: now + Duration::seconds(ttl_seconds as i64),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
