//! OAuth 응답 DTO

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::AuthSession;

/// 인가 URL 응답 (`GET /auth/authorize/url`)
///
/// SPA가 직접 리디렉션을 수행할 때 사용합니다. 플로우 식별자는 쿠키로 전달됩니다.
#[derive(Debug, Serialize)]
pub struct AuthorizationUrlResponse {
    pub authorization_url: String,
    pub state: String,
    pub expires_in: u64,
}

/// 세션 사용자 정보
#[derive(Debug, Serialize)]
pub struct SessionUserResponse {
    pub subject: String,
    pub provider: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// 로그인 세션 응답 (`GET /auth/oauth2callback`, `GET /auth/me`)
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: SessionUserResponse,
    pub authenticated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        SessionResponse {
            user: SessionUserResponse {
                subject: session.subject,
                provider: session.provider,
                email: session.email,
                email_verified: session.email_verified,
                name: session.name,
                picture: session.picture,
            },
            authenticated_at: session.authenticated_at,
            expires_at: session.expires_at,
        }
    }
}
