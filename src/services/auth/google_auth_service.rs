//! # Google OAuth 2.0 로그인 서비스
//!
//! 두 번의 HTTP 요청에 걸친 인가 플로우를 조율합니다. 플로우 엔진은 요청 간
//! 상태를 갖지 않으므로 인가 시도 상태(FlowState)는 세션 저장소에 보관되고
//! 브라우저는 그 식별자만 쿠키로 들고 다닙니다.
//!
//! ## OAuth 2.0 Authorization Code Flow
//!
//! ```text
//! ┌──────────┐              ┌──────────────┐              ┌──────────┐        ┌──────────────┐
//! │ Browser  │              │  이 서버      │              │  Redis   │        │ Google OAuth │
//! └────┬─────┘              └──────┬───────┘              └────┬─────┘        └──────┬───────┘
//!      │ GET /auth/authorize       │                           │                     │
//!      ├──────────────────────────►│ SET oauth:flow:{id} EX    │                     │
//!      │                           ├──────────────────────────►│                     │
//!      │ 302 + oauth_flow 쿠키      │                           │                     │
//!      │◄──────────────────────────┤                           │                     │
//!      │ 사용자 인증/동의                                                               │
//!      ├──────────────────────────────────────────────────────────────────────────────►│
//!      │ GET /auth/oauth2callback?code&state                                           │
//!      ├──────────────────────────►│ GETDEL oauth:flow:{id}    │                     │
//!      │                           ├──────────────────────────►│                     │
//!      │                           │ state 검증 → 토큰 교환 → JWKS로 id_token 검증      │
//!      │                           ├────────────────────────────────────────────────►│
//!      │                           │ SET session:{sid} EX      │                     │
//!      │                           ├──────────────────────────►│                     │
//!      │ 200 + session_id 쿠키      │                           │                     │
//!      │◄──────────────────────────┤                           │                     │
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use log::{info, warn};
use uuid::Uuid;

use crate::caching::SessionStore;
use crate::domain::models::AuthSession;
use crate::errors::{AppError, AppResult, ErrorContext};
use crate::oauth::{
    AuthorizationOptions, CallbackParams, FlowState, GoogleOAuth2FlowService, IdentityProvider,
    OAuthError,
};

/// 인가 시도 상태 키 접두사
pub const FLOW_KEY_PREFIX: &str = "oauth:flow:";
/// 로그인 세션 키 접두사
pub const SESSION_KEY_PREFIX: &str = "session:";

/// 저장 기간과 쿠키 설정
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub flow_ttl_seconds: u64,
    pub session_ttl_seconds: u64,
    pub cookie_secure: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            flow_ttl_seconds: 600,
            session_ttl_seconds: 3600,
            cookie_secure: false,
        }
    }
}

/// 로그인 시작 결과
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    /// 브라우저 쿠키로 전달할 인가 시도 식별자
    pub flow_id: String,
    pub authorization_url: String,
    pub state: String,
}

/// 로그인 완료 결과
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub session_id: String,
    pub session: AuthSession,
}

/// Google 로그인 서비스
///
/// 인가 시도마다 새 FlowState를 만들고, 콜백에서 정확히 한 번 소비합니다.
pub struct GoogleAuthService {
    flow: GoogleOAuth2FlowService,
    store: Arc<dyn SessionStore>,
    settings: AuthSettings,
}

impl GoogleAuthService {
    pub fn new(flow: GoogleOAuth2FlowService, store: Arc<dyn SessionStore>, settings: AuthSettings) -> Self {
        Self { flow, store, settings }
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// 인가 URL을 만들고 FlowState를 저장합니다.
    ///
    /// # 반환값
    ///
    /// * `Ok(PendingAuthorization)` - 리디렉션 URL과 플로우 식별자
    /// * `Err(AppError::RedisError)` - 저장 실패
    pub async fn begin_authorization(&self, options: AuthorizationOptions) -> AppResult<PendingAuthorization> {
        let request = self.flow.authorization_url(options);
        let flow_id = Uuid::new_v4().to_string();

        let payload = serde_json::to_string(&request.flow_state).context("FlowState 직렬화 실패")?;
        self.store
            .put(&flow_key(&flow_id), &payload, self.settings.flow_ttl_seconds)
            .await?;

        info!("🔐 Google 로그인 시작: flow={}", flow_id);

        Ok(PendingAuthorization {
            flow_id,
            authorization_url: request.url,
            state: request.state,
        })
    }

    /// 콜백을 처리하고 세션을 생성합니다.
    ///
    /// 1. 저장된 FlowState를 꺼내면서 삭제 (재사용 불가)
    /// 2. state 검증 (실패 시 토큰 엔드포인트 호출 없음)
    /// 3. 인가 코드 교환
    /// 4. ID 토큰 서명/클레임/nonce 검증
    /// 5. 세션 저장
    ///
    /// # Errors
    ///
    /// * `AuthorizationError` - 알 수 없는/만료된 플로우, state 불일치
    /// * `ValidationError` - 사용자 거부, code 누락
    /// * `AuthenticationError` - 토큰 교환 또는 ID 토큰 검증 실패
    /// * `ExternalServiceError` - Google 통신 실패
    pub async fn complete_authorization(
        &self,
        flow_id: Option<&str>,
        params: CallbackParams,
    ) -> AppResult<EstablishedSession> {
        let flow_state = self.take_flow_state(flow_id).await?;

        let obtained = self.flow.resume(flow_state).process_callback(params).await?;
        let identity = self.flow.verify_identity(obtained).await?;

        let now = Utc::now();
        let session = AuthSession::from_claims(
            self.flow.provider().name(),
            &identity.claims,
            now,
            self.settings.session_ttl_seconds,
        );
        let session_id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(&session).context("세션 직렬화 실패")?;
        self.store
            .put(&session_key(&session_id), &payload, self.settings.session_ttl_seconds)
            .await?;

        info!("✅ Google 로그인 완료: sub={}", session.subject);

        Ok(EstablishedSession { session_id, session })
    }

    /// 세션을 조회합니다.
    pub async fn current_session(&self, session_id: &str) -> AppResult<AuthSession> {
        let unauthenticated = || AppError::AuthenticationError("세션이 없거나 만료되었습니다".to_string());

        if Uuid::parse_str(session_id).is_err() {
            return Err(unauthenticated());
        }

        let key = session_key(session_id);
        let payload = self.store.fetch(&key).await?.ok_or_else(unauthenticated)?;
        let session: AuthSession = serde_json::from_str(&payload).context("세션 역직렬화 실패")?;

        if session.is_expired_at(Utc::now()) {
            self.store.remove(&key).await?;
            return Err(unauthenticated());
        }

        Ok(session)
    }

    /// 세션을 삭제합니다. 없는 세션이어도 성공합니다.
    pub async fn logout(&self, session_id: &str) -> AppResult<()> {
        if Uuid::parse_str(session_id).is_ok() {
            self.store.remove(&session_key(session_id)).await?;
            info!("👋 로그아웃 처리 완료");
        }
        Ok(())
    }

    async fn take_flow_state(&self, flow_id: Option<&str>) -> AppResult<FlowState> {
        let Some(flow_id) = flow_id.filter(|id| Uuid::parse_str(id).is_ok()) else {
            warn!("플로우 식별자 없이 콜백 수신");
            return Err(OAuthError::StateMismatch.into());
        };

        let Some(payload) = self.store.take(&flow_key(flow_id)).await? else {
            warn!("알 수 없거나 이미 사용된 플로우: {}", flow_id);
            return Err(OAuthError::StateMismatch.into());
        };

        let flow_state: FlowState = serde_json::from_str(&payload).context("FlowState 역직렬화 실패")?;

        let deadline = flow_state.created_at + Duration::seconds(self.settings.flow_ttl_seconds as i64);
        if deadline <= Utc::now() {
            warn!("만료된 플로우: {}", flow_id);
            return Err(OAuthError::StateMismatch.into());
        }

        Ok(flow_state)
    }
}

fn flow_key(flow_id: &str) -> String {
    format!("{}{}", FLOW_KEY_PREFIX, flow_id)
}

fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, session_id)
}
