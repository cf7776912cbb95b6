//! Authentication HTTP Handlers
//!
//! Google OAuth 2.0 로그인 플로우의 HTTP 엔드포인트입니다.
//! 인가 시도 식별자와 세션 식별자는 HttpOnly 쿠키로만 전달됩니다.
//!
//! # Endpoints
//!
//! - `GET /auth/authorize` - Google 로그인 페이지로 302 리디렉션
//! - `GET /auth/authorize/url` - 로그인 URL을 JSON으로 반환 (SPA용)
//! - `GET /auth/oauth2callback` - Google 콜백 처리 후 세션 생성
//! - `GET /auth/me` - 현재 세션 조회
//! - `POST /auth/logout` - 세션 종료
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, ResponseError, get, post, web};
use serde_json::json;
use validator::Validate;

use crate::domain::{AuthorizationUrlResponse, AuthorizeQuery, OAuthCallbackQuery, SessionResponse};
use crate::errors::AppError;
use crate::services::auth::{AuthSettings, GoogleAuthService, PendingAuthorization};

/// 인가 시도 식별자 쿠키
pub const FLOW_COOKIE: &str = "oauth_flow";
/// 로그인 세션 쿠키
pub const SESSION_COOKIE: &str = "session_id";

fn flow_cookie(flow_id: String, settings: &AuthSettings) -> Cookie<'static> {
    Cookie::build(FLOW_COOKIE, flow_id)
        .path("/auth")
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(settings.flow_ttl_seconds as i64))
        .finish()
}

fn session_cookie(session_id: String, settings: &AuthSettings) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id)
        .path("/")
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(settings.session_ttl_seconds as i64))
        .finish()
}

fn removal_cookie(name: &'static str, path: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path(path).http_only(true).finish();
    cookie.make_removal();
    cookie
}

async fn start_flow(
    query: AuthorizeQuery,
    service: &GoogleAuthService,
) -> Result<PendingAuthorization, AppError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    service.begin_authorization(query.into()).await
}

/// Google 로그인 시작 핸들러
///
/// 인가 시도 상태를 저장하고 Google 인증 페이지로 리디렉션합니다.
///
/// # Endpoint
/// `GET /auth/authorize?login_hint={email}&prompt={prompt}`
#[get("/authorize")]
pub async fn authorize(
    query: web::Query<AuthorizeQuery>,
    service: web::Data<GoogleAuthService>,
) -> Result<HttpResponse, AppError> {
    let pending = start_flow(query.into_inner(), &service).await?;

    Ok(HttpResponse::Found()
        .append_header((header::LOCATION, pending.authorization_url))
        .cookie(flow_cookie(pending.flow_id, service.settings()))
        .finish())
}

/// Google 로그인 URL 조회 핸들러
///
/// # Endpoint
/// `GET /auth/authorize/url`
#[get("/authorize/url")]
pub async fn authorization_url(
    query: web::Query<AuthorizeQuery>,
    service: web::Data<GoogleAuthService>,
) -> Result<HttpResponse, AppError> {
    let pending = start_flow(query.into_inner(), &service).await?;
    let settings = service.settings();

    Ok(HttpResponse::Ok()
        .cookie(flow_cookie(pending.flow_id, settings))
        .json(AuthorizationUrlResponse {
            authorization_url: pending.authorization_url,
            state: pending.state,
            expires_in: settings.flow_ttl_seconds,
        }))
}

/// Google OAuth 콜백 처리 핸들러
///
/// state 검증, 토큰 교환, ID 토큰 검증을 거쳐 세션을 생성합니다.
///
/// # Endpoint
/// `GET /auth/oauth2callback?code={code}&state={state}`
#[get("/oauth2callback")]
pub async fn oauth2callback(
    req: HttpRequest,
    query: web::Query<OAuthCallbackQuery>,
    service: web::Data<GoogleAuthService>,
) -> Result<HttpResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    if let Some(error) = &query.error {
        log::warn!(
            "Google OAuth 에러: {} - {}",
            error,
            query.error_description.as_deref().unwrap_or("(설명 없음)")
        );
    }

    let flow_id = req.cookie(FLOW_COOKIE).map(|c| c.value().to_string());
    // 저장된 플로우는 이미 소비되었으므로 실패해도 쿠키를 지운다
    let established = match service
        .complete_authorization(flow_id.as_deref(), query.into_inner().into())
        .await
    {
        Ok(established) => established,
        Err(e) => {
            log::warn!("OAuth 콜백 처리 실패: {}", e);
            let mut response = e.error_response();
            response
                .add_cookie(&removal_cookie(FLOW_COOKIE, "/auth"))
                .map_err(|err| AppError::InternalError(err.to_string()))?;
            return Ok(response);
        }
    };

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(FLOW_COOKIE, "/auth"))
        .cookie(session_cookie(established.session_id, service.settings()))
        .json(SessionResponse::from(established.session)))
}

/// 현재 세션 조회 핸들러
///
/// # Endpoint
/// `GET /auth/me`
#[get("/me")]
pub async fn me(
    req: HttpRequest,
    service: web::Data<GoogleAuthService>,
) -> Result<HttpResponse, AppError> {
    let session_id = req
        .cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::AuthenticationError("로그인이 필요합니다".to_string()))?;

    let session = service.current_session(&session_id).await?;

    Ok(HttpResponse::Ok().json(SessionResponse::from(session)))
}

/// 로그아웃 핸들러
///
/// # Endpoint
/// `POST /auth/logout`
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    service: web::Data<GoogleAuthService>,
) -> Result<HttpResponse, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        service.logout(cookie.value()).await?;
    }

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(SESSION_COOKIE, "/"))
        .json(json!({ "message": "로그아웃되었습니다" })))
}
