//! API 라우트 설정 모듈
//!
//! Google 로그인 플로우 엔드포인트와 헬스체크 엔드포인트를 등록합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use actix_web::{web, App};
//!
//! let app = App::new()
//!     .app_data(web::Data::new(auth_service))
//!     .configure(configure_all_routes);
//! ```

use crate::handlers;
use actix_web::web;
use serde_json::json;

/// 모든 라우트를 설정합니다
///
/// # Arguments
///
/// * `cfg` - Actix-web 서비스 설정 객체
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    // Health check endpoint
    cfg.service(health_check);

    configure_auth_routes(cfg);
}

/// 인증 관련 라우트를 설정합니다
///
/// # Available Routes
///
/// - `GET /auth/authorize` - Google 로그인 페이지로 리디렉션
/// - `GET /auth/authorize/url` - Google 로그인 URL (JSON)
/// - `GET /auth/oauth2callback` - Google OAuth 콜백 처리
/// - `GET /auth/me` - 현재 세션 조회
/// - `POST /auth/logout` - 로그아웃
///
/// # Examples
///
/// ```bash
/// # 브라우저에서 로그인 시작
/// open http://localhost:8080/auth/authorize
///
/// # SPA에서 로그인 URL 받기
/// curl -c cookies.txt http://localhost:8080/auth/authorize/url
/// ```
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(handlers::auth::authorize)
            .service(handlers::auth::authorization_url)
            .service(handlers::auth::oauth2callback)
            .service(handlers::auth::me)
            .service(handlers::auth::logout),
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// # Examples
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "healthy",
///   "service": "oauth_flow_backend",
///   "version": "0.1.0",
///   "timestamp": "2026-01-01T00:00:00Z",
///   "features": {
///     "provider": "Google OAuth 2.0 / OpenID Connect",
///     "session_store": "Redis"
///   }
/// }
/// ```
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "features": {
            "provider": "Google OAuth 2.0 / OpenID Connect",
            "session_store": "Redis"
        }
    }))
}
