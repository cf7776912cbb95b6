//! Google OAuth 로그인 백엔드 메인 애플리케이션
//!
//! Actix-web 기반의 HTTP 서버를 구동하고 모든 서비스를 초기화합니다.
//! Redis 연결과 Google OAuth 클라이언트를 설정하고 로그인 API를 제공합니다.

use std::io;
use std::sync::Arc;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use actix_governor::{Governor, GovernorConfigBuilder};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use oauth_flow_backend::caching::redis::RedisClient;
use oauth_flow_backend::config::{
    GoogleOAuthConfig, OAuthConfig, RedisConfig, ServerConfig, SessionConfig,
};
use oauth_flow_backend::core::registry::ServiceLocator;
use oauth_flow_backend::oauth::{GoogleOAuth2FlowService, JwksCache, ReqwestTransport};
use oauth_flow_backend::routes::configure_all_routes;
use oauth_flow_backend::services::auth::{AuthSettings, GoogleAuthService};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 Google OAuth 로그인 서비스 시작중...");

    let auth_service = initialize_services().await?;

    // ServiceLocator에 핵심 서비스 등록
    ServiceLocator::set(auth_service).map_err(to_io_error)?;

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    // HTTP 서버 시작
    start_http_server().await
}

/// Redis 연결과 Google OAuth 플로우를 초기화합니다
///
/// 설정 누락이나 연결 실패는 서버를 띄우기 전에 에러로 반환됩니다.
///
/// # Errors
///
/// * Redis 연결 실패
/// * Google 클라이언트 설정 누락 또는 형식 오류
async fn initialize_services() -> io::Result<Arc<GoogleAuthService>> {
    info!("📡 Redis 연결 중...");
    let redis_client = Arc::new(
        RedisClient::connect(&RedisConfig::url())
            .await
            .map_err(to_io_error)?,
    );

    let client_config = GoogleOAuthConfig::client_config().map_err(to_io_error)?;
    info!("🔑 Google OAuth 클라이언트: {}", client_config.client_id);

    let transport = Arc::new(ReqwestTransport::new(OAuthConfig::http_timeout()).map_err(to_io_error)?);
    let jwks = Arc::new(JwksCache::new(transport.clone(), OAuthConfig::jwks_default_ttl()));

    let hosted_domain = GoogleOAuthConfig::hosted_domain();
    if let Some(domain) = &hosted_domain {
        info!("🏢 허용 도메인 제한: {}", domain);
    }

    let flow = GoogleOAuth2FlowService::from_client_config(
        client_config,
        OAuthConfig::scopes(),
        OAuthConfig::flow_options(),
        transport,
        jwks,
    )
    .map_err(to_io_error)?
    .with_hosted_domain(hosted_domain);

    info!("↩️ Redirect URI: {}", flow.flow().redirect_uri());

    let settings = AuthSettings {
        flow_ttl_seconds: OAuthConfig::flow_ttl_seconds(),
        session_ttl_seconds: SessionConfig::ttl_seconds(),
        cookie_secure: SessionConfig::cookie_secure(),
    };

    Ok(Arc::new(GoogleAuthService::new(flow, redis_client, settings)))
}

/// HTTP 서버를 구성하고 실행합니다
///
/// CORS, 로깅, 경로 정규화, Rate Limiting 미들웨어를 포함합니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server() -> io::Result<()> {
    let bind_address = ServerConfig::bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 Login: http://{}/auth/authorize", bind_address);

    // Rate Limiting 설정
    let per_second = ServerConfig::rate_limit_per_second();
    let burst_size = ServerConfig::rate_limit_burst_size();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(per_second)
        .burst_size(burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::other("Rate Limiting 설정이 올바르지 않습니다"))?;

    info!("🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개", per_second, burst_size);

    let auth_service = web::Data::from(
        ServiceLocator::get::<GoogleAuthService>().map_err(to_io_error)?,
    );
    let allowed_origins = ServerConfig::cors_allowed_origins();

    HttpServer::new(move || {
        App::new()
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(configure_cors(&allowed_origins))
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .app_data(auth_service.clone())
            .configure(configure_all_routes)
    })
        .bind(bind_address)?
        .workers(ServerConfig::workers())
        .run()
        .await
}

/// 환경별 설정 파일을 로드합니다
///
/// # Environment Variables
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// # Environment Variables
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=debug")
///
/// ```bash
/// RUST_LOG=oauth_flow_backend::oauth=debug cargo run
/// ```
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// CORS 설정을 구성합니다
///
/// 세션 쿠키를 주고받아야 하므로 자격 증명을 허용하고 Origin은 명시 목록만 허용합니다.
fn configure_cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ACCESS_CONTROL_REQUEST_METHOD,
        ])
        .supports_credentials()
        .max_age(3600)
}

fn to_io_error<E: std::fmt::Display>(e: E) -> io::Error {
    error!("초기화 실패: {}", e);
    io::Error::other(e.to_string())
}
