//! OAuth 및 세션 관련 설정
//!
//! Google OAuth 클라이언트 정보, 플로우 옵션, 세션 쿠키 설정을 환경 변수에서
//! 읽습니다. 값은 `main`에서 한 번 읽혀 각 서비스 생성자에 명시적으로 전달됩니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! # 1) Google Cloud Console에서 받은 client_secret JSON 파일 사용
//! GOOGLE_CLIENT_SECRETS_FILE=.creds/google_secrets.json
//!
//! # 2) 또는 개별 값 지정
//! GOOGLE_CLIENT_ID=xxxx.apps.googleusercontent.com
//! GOOGLE_CLIENT_SECRET=xxxx
//! GOOGLE_REDIRECT_URI=http://localhost:8080/auth/oauth2callback
//!
//! # 선택
//! GOOGLE_AUTH_URI=https://accounts.google.com/o/oauth2/auth
//! GOOGLE_TOKEN_URI=https://oauth2.googleapis.com/token
//! GOOGLE_CERT_URL=https://www.googleapis.com/oauth2/v3/certs
//! GOOGLE_HOSTED_DOMAIN=example.edu
//! OAUTH_SCOPES="openid email profile"
//! OAUTH_SESSION_TIMEOUT_MINUTES=10
//! OAUTH_USE_PKCE=true
//! OAUTH_ACCESS_TYPE=offline
//! OAUTH_HTTP_TIMEOUT_SECONDS=10
//! OAUTH_JWKS_DEFAULT_TTL_SECONDS=300
//! SESSION_TTL_MINUTES=60
//! SESSION_COOKIE_SECURE=false
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::data_config::{Environment, env_bool, env_parse, split_list};
use crate::oauth::{ClientConfig, ClientSecretsSource, FlowOptions, OAuthError, OAuthResult};

pub const DEFAULT_GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/auth/oauth2callback";

/// Google OAuth 클라이언트 설정
pub struct GoogleOAuthConfig;

impl GoogleOAuthConfig {
    /// 클라이언트 설정을 만듭니다.
    ///
    /// `GOOGLE_CLIENT_SECRETS_FILE`이 있으면 파일을, 없으면 개별 환경 변수를 사용합니다.
    ///
    /// # Errors
    ///
    /// * `OAuthError::Configuration` - 필수 값 누락 또는 형식 오류
    pub fn client_config() -> OAuthResult<ClientConfig> {
        if let Ok(path) = env::var("GOOGLE_CLIENT_SECRETS_FILE") {
            let mut config = ClientConfig::from_secrets(&ClientSecretsSource::File(PathBuf::from(path)))?;
            if config.cert_url.is_none() {
                config.cert_url = env::var("GOOGLE_CERT_URL").ok();
            }
            return Ok(config);
        }

        let config = ClientConfig {
            client_id: required_env("GOOGLE_CLIENT_ID")?,
            client_secret: required_env("GOOGLE_CLIENT_SECRET")?,
            auth_uri: env::var("GOOGLE_AUTH_URI").unwrap_or_else(|_| DEFAULT_GOOGLE_AUTH_URI.to_string()),
            token_uri: env::var("GOOGLE_TOKEN_URI").unwrap_or_else(|_| DEFAULT_GOOGLE_TOKEN_URI.to_string()),
            cert_url: env::var("GOOGLE_CERT_URL").ok(),
            redirect_uris: vec![Self::redirect_uri().unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())],
            project_id: env::var("GOOGLE_PROJECT_ID").ok(),
        };
        config.validate()?;
        Ok(config)
    }

    /// 명시적으로 지정한 redirect URI (`GOOGLE_REDIRECT_URI`)
    pub fn redirect_uri() -> Option<String> {
        env::var("GOOGLE_REDIRECT_URI").ok().filter(|v| !v.is_empty())
    }

    /// 허용할 Google Workspace 도메인 (`GOOGLE_HOSTED_DOMAIN`)
    pub fn hosted_domain() -> Option<String> {
        env::var("GOOGLE_HOSTED_DOMAIN").ok().filter(|v| !v.is_empty())
    }
}

/// OAuth 플로우 설정
pub struct OAuthConfig;

impl OAuthConfig {
    /// 요청 scope. 기본값: `openid email profile`
    pub fn scopes() -> Vec<String> {
        scopes_from(env::var("OAUTH_SCOPES").ok().as_deref())
    }

    /// 인가 시도 상태 보관 시간(분). 기본값: 10
    pub fn session_timeout_minutes() -> u64 {
        env_parse("OAUTH_SESSION_TIMEOUT_MINUTES", 10)
    }

    pub fn flow_ttl_seconds() -> u64 {
        Self::session_timeout_minutes() * 60
    }

    /// PKCE 사용 여부. 기본값: true
    pub fn use_pkce() -> bool {
        env_bool("OAUTH_USE_PKCE", true)
    }

    /// 기본값: `offline` (refresh token 요청). 빈 문자열이면 생략
    pub fn access_type() -> Option<String> {
        match env::var("OAUTH_ACCESS_TYPE") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value.trim().to_string()),
            Err(_) => Some("offline".to_string()),
        }
    }

    /// 토큰/JWKS 호출 타임아웃. 기본값: 10초
    pub fn http_timeout() -> Duration {
        Duration::from_secs(env_parse("OAUTH_HTTP_TIMEOUT_SECONDS", 10))
    }

    /// `Cache-Control`이 없는 JWKS 응답의 캐시 기간. 기본값: 300초
    pub fn jwks_default_ttl() -> Duration {
        Duration::from_secs(env_parse("OAUTH_JWKS_DEFAULT_TTL_SECONDS", 300))
    }

    pub fn flow_options() -> FlowOptions {
        FlowOptions {
            redirect_uri: GoogleOAuthConfig::redirect_uri(),
            use_pkce: Self::use_pkce(),
            access_type: Self::access_type(),
        }
    }
}

/// 로그인 세션 설정
pub struct SessionConfig;

impl SessionConfig {
    /// 세션 유지 시간(분). 기본값: 60
    pub fn ttl_minutes() -> u64 {
        env_parse("SESSION_TTL_MINUTES", 60)
    }

    pub fn ttl_seconds() -> u64 {
        Self::ttl_minutes() * 60
    }

    /// `Secure` 쿠키 여부. 기본값은 실행 환경에 따름
    pub fn cookie_secure() -> bool {
        env_bool(
            "SESSION_COOKIE_SECURE",
            Environment::current().requires_secure_cookies(),
        )
    }
}

/// 비어 있거나 없으면 `openid email profile`
fn scopes_from(raw: Option<&str>) -> Vec<String> {
    let scopes = raw.map(split_list).unwrap_or_default();
    if scopes.is_empty() {
        vec!["openid".to_string(), "email".to_string(), "profile".to_string()]
    } else {
        scopes
    }
}

fn required_env(name: &str) -> OAuthResult<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| OAuthError::Configuration(format!("{} 환경 변수가 설정되지 않았습니다", name)))
}
