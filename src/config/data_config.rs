//! 서버, 저장소 및 실행 환경 설정 관리 모듈

use std::env;
use std::str::FromStr;

use log::error;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 개발 환경 - 빠른 개발을 위한 설정
    Development,
    /// 테스트 환경 - 자동화된 테스트용 설정
    Test,
    /// 스테이징 환경 - 프로덕션 유사 환경
    Staging,
    /// 프로덕션 환경 - 최고 수준의 보안
    Production,
}

impl Environment {
    /// 현재 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 환경 변수를 확인하며, 없으면 `PROFILE`(`dev`/`prod`)을 따릅니다.
    /// 둘 다 없으면 `Production`을 기본값으로 사용합니다.
    pub fn current() -> Self {
        let value = env::var("ENVIRONMENT")
            .or_else(|_| env::var("PROFILE"))
            .unwrap_or_else(|_| "production".to_string());
        Self::parse(&value)
    }

    /// 문자열에서 Environment를 생성합니다. 알 수 없는 값은 `Production`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    /// HTTPS 전용 쿠키를 기본으로 써야 하는 환경인지
    pub fn requires_secure_cookies(&self) -> bool {
        matches!(self, Environment::Staging | Environment::Production)
    }
}

/// 환경 변수를 파싱합니다. 없으면 기본값, 파싱 실패 시 에러 로그 후 기본값.
pub(crate) fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|e| {
            error!("{} 파싱 실패: {}. 기본값 {} 사용", name, e, default);
            default
        }),
        Err(_) => default,
    }
}

/// `true/false`, `1/0`, `yes/no`, `on/off`
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|raw| parse_bool(&raw))
        .unwrap_or(default)
}

/// 서버 바인딩 및 HTTP 미들웨어 설정
pub struct ServerConfig;

impl ServerConfig {
    /// 기본값: `127.0.0.1` (`HOST`)
    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
    }

    /// 기본값: 8080 (`PORT`)
    pub fn port() -> u16 {
        env_parse("PORT", 8080)
    }

    pub fn bind_address() -> String {
        format!("{}:{}", Self::host(), Self::port())
    }

    /// 워커 스레드 수. 기본값: 4 (`SERVER_WORKERS`)
    pub fn workers() -> usize {
        env_parse("SERVER_WORKERS", 4)
    }

    /// 초당 허용 요청 수. 기본값: 100 (`RATE_LIMIT_PER_SECOND`)
    pub fn rate_limit_per_second() -> u64 {
        env_parse("RATE_LIMIT_PER_SECOND", 100)
    }

    /// 버스트 허용량. 기본값: 200 (`RATE_LIMIT_BURST_SIZE`)
    pub fn rate_limit_burst_size() -> u32 {
        env_parse("RATE_LIMIT_BURST_SIZE", 200)
    }

    /// CORS 허용 Origin 목록 (`CORS_ALLOWED_ORIGINS`, 쉼표 구분)
    pub fn cors_allowed_origins() -> Vec<String> {
        match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(raw) => split_list(&raw),
            Err(_) => vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
        }
    }
}

/// Redis 연결 설정
pub struct RedisConfig;

impl RedisConfig {
    /// 기본값: `redis://localhost:6379` (`REDIS_URL`)
    pub fn url() -> String {
        env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }
}

/// 쉼표 또는 공백으로 구분된 목록
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_string() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("dev"), Environment::Development);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse("prod"), Environment::Production);
        assert_eq!(Environment::parse("unknown"), Environment::Production);
    }

    #[test]
    fn test_secure_cookie_environments() {
        assert!(!Environment::Development.requires_secure_cookies());
        assert!(!Environment::Test.requires_secure_cookies());
        assert!(Environment::Staging.requires_secure_cookies());
        assert!(Environment::Production.requires_secure_cookies());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("openid, email  profile,,"),
            vec!["openid", "email", "profile"]
        );
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_unset_variable_uses_default() {
        assert_eq!(env_parse("OAUTH_FLOW_BACKEND_TEST_UNSET_VARIABLE", 42u64), 42);
    }
}
