//! JWKS (JSON Web Key Set) 조회 및 캐시
//!
//! 프로바이더 서명 키는 자주 바뀌지 않으므로 응답의 `Cache-Control: max-age`
//! 동안 재사용합니다. `no-store`/`no-cache`이면 캐시하지 않고, 헤더가 없으면
//! 생성 시 지정한 기본 TTL을 적용합니다.
//!
//! 캐시에 없는 `kid`가 들어오면 키 교체로 보고 한 번 강제로 다시 가져옵니다.
//! 강제 갱신은 URL별로 [`MIN_FORCED_REFRESH_INTERVAL`]에 한 번만 일어납니다.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::error::{OAuthError, OAuthResult};
use super::http::HttpTransport;

/// 단일 JSON Web Key (RSA 공개키만 사용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
    /// RSA modulus (base64url)
    #[serde(default)]
    pub n: Option<String>,
    /// RSA exponent (base64url)
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
    }
}

/// 알 수 없는 `kid`로 인한 강제 갱신 사이의 최소 간격
pub const MIN_FORCED_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

struct CachedKeys {
    keys: JwkSet,
    expires_at: Instant,
}

/// URL별 JWKS 캐시
///
/// 요청 사이에 공유되는 유일한 가변 상태입니다. 락은 await 지점을 넘어
/// 잡지 않습니다.
pub struct JwksCache {
    transport: Arc<dyn HttpTransport>,
    default_ttl: Duration,
    min_refresh_interval: Duration,
    entries: RwLock<HashMap<String, CachedKeys>>,
    forced_at: RwLock<HashMap<String, Instant>>,
}

impl JwksCache {
    pub fn new(transport: Arc<dyn HttpTransport>, default_ttl: Duration) -> Self {
        Self {
            transport,
            default_ttl,
            min_refresh_interval: MIN_FORCED_REFRESH_INTERVAL,
            entries: RwLock::new(HashMap::new()),
            forced_at: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// 캐시가 유효하면 캐시에서, 아니면 네트워크에서 키 집합을 가져옵니다.
    pub async fn get(&self, url: &str) -> OAuthResult<JwkSet> {
        if let Some(keys) = self.cached(url) {
            debug!("JWKS 캐시 적중: {}", url);
            return Ok(keys);
        }
        self.refresh(url).await
    }

    /// 캐시를 무시하고 다시 가져옵니다.
    pub async fn refresh(&self, url: &str) -> OAuthResult<JwkSet> {
        let response = self.transport.get(url).await?;
        if !response.is_success() {
            return Err(OAuthError::UpstreamUnavailable(format!(
                "JWKS 조회 실패 (HTTP {}): {}",
                response.status, url
            )));
        }

        let keys: JwkSet = serde_json::from_str(&response.body)
            .map_err(|e| OAuthError::UnexpectedResponse(format!("JWKS 해석 실패: {}", e)))?;

        let ttl = match response.header("cache-control") {
            Some(value) => cache_ttl(value),
            None => Some(self.default_ttl),
        };

        match ttl {
            Some(ttl) if !ttl.is_zero() => {
                info!("JWKS 갱신: {} ({}개 키, {}초 캐시)", url, keys.keys.len(), ttl.as_secs());
                self.store(url, keys.clone(), ttl);
            }
            _ => {
                debug!("JWKS 캐시 생략: {}", url);
                self.evict(url);
            }
        }

        Ok(keys)
    }

    /// `kid`에 해당하는 키를 찾습니다. 없으면 한 번 강제 갱신 후 다시 찾습니다.
    ///
    /// 최근에 이미 강제 갱신했다면 다시 가져오지 않고 바로 실패합니다.
    pub async fn find_key(&self, url: &str, kid: &str) -> OAuthResult<Jwk> {
        let keys = self.get(url).await?;
        if let Some(key) = keys.find(kid) {
            return Ok(key.clone());
        }

        if !self.claim_forced_refresh(url) {
            warn!("JWKS 강제 갱신 간격 미달, kid '{}' 거부", kid);
            return Err(OAuthError::InvalidToken(format!(
                "서명 키를 찾을 수 없습니다 (kid: {})",
                kid
            )));
        }

        warn!("JWKS에 kid '{}'가 없어 키를 다시 가져옵니다", kid);
        let refreshed = self.refresh(url).await?;
        refreshed.find(kid).cloned().ok_or_else(|| {
            OAuthError::InvalidToken(format!("서명 키를 찾을 수 없습니다 (kid: {})", kid))
        })
    }

    fn claim_forced_refresh(&self, url: &str) -> bool {
        let Ok(mut forced_at) = self.forced_at.write() else {
            return true;
        };
        let now = Instant::now();
        if let Some(last) = forced_at.get(url) {
            if now.duration_since(*last) < self.min_refresh_interval {
                return false;
            }
        }
        forced_at.insert(url.to_string(), now);
        true
    }

    fn cached(&self, url: &str) -> Option<JwkSet> {
        let entries = self.entries.read().ok()?;
        entries
            .get(url)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.keys.clone())
    }

    fn store(&self, url: &str, keys: JwkSet, ttl: Duration) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                url.to_string(),
                CachedKeys {
                    keys,
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }

    fn evict(&self, url: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(url);
        }
    }
}

/// `Cache-Control` 값에서 캐시 기간을 구합니다.
///
/// `no-store`/`no-cache`이면 `None`, `max-age`가 없으면 `None`.
pub fn cache_ttl(cache_control: &str) -> Option<Duration> {
    let mut max_age = None;
    for directive in cache_control.split(',').map(str::trim) {
        let lower = directive.to_ascii_lowercase();
        if lower == "no-store" || lower == "no-cache" {
            return None;
        }
        if let Some(value) = lower.strip_prefix("max-age=") {
            max_age = value.trim_matches('"').parse::<u64>().ok().map(Duration::from_secs);
        }
    }
    max_age
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::http::HttpResponse;
    use crate::oauth::test_support::{MockTransport, jwks_json, PRIMARY_KEY_PEM, ROGUE_KEY_PEM};

    const CERTS: &str = "https://certs.example.com/oauth2/v3/certs";

    #[test]
    fn test_cache_ttl_parsing() {
        assert_eq!(
            cache_ttl("public, max-age=19845, must-revalidate, no-transform"),
            Some(Duration::from_secs(19845))
        );
        assert_eq!(cache_ttl("Max-Age=60"), Some(Duration::from_secs(60)));
        assert_eq!(cache_ttl("no-store"), None);
        assert_eq!(cache_ttl("max-age=60, no-cache"), None);
        assert_eq!(cache_ttl("public"), None);
        assert_eq!(cache_ttl("max-age=abc"), None);
    }

    #[actix_web::test]
    async fn test_keys_cached_for_max_age() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            CERTS,
            HttpResponse::new(200, jwks_json(&[(PRIMARY_KEY_PEM, "key-1")]))
                .with_header("Cache-Control", "public, max-age=3600"),
        );
        let cache = JwksCache::new(transport.clone(), Duration::from_secs(300));

        let first = cache.get(CERTS).await.unwrap();
        let second = cache.get(CERTS).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls_to(CERTS), 1);
    }

    #[actix_web::test]
    async fn test_no_store_is_never_cached() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            CERTS,
            HttpResponse::new(200, jwks_json(&[(PRIMARY_KEY_PEM, "key-1")]))
                .with_header("Cache-Control", "no-store"),
        );
        let cache = JwksCache::new(transport.clone(), Duration::from_secs(300));

        cache.get(CERTS).await.unwrap();
        cache.get(CERTS).await.unwrap();

        assert_eq!(transport.calls_to(CERTS), 2);
    }

    #[actix_web::test]
    async fn test_unknown_kid_forces_single_refresh() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            CERTS,
            HttpResponse::new(200, jwks_json(&[(PRIMARY_KEY_PEM, "key-1")]))
                .with_header("Cache-Control", "max-age=3600"),
        );
        let cache = JwksCache::new(transport.clone(), Duration::from_secs(300))
            .with_min_refresh_interval(Duration::ZERO);
        cache.get(CERTS).await.unwrap();

        // 키 교체: 새 키가 추가된 집합
        transport.respond(
            CERTS,
            HttpResponse::new(
                200,
                jwks_json(&[(PRIMARY_KEY_PEM, "key-1"), (ROGUE_KEY_PEM, "key-2")]),
            )
            .with_header("Cache-Control", "max-age=3600"),
        );

        let rotated = cache.find_key(CERTS, "key-2").await.unwrap();
        assert_eq!(rotated.kid.as_deref(), Some("key-2"));
        assert_eq!(transport.calls_to(CERTS), 2);

        let missing = cache.find_key(CERTS, "key-3").await;
        assert!(matches!(missing, Err(OAuthError::InvalidToken(_))));
        assert_eq!(transport.calls_to(CERTS), 3);
    }

    #[actix_web::test]
    async fn test_forced_refresh_is_throttled_per_url() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            CERTS,
            HttpResponse::new(200, jwks_json(&[(PRIMARY_KEY_PEM, "key-1")]))
                .with_header("Cache-Control", "max-age=3600"),
        );
        let cache = JwksCache::new(transport.clone(), Duration::from_secs(300));

        for kid in ["unknown-1", "unknown-2", "unknown-3"] {
            let result = cache.find_key(CERTS, kid).await;
            assert!(matches!(result, Err(OAuthError::InvalidToken(_))));
        }

        // 최초 조회 1회 + 강제 갱신 1회
        assert_eq!(transport.calls_to(CERTS), 2);
        assert!(cache.find_key(CERTS, "key-1").await.is_ok());
        assert_eq!(transport.calls_to(CERTS), 2);
    }

    #[actix_web::test]
    async fn test_error_status_is_upstream_unavailable() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(CERTS, HttpResponse::new(500, "boom"));
        let cache = JwksCache::new(transport, Duration::from_secs(300));

        assert!(matches!(
            cache.get(CERTS).await,
            Err(OAuthError::UpstreamUnavailable(_))
        ));
    }
}
