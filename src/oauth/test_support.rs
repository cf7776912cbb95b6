//! 테스트 공용 도구: 모의 프로바이더 전송 계층, 고정 RSA 키, 메모리 세션 저장소

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use serde_json::{Value, json};

use crate::caching::SessionStore;
use crate::errors::AppResult;
use crate::oauth::client_config::ClientConfig;
use crate::oauth::error::{OAuthError, OAuthResult};
use crate::oauth::http::{HttpResponse, HttpTransport};

pub const PRIMARY_KEY_PEM: &str = include_str!("testdata/rsa_key_primary.pem");
/// JWKS에 게시되지 않는 키
pub const ROGUE_KEY_PEM: &str = include_str!("testdata/rsa_key_rogue.pem");
pub const PRIMARY_KID: &str = "primary-key";

pub const TEST_CLIENT_ID: &str = "test-client-id.apps.googleusercontent.com";
pub const AUTH_URI: &str = "https://auth.example.com/o/oauth2/auth";
pub const TOKEN_URI: &str = "https://auth.example.com/token";
pub const CERTS_URL: &str = "https://auth.example.com/oauth2/v3/certs";
pub const REDIRECT_URI: &str = "http://localhost:8080/auth/oauth2callback";
pub const MOCK_SUBJECT: &str = "110169484474386276334";

/// 모의 전송 계층이 기록한 요청
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> HttpResponse + Send + Sync>;

/// URL별 응답을 돌려주고 모든 호출을 기록하는 전송 계층
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Responder>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항상 같은 응답을 돌려줍니다.
    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.route(url, move |_| response.clone());
    }

    pub fn route<F>(&self, url: &str, responder: F)
    where
        F: Fn(&RecordedRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Arc::new(responder));
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.url == url)
            .count()
    }

    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.url == url)
            .cloned()
            .collect()
    }

    fn dispatch(&self, request: RecordedRequest) -> OAuthResult<HttpResponse> {
        let responder = self.routes.lock().unwrap().get(&request.url).cloned();
        self.requests.lock().unwrap().push(request.clone());
        match responder {
            Some(responder) => Ok(responder(&request)),
            None => Err(OAuthError::UpstreamUnavailable(format!(
                "connection refused: {}",
                request.url
            ))),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> OAuthResult<HttpResponse> {
        self.dispatch(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    async fn get(&self, url: &str) -> OAuthResult<HttpResponse> {
        self.dispatch(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            form: Vec::new(),
        })
    }
}

/// 모의 프로바이더를 가리키는 클라이언트 설정
pub fn test_client_config() -> ClientConfig {
    ClientConfig {
        client_id: TEST_CLIENT_ID.to_string(),
        client_secret: "test-client-secret".to_string(),
        auth_uri: AUTH_URI.to_string(),
        token_uri: TOKEN_URI.to_string(),
        cert_url: Some(CERTS_URL.to_string()),
        redirect_uris: vec![REDIRECT_URI.to_string()],
        project_id: Some("course-planner-test".to_string()),
    }
}

/// PEM 개인키에서 공개 JWK를 만듭니다.
pub fn jwk_json(pem: &str, kid: &str) -> Value {
    let private_key = RsaPrivateKey::from_pkcs1_pem(pem).unwrap();
    json!({
        "kty": "RSA",
        "alg": "RS256",
        "use": "sig",
        "kid": kid,
        "n": URL_SAFE_NO_PAD.encode(private_key.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(private_key.e().to_bytes_be()),
    })
}

pub fn jwks_json(keys: &[(&str, &str)]) -> String {
    let keys: Vec<Value> = keys.iter().map(|(pem, kid)| jwk_json(pem, kid)).collect();
    json!({ "keys": keys }).to_string()
}

/// 게시된 기본 키 하나로 JWKS 엔드포인트를 등록합니다.
pub fn publish_primary_jwks(transport: &MockTransport) {
    transport.respond(
        CERTS_URL,
        HttpResponse::new(200, jwks_json(&[(PRIMARY_KEY_PEM, PRIMARY_KID)]))
            .with_header("Cache-Control", "public, max-age=3600"),
    );
}

pub fn sign_id_token(pem: &str, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

/// 검증을 통과하는 기본 클레임
pub fn id_token_claims(nonce: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": "https://accounts.google.com",
        "azp": TEST_CLIENT_ID,
        "aud": TEST_CLIENT_ID,
        "sub": MOCK_SUBJECT,
        "email": "student@example.edu",
        "email_verified": true,
        "name": "Kim Student",
        "picture": "https://lh3.googleusercontent.com/a/photo.jpg",
        "nonce": nonce,
        "iat": now,
        "exp": now + 3600,
    })
}

/// 인가 코드 하나를 정확히 한 번만 받아 주는 토큰 엔드포인트를 등록합니다.
pub fn single_use_token_endpoint(transport: &MockTransport, code: &str, id_token: Option<String>) {
    let accepted_code = code.to_string();
    let consumed = AtomicBool::new(false);
    transport.route(TOKEN_URI, move |request| {
        let valid = request.form_value("grant_type") == Some("authorization_code")
            && request.form_value("code") == Some(accepted_code.as_str());
        if valid && !consumed.swap(true, Ordering::SeqCst) {
            let mut body = json!({
                "access_token": "mock-token",
                "token_type": "Bearer",
                "expires_in": 3599,
                "refresh_token": "mock-refresh-token",
                "scope": "openid https://www.googleapis.com/auth/userinfo.email",
            });
            if let Some(id_token) = &id_token {
                body["id_token"] = json!(id_token);
            }
            HttpResponse::new(200, body.to_string())
        } else {
            HttpResponse::new(
                400,
                json!({"error": "invalid_grant", "error_description": "Bad Request"}).to_string(),
            )
        }
    });
}

/// TTL을 무시하는 메모리 세션 저장소
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, key: &str, value: &str, _ttl_seconds: u64) -> AppResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn fetch(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.lock().unwrap().remove(key))
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
