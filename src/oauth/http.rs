//! 외부 프로바이더 호출용 HTTP 전송 계층
//!
//! 플로우 서비스는 토큰 엔드포인트(POST form)와 JWKS 엔드포인트(GET) 두 가지
//! 호출만 필요합니다. 이를 [`HttpTransport`] trait 뒤로 숨겨 테스트에서는
//! 모의 전송 계층을 주입합니다. 재시도는 하지 않습니다.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::error::{OAuthError, OAuthResult};

/// 프로바이더 응답 (상태 코드, 헤더, 본문)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// 헤더 이름은 소문자로 보관
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 대소문자 구분 없이 첫 번째 헤더 값을 반환합니다.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// OAuth 엔드포인트 호출 추상화
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// `application/x-www-form-urlencoded` POST
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> OAuthResult<HttpResponse>;

    async fn get(&self, url: &str) -> OAuthResult<HttpResponse>;
}

/// reqwest 기반 기본 전송 계층
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 모든 요청에 `timeout`을 적용하는 클라이언트를 생성합니다.
    pub fn new(timeout: Duration) -> OAuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthError::Configuration(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client })
    }

    async fn into_response(response: reqwest::Response) -> OAuthResult<HttpResponse> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| OAuthError::UpstreamUnavailable(format!("응답 본문 읽기 실패: {}", e)))?;

        Ok(HttpResponse { status, headers, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> OAuthResult<HttpResponse> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| OAuthError::UpstreamUnavailable(format!("POST {} 실패: {}", url, e)))?;

        Self::into_response(response).await
    }

    async fn get(&self, url: &str) -> OAuthResult<HttpResponse> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| OAuthError::UpstreamUnavailable(format!("GET {} 실패: {}", url, e)))?;

        Self::into_response(response).await
    }
}
