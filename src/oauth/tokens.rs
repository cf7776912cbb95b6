//! 토큰 엔드포인트 응답 모델

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::{OAuthError, OAuthResult};
use super::http::HttpResponse;

/// 인가 코드 교환 결과 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCredentials {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    /// 응답 수신 시각 + `expires_in`
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
}

impl TokenCredentials {
    /// 공백으로 구분된 `scope`를 목록으로 반환합니다.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    id_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// RFC 6749 5.2 에러 응답
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// 토큰 엔드포인트 응답을 해석합니다.
///
/// 2xx가 아니면 `TokenExchange`, 2xx인데 본문이 깨져 있으면 `UnexpectedResponse`.
pub fn parse_token_response(
    response: &HttpResponse,
    received_at: DateTime<Utc>,
) -> OAuthResult<TokenCredentials> {
    if !response.is_success() {
        let (error, description) = match serde_json::from_str::<TokenErrorResponse>(&response.body) {
            Ok(body) => (body.error, body.error_description),
            Err(_) => ("http_error".to_string(), non_empty(&response.body)),
        };
        return Err(OAuthError::TokenExchange {
            status: response.status,
            error,
            description,
        });
    }

    let body: TokenEndpointResponse = serde_json::from_str(&response.body)
        .map_err(|e| OAuthError::UnexpectedResponse(format!("토큰 응답 해석 실패: {}", e)))?;

    if body.access_token.is_empty() {
        return Err(OAuthError::UnexpectedResponse("access_token이 비어 있습니다".to_string()));
    }

    let expires_at = body
        .expires_in
        .map(|secs| {
            Duration::try_seconds(secs)
                .and_then(|lifetime| received_at.checked_add_signed(lifetime))
                .ok_or_else(|| {
                    OAuthError::UnexpectedResponse(format!("expires_in 값이 범위를 벗어났습니다: {}", secs))
                })
        })
        .transpose()?;

    Ok(TokenCredentials {
        expires_at,
        access_token: body.access_token,
        token_type: body.token_type,
        refresh_token: body.refresh_token,
        expires_in: body.expires_in,
        scope: body.scope,
        id_token: body.id_token,
    })
}

fn non_empty(body: &str) -> Option<String> {
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_success_response() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let response = HttpResponse::new(
            200,
            r#"{"access_token":"mock-token","token_type":"Bearer","expires_in":3599,
                "scope":"openid email profile","id_token":"a.b.c"}"#,
        );

        let credentials = parse_token_response(&response, now).unwrap();

        assert_eq!(credentials.access_token, "mock-token");
        assert_eq!(credentials.refresh_token, None);
        assert_eq!(credentials.expires_at, Some(now + Duration::seconds(3599)));
        assert_eq!(credentials.scopes(), vec!["openid", "email", "profile"]);
        assert!(!credentials.is_expired_at(now));
        assert!(credentials.is_expired_at(now + Duration::hours(1)));
    }

    #[test]
    fn test_out_of_range_expires_in_is_unexpected_response() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let response = HttpResponse::new(
            200,
            r#"{"access_token":"t","token_type":"Bearer","expires_in":9223372036854775807}"#,
        );

        let result = parse_token_response(&response, now);

        assert!(matches!(result, Err(OAuthError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_oauth_error_body_becomes_token_exchange_error() {
        let response = HttpResponse::new(
            400,
            r#"{"error":"invalid_grant","error_description":"Malformed auth code."}"#,
        );

        assert_eq!(
            parse_token_response(&response, Utc::now()),
            Err(OAuthError::TokenExchange {
                status: 400,
                error: "invalid_grant".to_string(),
                description: Some("Malformed auth code.".to_string()),
            })
        );
    }

    #[test]
    fn test_non_json_error_keeps_body() {
        let response = HttpResponse::new(503, "Service Unavailable");

        match parse_token_response(&response, Utc::now()) {
            Err(OAuthError::TokenExchange { status, error, description }) => {
                assert_eq!(status, 503);
                assert_eq!(error, "http_error");
                assert_eq!(description.as_deref(), Some("Service Unavailable"));
            }
            other => panic!("Expected TokenExchange, got {:?}", other),
        }
    }

    #[test]
    fn test_garbled_success_body_is_unexpected_response() {
        let response = HttpResponse::new(200, "<html>oops</html>");

        assert!(matches!(
            parse_token_response(&response, Utc::now()),
            Err(OAuthError::UnexpectedResponse(_))
        ));
    }
}
