//! OAuth 2.0 플로우 에러 타입
//!
//! 인가 URL 생성부터 ID 토큰 검증까지 플로우 전 단계에서 발생하는 실패를
//! 하나의 열거형으로 표현합니다. HTTP 계층으로의 변환은
//! [`crate::errors::AppError`]의 `From` 구현이 담당합니다.

use thiserror::Error;

/// OAuth 플로우 에러
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    /// 클라이언트 설정 누락/형식 오류 (생성 시점에 발생)
    #[error("OAuth configuration error: {0}")]
    Configuration(String),

    /// 토큰 엔드포인트가 인가 코드를 거부함
    #[error("Token exchange failed (HTTP {status}): {error}{}", .description.as_deref().map(|d| format!(" - {}", d)).unwrap_or_default())]
    TokenExchange {
        status: u16,
        error: String,
        description: Option<String>,
    },

    /// 서명 검증 실패, 형식 오류, 알 수 없는 서명 키
    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    /// `exp`가 이미 지난 토큰
    #[error("ID token has expired")]
    ExpiredToken,

    /// issuer / audience / nonce 등 클레임 불일치
    #[error("ID token claim validation failed: {0}")]
    ClaimValidation(String),

    /// 콜백의 state가 발급한 값과 다름 (CSRF 의심)
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// 사용자가 동의를 거부했거나 프로바이더가 콜백에 에러를 실어 보냄
    #[error("Authorization denied by provider: {error}{}", .description.as_deref().map(|d| format!(" - {}", d)).unwrap_or_default())]
    AuthorizationDenied {
        error: String,
        description: Option<String>,
    },

    /// 콜백 파라미터 누락/형식 오류
    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    /// 네트워크 타임아웃, DNS 실패 등 전송 계층 에러
    #[error("Upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// 2xx 응답이지만 본문을 해석할 수 없음
    #[error("Unexpected provider response: {0}")]
    UnexpectedResponse(String),
}

/// 편의성을 위한 Result 타입 별칭
pub type OAuthResult<T> = Result<T, OAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_exchange_message_includes_description() {
        let error = OAuthError::TokenExchange {
            status: 400,
            error: "invalid_grant".to_string(),
            description: Some("Bad Request".to_string()),
        };

        assert_eq!(
            error.to_string(),
            "Token exchange failed (HTTP 400): invalid_grant - Bad Request"
        );
    }

    #[test]
    fn test_authorization_denied_without_description() {
        let error = OAuthError::AuthorizationDenied {
            error: "access_denied".to_string(),
            description: None,
        };

        assert_eq!(error.to_string(), "Authorization denied by provider: access_denied");
    }
}
