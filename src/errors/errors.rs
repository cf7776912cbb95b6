//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 서비스 계층 에러를
//! 일관된 JSON 응답으로 변환합니다. OAuth 플로우 에러는 `From<OAuthError>`로
//! 상태 코드가 결정됩니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//!
//! async fn callback(query: OAuthCallbackQuery) -> Result<HttpResponse, AppError> {
//!     query.validate()
//!         .map_err(|e| AppError::ValidationError(e.to_string()))?;
//!
//!     // OAuthError는 ?로 AppError가 됩니다
//!     let identity = flow.verify_identity(obtained).await?;
//!     Ok(HttpResponse::Ok().json(identity.claims))
//! }
//! ```

use thiserror::Error;

use crate::oauth::OAuthError;

/// 애플리케이션 전역 에러 타입
#[derive(Error, Debug)]
pub enum AppError {
    /// Redis 세션 저장소 에러 (500 Internal Server Error)
    #[error("Redis error: {0}")]
    RedisError(String),

    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 인증 실패 에러 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 권한 부족 / CSRF 의심 (403 Forbidden)
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 외부 서비스 에러 (502 Bad Gateway)
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 에러 타입을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::HttpResponse::build(status)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

impl From<OAuthError> for AppError {
    fn from(error: OAuthError) -> Self {
        match error {
            OAuthError::StateMismatch => AppError::AuthorizationError(error.to_string()),
            OAuthError::AuthorizationDenied { .. } | OAuthError::InvalidCallback(_) => {
                AppError::ValidationError(error.to_string())
            }
            OAuthError::TokenExchange { .. }
            | OAuthError::InvalidToken(_)
            | OAuthError::ExpiredToken
            | OAuthError::ClaimValidation(_) => AppError::AuthenticationError(error.to_string()),
            OAuthError::UpstreamUnavailable(_) | OAuthError::UnexpectedResponse(_) => {
                AppError::ExternalServiceError(error.to_string())
            }
            OAuthError::Configuration(_) => AppError::InternalError(error.to_string()),
        }
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }
}
