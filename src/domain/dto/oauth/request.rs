//! OAuth 요청 DTO
//!
//! 브라우저가 보내는 쿼리 파라미터를 매핑합니다.
use serde::Deserialize;
use validator::Validate;

use crate::oauth::{AuthorizationOptions, CallbackParams};

/// 로그인 시작 쿼리 파라미터 (`GET /auth/authorize`)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AuthorizeQuery {
    /// Google 계정 선택 화면에 미리 채울 이메일
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub login_hint: Option<String>,

    /// `none`, `consent`, `select_account`
    #[validate(length(min = 1, max = 64, message = "prompt 값이 올바르지 않습니다"))]
    pub prompt: Option<String>,
}

impl From<AuthorizeQuery> for AuthorizationOptions {
    fn from(query: AuthorizeQuery) -> Self {
        AuthorizationOptions {
            login_hint: query.login_hint,
            prompt: query.prompt,
            include_granted_scopes: true,
            ..AuthorizationOptions::default()
        }
    }
}

/// OAuth 콜백 쿼리 파라미터 구조체
///
/// 사용자가 동의를 거부하면 `code` 없이 `error`만 전달되므로 모두 선택 필드입니다.
#[derive(Debug, Deserialize, Validate)]
pub struct OAuthCallbackQuery {
    #[validate(length(min = 1, max = 2048, message = "Authorization code 형식이 올바르지 않습니다"))]
    pub code: Option<String>,

    #[validate(length(min = 1, max = 512, message = "State 형식이 올바르지 않습니다"))]
    pub state: Option<String>,

    /// 에러가 있을 경우 (사용자가 거부했거나 에러 발생)
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl From<OAuthCallbackQuery> for CallbackParams {
    fn from(query: OAuthCallbackQuery) -> Self {
        CallbackParams {
            code: query.code,
            state: query.state,
            error: query.error,
            error_description: query.error_description,
        }
    }
}
