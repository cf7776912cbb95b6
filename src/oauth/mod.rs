//! OAuth 2.0 Authorization Code 플로우와 OpenID Connect ID 토큰 검증
//!
//! 웹 계층과 저장소에 의존하지 않는 핵심 라이브러리입니다.
//! 외부 호출은 모두 [`http::HttpTransport`]를 통해 이루어집니다.

pub mod claims;
pub mod client_config;
pub mod error;
pub mod flow;
pub mod google;
pub mod http;
pub mod jwks;
pub mod pkce;
pub mod provider;
pub mod state;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{Audience, ClaimExpectations, IdentityClaims};
pub use client_config::{ClientConfig, ClientSecretsSource};
pub use error::{OAuthError, OAuthResult};
pub use flow::{
    AuthorizationOptions, AuthorizationRequest, AuthorizationResponse, AwaitingCallback,
    CallbackParams, FlowOptions, OAuth2FlowService, TokenObtained,
};
pub use google::{GoogleOAuth2FlowService, GoogleProvider, VerifiedIdentity};
pub use http::{HttpResponse, HttpTransport, ReqwestTransport};
pub use jwks::{JwkSet, JwksCache};
pub use provider::IdentityProvider;
pub use state::FlowState;
pub use tokens::TokenCredentials;
