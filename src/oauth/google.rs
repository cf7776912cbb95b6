//! # Google OAuth 2.0 / OpenID Connect 프로바이더
//!
//! 범용 플로우 엔진에 Google 고유 값(JWKS 엔드포인트, issuer 목록)을 붙이고
//! ID 토큰 검증을 제공합니다.
//!
//! ## 검증 단계
//!
//! ```text
//! TokenObtained ──verify_identity()──► VerifiedIdentity
//!      │                                   ├─ credentials (access/refresh token)
//!      │ id_token + flow nonce             └─ claims (sub, email, ...)
//!      ▼
//!  JWKS(kid) → RS256 서명 → exp → iss → aud → nonce → hd(선택)
//! ```

use std::sync::Arc;

use log::info;

use super::claims::{ClaimExpectations, IdentityClaims};
use super::client_config::{ClientConfig, ClientSecretsSource};
use super::error::{OAuthError, OAuthResult};
use super::flow::{AuthorizationOptions, AuthorizationRequest, AwaitingCallback, FlowOptions, OAuth2FlowService, TokenObtained};
use super::http::HttpTransport;
use super::jwks::JwksCache;
use super::provider::{self, IdentityProvider};
use super::state::FlowState;
use super::tokens::TokenCredentials;

/// Google OAuth2 v3 JWKS 엔드포인트
pub const GOOGLE_OAUTH2_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Google이 발급하는 ID 토큰의 `iss` 값
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Google 프로바이더 규칙
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    cert_url: String,
    issuers: Vec<String>,
    hosted_domain: Option<String>,
}

impl GoogleProvider {
    pub fn new(cert_url: Option<String>) -> Self {
        Self {
            cert_url: cert_url.unwrap_or_else(|| GOOGLE_OAUTH2_CERTS_URL.to_string()),
            issuers: GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect(),
            hosted_domain: None,
        }
    }

    /// Google Workspace 도메인(`hd` 클레임)을 제한합니다.
    pub fn with_hosted_domain(mut self, domain: Option<String>) -> Self {
        self.hosted_domain = domain.filter(|d| !d.is_empty());
        self
    }
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn cert_url(&self) -> &str {
        &self.cert_url
    }

    fn issuers(&self) -> &[String] {
        &self.issuers
    }

    fn verify_claims(&self, claims: &IdentityClaims, expected: &ClaimExpectations) -> OAuthResult<()> {
        provider::validate_standard_claims(&self.issuers, claims, expected)?;

        if let Some(domain) = &self.hosted_domain {
            if claims.hd.as_deref() != Some(domain.as_str()) {
                return Err(OAuthError::ClaimValidation(format!(
                    "허용되지 않은 Google Workspace 도메인: {}",
                    claims.hd.as_deref().unwrap_or("(없음)")
                )));
            }
        }

        Ok(())
    }
}

/// ID 토큰까지 검증된 최종 단계
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub credentials: TokenCredentials,
    pub claims: IdentityClaims,
}

/// Google 전용 Authorization Code 플로우
#[derive(Clone)]
pub struct GoogleOAuth2FlowService {
    flow: OAuth2FlowService,
    provider: GoogleProvider,
    jwks: Arc<JwksCache>,
}

impl GoogleOAuth2FlowService {
    /// `config.cert_url`이 있으면 Google 기본 JWKS 대신 사용합니다.
    pub fn from_client_config<S>(
        config: ClientConfig,
        scopes: impl IntoIterator<Item = S>,
        options: FlowOptions,
        transport: Arc<dyn HttpTransport>,
        jwks: Arc<JwksCache>,
    ) -> OAuthResult<Self>
    where
        S: Into<String>,
    {
        let provider = GoogleProvider::new(config.cert_url.clone());
        let flow = OAuth2FlowService::from_client_config(config, scopes, options, transport)?;
        Ok(Self { flow, provider, jwks })
    }

    pub fn from_client_secrets<S>(
        source: &ClientSecretsSource,
        scopes: impl IntoIterator<Item = S>,
        options: FlowOptions,
        transport: Arc<dyn HttpTransport>,
        jwks: Arc<JwksCache>,
    ) -> OAuthResult<Self>
    where
        S: Into<String>,
    {
        let config = ClientConfig::from_secrets(source)?;
        Self::from_client_config(config, scopes, options, transport, jwks)
    }

    pub fn with_hosted_domain(mut self, domain: Option<String>) -> Self {
        self.provider = self.provider.with_hosted_domain(domain);
        self
    }

    pub fn flow(&self) -> &OAuth2FlowService {
        &self.flow
    }

    pub fn provider(&self) -> &GoogleProvider {
        &self.provider
    }

    pub fn authorization_url(&self, options: AuthorizationOptions) -> AuthorizationRequest {
        self.flow.authorization_url(options)
    }

    pub fn resume(&self, flow_state: FlowState) -> AwaitingCallback {
        self.flow.resume(flow_state)
    }

    /// ID 토큰을 검증하고 클레임을 반환합니다.
    ///
    /// `nonce`는 인가 요청 때 발급한 값이며, `None`이면 nonce 검사를 생략합니다.
    /// audience는 항상 클라이언트 ID로 검사합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidToken` - 형식 오류, 서명 실패, JWKS에 없는 키
    /// * `ExpiredToken` - `exp` 경과
    /// * `ClaimValidation` - issuer/audience/nonce/hd 불일치
    pub async fn verify_token(&self, id_token: &str, nonce: Option<&str>) -> OAuthResult<IdentityClaims> {
        let expected = ClaimExpectations {
            audience: self.flow.client_config().client_id.clone(),
            nonce: nonce.map(str::to_string),
        };
        provider::verify_id_token(&self.provider, &self.jwks, id_token, &expected).await
    }

    /// 토큰 교환 결과의 ID 토큰을 플로우 nonce로 검증합니다.
    pub async fn verify_identity(&self, obtained: TokenObtained) -> OAuthResult<VerifiedIdentity> {
        let id_token = obtained.id_token().ok_or_else(|| {
            OAuthError::InvalidToken("토큰 응답에 id_token이 없습니다 (openid scope 확인)".to_string())
        })?;

        let claims = self.verify_token(id_token, Some(obtained.nonce())).await?;
        info!("Google 사용자 신원 확인 완료: sub={}", claims.sub);

        Ok(VerifiedIdentity {
            credentials: obtained.into_credentials(),
            claims,
        })
    }
}
