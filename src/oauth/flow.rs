//! OAuth 2.0 Authorization Code 플로우 엔진
//!
//! 플로우는 브라우저 리디렉션을 사이에 둔 두 번의 요청으로 나뉩니다.
//! 각 단계는 별도 타입으로 표현되어 잘못된 순서의 호출은 컴파일되지 않습니다.
//!
//! ```text
//! OAuth2FlowService ──authorization_url()──► AuthorizationRequest (FlowState 포함)
//!        │                                         │ 호출자가 FlowState 보관
//!        └──────────resume(FlowState)──────────────┘
//!                        │
//!                        ▼
//!               AwaitingCallback ──process_callback() / fetch_token()──► TokenObtained
//! ```
//!
//! 서비스 자체는 요청 간 상태를 들고 있지 않으므로 여러 프로세스가 나눠서
//! 두 단계를 처리해도 됩니다.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use url::Url;

use super::client_config::{ClientConfig, ClientSecretsSource};
use super::error::{OAuthError, OAuthResult};
use super::http::HttpTransport;
use super::pkce::{self, CODE_CHALLENGE_METHOD};
use super::state::{self, FlowState};
use super::tokens::{self, TokenCredentials};

/// 플로우 생성 옵션
#[derive(Debug, Clone)]
pub struct FlowOptions {
    /// 지정하지 않으면 클라이언트 설정의 첫 번째 redirect_uri
    pub redirect_uri: Option<String>,
    pub use_pkce: bool,
    /// `offline`이면 refresh token을 함께 요청
    pub access_type: Option<String>,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            redirect_uri: None,
            use_pkce: true,
            access_type: Some("offline".to_string()),
        }
    }
}

/// 인가 URL 생성 옵션
#[derive(Debug, Clone, Default)]
pub struct AuthorizationOptions {
    /// 호출자가 직접 관리하는 state. 없으면 새로 생성
    pub state: Option<String>,
    /// 호출자가 직접 관리하는 nonce. 없으면 새로 생성
    pub nonce: Option<String>,
    pub login_hint: Option<String>,
    /// `consent`, `select_account` 등
    pub prompt: Option<String>,
    pub include_granted_scopes: bool,
}

/// `authorization_url()` 결과
///
/// `flow_state`는 콜백 처리 때까지 호출자가 보관해야 합니다.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub nonce: String,
    pub flow_state: FlowState,
}

/// 콜백 요청의 쿼리 파라미터
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// 전체 콜백 URL에서 파라미터를 추출합니다.
    pub fn from_url(callback_url: &str) -> OAuthResult<Self> {
        let url = Url::parse(callback_url)
            .map_err(|e| OAuthError::InvalidCallback(format!("콜백 URL 형식 오류: {}", e)))?;

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "code" => params.code = value,
                "state" => params.state = value,
                "error" => params.error = value,
                "error_description" => params.error_description = value,
                _ => {}
            }
        }
        Ok(params)
    }
}

/// `fetch_token()` 입력: 전체 콜백 URL 또는 추출된 인가 코드
#[derive(Debug, Clone)]
pub enum AuthorizationResponse {
    /// state 검증까지 수행
    Url(String),
    /// state 검증은 호출자 책임
    Code(String),
}

/// 프로바이더에 묶인 범용 Authorization Code 플로우
#[derive(Clone)]
pub struct OAuth2FlowService {
    config: Arc<ClientConfig>,
    scopes: Vec<String>,
    redirect_uri: String,
    use_pkce: bool,
    access_type: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl OAuth2FlowService {
    /// 클라이언트 설정과 요청 scope로 플로우를 생성합니다.
    ///
    /// # Errors
    ///
    /// * `OAuthError::Configuration` - 필수 필드 누락, URL 형식 오류, scope 없음,
    ///   등록되지 않은 redirect_uri
    pub fn from_client_config<S>(
        config: ClientConfig,
        scopes: impl IntoIterator<Item = S>,
        options: FlowOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> OAuthResult<Self>
    where
        S: Into<String>,
    {
        config.validate()?;

        let scopes: Vec<String> = scopes
            .into_iter()
            .map(Into::into)
            .filter(|scope: &String| !scope.trim().is_empty())
            .collect();
        if scopes.is_empty() {
            return Err(OAuthError::Configuration("요청할 scope가 없습니다".to_string()));
        }

        let redirect_uri = config.resolve_redirect_uri(options.redirect_uri.as_deref())?;

        Ok(Self {
            config: Arc::new(config),
            scopes,
            redirect_uri,
            use_pkce: options.use_pkce,
            access_type: options.access_type.filter(|v| !v.is_empty()),
            transport,
        })
    }

    /// 시크릿 소스(파일 또는 JSON 문서)에서 설정을 읽어 플로우를 생성합니다.
    pub fn from_client_secrets<S>(
        source: &ClientSecretsSource,
        scopes: impl IntoIterator<Item = S>,
        options: FlowOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> OAuthResult<Self>
    where
        S: Into<String>,
    {
        let config = ClientConfig::from_secrets(source)?;
        Self::from_client_config(config, scopes, options, transport)
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// 인가 URL과 이번 시도에 쓸 state/nonce/PKCE 검증자를 생성합니다.
    pub fn authorization_url(&self, options: AuthorizationOptions) -> AuthorizationRequest {
        let state = options
            .state
            .filter(|s| !s.is_empty())
            .unwrap_or_else(state::generate_state);
        let nonce = options
            .nonce
            .filter(|n| !n.is_empty())
            .unwrap_or_else(state::generate_nonce);
        let code_verifier = self.use_pkce.then(pkce::generate_code_verifier);

        let scope = self.scopes.join(" ");
        let mut params: Vec<(&str, String)> = vec![
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", self.redirect_uri.clone()),
            ("response_type", "code".to_string()),
            ("scope", scope),
            ("state", state.clone()),
            ("nonce", nonce.clone()),
        ];
        if let Some(access_type) = &self.access_type {
            params.push(("access_type", access_type.clone()));
        }
        if let Some(verifier) = &code_verifier {
            params.push(("code_challenge", pkce::code_challenge_s256(verifier)));
            params.push(("code_challenge_method", CODE_CHALLENGE_METHOD.to_string()));
        }
        if let Some(login_hint) = options.login_hint {
            params.push(("login_hint", login_hint));
        }
        if let Some(prompt) = options.prompt {
            params.push(("prompt", prompt));
        }
        if options.include_granted_scopes {
            params.push(("include_granted_scopes", "true".to_string()));
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.config.auth_uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{}{}", self.config.auth_uri, separator, query);

        debug!("인가 URL 생성 (pkce: {})", code_verifier.is_some());

        AuthorizationRequest {
            url,
            state: state.clone(),
            nonce: nonce.clone(),
            flow_state: FlowState {
                state,
                nonce,
                code_verifier,
                redirect_uri: self.redirect_uri.clone(),
                created_at: Utc::now(),
            },
        }
    }

    /// 보관해 둔 FlowState로 콜백 대기 단계를 복원합니다.
    pub fn resume(&self, flow_state: FlowState) -> AwaitingCallback {
        AwaitingCallback {
            service: self.clone(),
            flow: flow_state,
        }
    }

    async fn exchange_code(&self, code: &str, flow: &FlowState) -> OAuthResult<TokenCredentials> {
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", flow.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        if let Some(verifier) = &flow.code_verifier {
            form.push(("code_verifier", verifier.as_str()));
        }

        let response = self.transport.post_form(&self.config.token_uri, &form).await?;
        let credentials = tokens::parse_token_response(&response, Utc::now()).inspect_err(|e| {
            warn!("토큰 교환 실패: {}", e);
        })?;

        info!(
            "토큰 교환 성공 (refresh_token: {}, id_token: {})",
            credentials.refresh_token.is_some(),
            credentials.id_token.is_some()
        );
        Ok(credentials)
    }
}

/// 인가 URL을 내보낸 뒤 콜백을 기다리는 단계
pub struct AwaitingCallback {
    service: OAuth2FlowService,
    flow: FlowState,
}

impl AwaitingCallback {
    pub fn flow_state(&self) -> &FlowState {
        &self.flow
    }

    /// 콜백의 state가 발급한 값과 같은지 확인합니다.
    pub fn verify_state(&self, state: Option<&str>) -> OAuthResult<()> {
        match state {
            Some(state) if self.flow.matches_state(state) => Ok(()),
            _ => Err(OAuthError::StateMismatch),
        }
    }

    /// 콜백 파라미터를 처리합니다.
    ///
    /// state 검증이 가장 먼저 수행되며, 실패하면 토큰 엔드포인트를 호출하지 않습니다.
    pub async fn process_callback(self, params: CallbackParams) -> OAuthResult<TokenObtained> {
        if let Err(e) = self.verify_state(params.state.as_deref()) {
            warn!("콜백 state 불일치 - CSRF 의심 요청 거부");
            return Err(e);
        }

        if let Some(error) = params.error {
            return Err(OAuthError::AuthorizationDenied {
                error,
                description: params.error_description,
            });
        }

        let code = params
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| OAuthError::InvalidCallback("code 파라미터가 없습니다".to_string()))?;

        self.exchange(&code).await
    }

    /// 인가 코드를 토큰으로 교환합니다.
    ///
    /// 코드는 프로바이더가 한 번만 받아 주므로 같은 코드로 다시 호출하면
    /// `TokenExchange` 에러가 됩니다.
    pub async fn fetch_token(self, response: AuthorizationResponse) -> OAuthResult<TokenObtained> {
        match response {
            AuthorizationResponse::Url(url) => {
                let params = CallbackParams::from_url(&url)?;
                self.process_callback(params).await
            }
            AuthorizationResponse::Code(code) => {
                if code.is_empty() {
                    return Err(OAuthError::InvalidCallback("인가 코드가 비어 있습니다".to_string()));
                }
                self.exchange(&code).await
            }
        }
    }

    async fn exchange(self, code: &str) -> OAuthResult<TokenObtained> {
        let credentials = self.service.exchange_code(code, &self.flow).await?;
        Ok(TokenObtained {
            flow: self.flow,
            credentials,
        })
    }
}

/// 토큰 교환이 끝난 단계
#[derive(Debug, Clone)]
pub struct TokenObtained {
    flow: FlowState,
    credentials: TokenCredentials,
}

impl TokenObtained {
    pub fn credentials(&self) -> &TokenCredentials {
        &self.credentials
    }

    /// access token
    pub fn token(&self) -> &str {
        &self.credentials.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.credentials.refresh_token.as_deref()
    }

    pub fn id_token(&self) -> Option<&str> {
        self.credentials.id_token.as_deref()
    }

    /// 인가 요청 때 발급한 nonce
    pub fn nonce(&self) -> &str {
        &self.flow.nonce
    }

    pub fn into_credentials(self) -> TokenCredentials {
        self.credentials
    }
}
