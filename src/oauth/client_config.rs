//! OAuth 클라이언트 설정
//!
//! 프로바이더가 발급한 클라이언트 정보(엔드포인트, 자격 증명, 등록된 리디렉션 URI)를
//! 표현합니다. Google Cloud Console에서 내려받는 `client_secret_*.json` 형식을
//! 그대로 읽을 수 있습니다.
//!
//! ```json
//! {
//!   "web": {
//!     "client_id": "...apps.googleusercontent.com",
//!     "project_id": "my-project",
//!     "auth_uri": "https://accounts.google.com/o/oauth2/auth",
//!     "token_uri": "https://oauth2.googleapis.com/token",
//!     "auth_provider_x509_cert_url": "https://www.googleapis.com/oauth2/v1/certs",
//!     "client_secret": "...",
//!     "redirect_uris": ["http://localhost:8080/auth/oauth2callback"]
//!   }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{OAuthError, OAuthResult};

/// 프로바이더 클라이언트 설정 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    /// ID 토큰 서명 키(JWKS) 엔드포인트. 없으면 프로바이더 기본값 사용
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_url: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// 클라이언트 시크릿 JSON의 출처
#[derive(Debug, Clone)]
pub enum ClientSecretsSource {
    /// 디스크 상의 JSON 파일 경로
    File(PathBuf),
    /// 이미 메모리에 올라온 JSON 문서 (시크릿 매니저 등에서 조회한 값)
    Json(String),
}

/// Google 형식 시크릿 문서의 최상위 구조
#[derive(Debug, Deserialize)]
struct ClientSecretsDocument {
    web: Option<ClientSecretsSection>,
    installed: Option<ClientSecretsSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsSection {
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    #[serde(default)]
    redirect_uris: Vec<String>,
    project_id: Option<String>,
    cert_url: Option<String>,
}

impl ClientConfig {
    /// 시크릿 소스에서 설정을 읽고 검증합니다.
    ///
    /// `web` 섹션을 우선 사용하고, 없으면 `installed` 섹션을 사용합니다.
    pub fn from_secrets(source: &ClientSecretsSource) -> OAuthResult<Self> {
        let raw = match source {
            ClientSecretsSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                OAuthError::Configuration(format!(
                    "클라이언트 시크릿 파일을 읽을 수 없습니다 ({}): {}",
                    path.display(),
                    e
                ))
            })?,
            ClientSecretsSource::Json(json) => json.clone(),
        };

        let document: ClientSecretsDocument = serde_json::from_str(&raw).map_err(|e| {
            OAuthError::Configuration(format!("클라이언트 시크릿 JSON 형식 오류: {}", e))
        })?;

        let section = document.web.or(document.installed).ok_or_else(|| {
            OAuthError::Configuration("'web' 또는 'installed' 섹션이 없습니다".to_string())
        })?;

        let config = Self {
            client_id: required(section.client_id, "client_id")?,
            client_secret: required(section.client_secret, "client_secret")?,
            auth_uri: required(section.auth_uri, "auth_uri")?,
            token_uri: required(section.token_uri, "token_uri")?,
            cert_url: section.cert_url,
            redirect_uris: section.redirect_uris,
            project_id: section.project_id,
        };

        config.validate()?;
        Ok(config)
    }

    /// 필수 필드와 엔드포인트 URL 형식을 검증합니다.
    pub fn validate(&self) -> OAuthResult<()> {
        for (name, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("auth_uri", &self.auth_uri),
            ("token_uri", &self.token_uri),
        ] {
            if value.trim().is_empty() {
                return Err(OAuthError::Configuration(format!("{}가 비어 있습니다", name)));
            }
        }

        check_url("auth_uri", &self.auth_uri)?;
        check_url("token_uri", &self.token_uri)?;
        if let Some(cert_url) = &self.cert_url {
            check_url("cert_url", cert_url)?;
        }
        for uri in &self.redirect_uris {
            check_url("redirect_uris", uri)?;
        }

        Ok(())
    }

    /// 플로우에 사용할 리디렉션 URI를 결정합니다.
    ///
    /// 명시한 URI가 있으면 등록된 목록에 포함되어 있어야 합니다(목록이 비어 있으면 허용).
    /// 명시하지 않으면 첫 번째 등록 URI를 사용합니다.
    pub fn resolve_redirect_uri(&self, requested: Option<&str>) -> OAuthResult<String> {
        match requested {
            Some(uri) => {
                check_url("redirect_uri", uri)?;
                if !self.redirect_uris.is_empty() && !self.redirect_uris.iter().any(|r| r == uri) {
                    return Err(OAuthError::Configuration(format!(
                        "등록되지 않은 redirect_uri 입니다: {}",
                        uri
                    )));
                }
                Ok(uri.to_string())
            }
            None => self.redirect_uris.first().cloned().ok_or_else(|| {
                OAuthError::Configuration("redirect_uri가 설정되지 않았습니다".to_string())
            }),
        }
    }
}

fn required(value: Option<String>, name: &str) -> OAuthResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| OAuthError::Configuration(format!("{} 필드가 필요합니다", name)))
}

fn check_url(name: &str, value: &str) -> OAuthResult<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| OAuthError::Configuration(format!("{} URL 형식 오류 ({}): {}", name, value, e)))
}
