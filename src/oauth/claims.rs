//! OpenID Connect ID 토큰 클레임

use serde::{Deserialize, Serialize};

/// `aud` 클레임은 단일 문자열 또는 배열로 올 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == value,
            Audience::Multiple(list) => list.iter().any(|aud| aud == value),
        }
    }

    /// 두 개 이상의 audience가 있는지 (`azp` 검사 대상)
    pub fn is_multiple(&self) -> bool {
        matches!(self, Audience::Multiple(list) if list.len() > 1)
    }
}

/// 서명과 클레임 검증을 모두 통과한 ID 토큰 페이로드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub iss: String,
    pub sub: String,
    pub aud: Audience,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// 토큰을 요청한 클라이언트 (aud가 여러 개일 때 필수)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Google Workspace 호스티드 도메인
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hd: Option<String>,
}

/// 검증 시 기대하는 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimExpectations {
    /// 보통 클라이언트 ID
    pub audience: String,
    /// 인가 요청 때 발급한 nonce. `None`이면 nonce 검사를 생략합니다.
    pub nonce: Option<String>,
}
