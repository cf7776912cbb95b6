//! 인가 시도별 상관관계 값(state, nonce)과 FlowState
//!
//! `FlowState`는 인가 URL을 만들 때 생성되어 콜백이 도착할 때 정확히 한 번
//! 소비됩니다. 두 HTTP 왕복 사이에는 호출자(세션 저장소)가 보관합니다.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// CSRF 방지용 state 값
pub fn generate_state() -> String {
    random_token()
}

/// ID 토큰 재전송 방지용 nonce 값
pub fn generate_nonce() -> String {
    random_token()
}

/// 인가 시도 하나에 묶인 임시 데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub state: String,
    pub nonce: String,
    /// PKCE 사용 시에만 존재
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
}

impl FlowState {
    /// 콜백으로 돌아온 state가 발급한 값과 같은지 확인합니다.
    ///
    /// 길이가 같으면 모든 바이트를 비교합니다.
    pub fn matches_state(&self, candidate: &str) -> bool {
        let expected = self.state.as_bytes();
        let candidate = candidate.as_bytes();
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_values_are_unique() {
        let states: HashSet<String> = (0..100).map(|_| generate_state()).collect();
        let nonces: HashSet<String> = (0..100).map(|_| generate_nonce()).collect();

        assert_eq!(states.len(), 100);
        assert_eq!(nonces.len(), 100);
        assert!(states.is_disjoint(&nonces));
    }

    #[test]
    fn test_matches_state() {
        let flow = FlowState {
            state: "abc123".to_string(),
            nonce: "xyz789".to_string(),
            code_verifier: None,
            redirect_uri: "http://localhost:8080/auth/oauth2callback".to_string(),
            created_at: Utc::now(),
        };

        assert!(flow.matches_state("abc123"));
        assert!(!flow.matches_state("abc124"));
        assert!(!flow.matches_state("abc12"));
        assert!(!flow.matches_state(""));
    }
}
