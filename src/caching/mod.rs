//! 세션 저장 계층 모듈
//!
//! OAuth 인가 시도 상태(FlowState)와 로그인 세션을 TTL과 함께 보관합니다.
//! 서비스 계층은 [`SessionStore`] trait에만 의존하며, 운영 환경에서는
//! [`redis::RedisClient`]가 구현체로 등록됩니다.
//!
//! # 키 규칙
//!
//! ```text
//! oauth:flow:{flow_id}   인가 시도 상태 (콜백 시 GETDEL로 한 번만 소비)
//! session:{session_id}   인증된 사용자 세션
//! ```
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379  # 기본값
//! ```

pub mod redis;

use async_trait::async_trait;

use crate::errors::AppResult;

/// 문자열 값을 TTL과 함께 저장하는 키-값 저장소
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 값을 저장합니다. 같은 키가 있으면 덮어씁니다.
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> AppResult<()>;

    async fn fetch(&self, key: &str) -> AppResult<Option<String>>;

    /// 값을 조회하면서 원자적으로 삭제합니다.
    ///
    /// 동시에 두 번 호출되어도 값은 한 쪽에만 반환됩니다.
    async fn take(&self, key: &str) -> AppResult<Option<String>>;

    async fn remove(&self, key: &str) -> AppResult<()>;
}
