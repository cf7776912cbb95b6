//! # Redis 세션 저장소 구현
//!
//! [`SessionStore`]의 운영 환경 구현체입니다. 모든 값은 TTL과 함께 저장되며
//! 인가 시도 상태는 `GETDEL`로 원자적으로 소비되어 같은 콜백을 두 번 처리할 수
//! 없습니다.
//!
//! ## 연결 관리
//!
//! Redis 연결은 멀티플렉싱을 사용하여 단일 TCP 연결에서
//! 여러 동시 요청을 처리합니다.

use async_trait::async_trait;
use log::{debug, info};
use redis::{AsyncCommands, Client};

use super::SessionStore;
use crate::errors::{AppError, AppResult};

/// Redis 클라이언트 래퍼
///
/// ## 사용 예제
///
/// ```rust,ignore
/// use crate::caching::{SessionStore, redis::RedisClient};
///
/// let redis = RedisClient::connect("redis://localhost:6379").await?;
///
/// // 10분 동안 유지되는 인가 시도 상태
/// redis.put("oauth:flow:3f2a...", &flow_json, 600).await?;
///
/// // 콜백에서 한 번만 꺼내기
/// let flow: Option<String> = redis.take("oauth:flow:3f2a...").await?;
/// ```
#[derive(Clone)]
pub struct RedisClient {
    /// 멀티플렉싱을 지원하는 Redis 클라이언트
    client: Client,
}

impl RedisClient {
    /// Redis 서버에 연결하고 `PING`으로 가용성을 확인합니다.
    ///
    /// ## 인자
    ///
    /// - `redis_url` - `redis://[:password@]host:port[/db]` 형식 주소
    ///
    /// ## 에러
    ///
    /// - URL 형식 오류
    /// - 연결 실패 또는 PING 실패
    pub async fn connect(redis_url: &str) -> AppResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::RedisError(format!("Redis URL 오류: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_error)?;
        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(redis_error)?;

        info!("✅ Redis 연결 성공");

        Ok(Self { client })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_error)
    }
}

fn redis_error(e: redis::RedisError) -> AppError {
    AppError::RedisError(e.to_string())
}

#[async_trait]
impl SessionStore for RedisClient {
    /// `SET key value EX ttl`
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(redis_error)?;
        debug!("Redis 저장: {} (TTL {}초)", key, ttl_seconds);
        Ok(())
    }

    async fn fetch(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(redis_error)
    }

    /// `GETDEL key` (Redis 6.2+)
    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get_del(key).await.map_err(redis_error)
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(redis_error)
    }
}
