//! Google OAuth 2.0 로그인 백엔드
//!
//! Authorization Code 플로우(PKCE, state, nonce)로 Google 사용자를 인증하고
//! 서명 검증된 ID 토큰의 신원 정보로 로그인 세션을 발급합니다.
//!
//! # Features
//!
//! - **인가 URL 생성**: state/nonce/PKCE S256 포함
//! - **콜백 처리**: state 검증 후 코드 교환 (CSRF 방지)
//! - **ID 토큰 검증**: JWKS(RS256) 서명, iss/aud/exp/nonce, hosted domain
//! - **Redis**: 인가 시도 상태와 로그인 세션 저장
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← /auth/*, /health
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 쿠키/쿼리 처리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 로그인 플로우 조율
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │      OAuth      │ ──► │  Google (HTTPS) │
//! └─────────────────┘     └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │      Redis      │ ← 세션 저장소
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use oauth_flow_backend::oauth::{GoogleOAuth2FlowService, AuthorizationOptions};
//!
//! let request = flow.authorization_url(AuthorizationOptions::default());
//! // 브라우저를 request.url 로 보내고 request.flow_state 를 보관
//!
//! let awaiting = flow.resume(request.flow_state);
//! let token = awaiting.process_callback(params).await?;
//! let identity = flow.verify_identity(token).await?;
//! ```

pub mod core;
pub mod config;
pub mod caching;
pub mod domain;
pub mod oauth;
pub mod services;
pub mod routes;
pub mod handlers;
pub mod errors;
