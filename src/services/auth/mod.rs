//! 인증 서비스 모듈
//!
//! Google OAuth 2.0 로그인 플로우와 로그인 세션 관리를 담당합니다.
//!
//! # Security
//!
//! - CSRF 방지 (state 검증 후에만 토큰 교환)
//! - 재전송 방지 (nonce 검증, 인가 시도 상태 1회 소비)
//! - PKCE (S256)
//! - 프로바이더 토큰은 세션에 저장하지 않음
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::GoogleAuthService;
//!
//! let pending = auth_service.begin_authorization(AuthorizationOptions::default()).await?;
//! // ... 브라우저 리디렉션 ...
//! let established = auth_service.complete_authorization(Some(&flow_id), params).await?;
//! ```

pub mod google_auth_service;

pub use google_auth_service::*;
