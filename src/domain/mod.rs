//! # Domain Layer Module
//!
//! HTTP 계약(DTO)과 세션 도메인 모델을 정의합니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── DTOs    - 요청 쿼리 / 응답 본문
//! └── Models  - 로그인 세션 (AuthSession)
//!      │
//!      ▼
//! Application Layer (Services)
//! ```

pub mod dto;
pub mod models;

pub use dto::*;
pub use models::*;
