//! # HTTP Request Handlers Module
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 정의하는 모듈입니다.
//!
//! ## 아키텍처 위치
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   Browser / SPA
//! └─────────────────────┬───────────────────────┘
//!                       │ HTTP Request/Response (쿠키)
//! ┌─────────────────────▼───────────────────────┐
//!   Handlers (이 모듈)                          ← Web Layer
//! ├─────────────────────────────────────────────┤
//!   Services - 로그인 플로우 조율                 ← Service Layer
//! ├─────────────────────────────────────────────┤
//!   OAuth - 인가 URL / 토큰 교환 / ID 토큰 검증    ← Protocol Layer
//! ├─────────────────────────────────────────────┤
//!   Caching - Redis 세션 저장소                  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## 의존성 주입
//!
//! 핸들러는 `web::Data<GoogleAuthService>`로 서비스를 받습니다. 서비스는
//! `main`에서 생성되어 [`crate::core::ServiceLocator`]에 등록된 인스턴스입니다.
//!
//! ```rust,ignore
//! #[get("/me")]
//! pub async fn me(
//!     req: HttpRequest,
//!     service: web::Data<GoogleAuthService>,
//! ) -> Result<HttpResponse, AppError> {
//!     // ...
//! }
//! ```
//!
//! ## 에러 처리
//!
//! 모든 핸들러는 `Result<HttpResponse, AppError>`를 반환하며 `AppError`의
//! `ResponseError` 구현이 상태 코드와 JSON 본문을 결정합니다.

pub mod auth;
