//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 `main`에서 설정과 저장소를 주입받아 생성되고
//! [`crate::core::ServiceLocator`]에 등록됩니다.

pub mod auth;
