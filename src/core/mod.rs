//! # Core Module
//!
//! 애플리케이션 조립에 필요한 공통 기반 기능을 제공합니다.
//!
//! - [`registry`] - 타입 기반 서비스 레지스트리 (`ServiceLocator`)

pub mod registry;

pub use registry::ServiceLocator;
