//! 도메인 모델

pub mod session;

pub use session::*;
