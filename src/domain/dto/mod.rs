//! 데이터 전송 객체 (Request/Response)

pub mod oauth;

pub use oauth::*;
