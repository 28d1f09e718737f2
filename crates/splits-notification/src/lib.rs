//! # Splits Notification
//!
//! upsert된 액면분할 레코드의 외부 전파.
//!
//! 지원 채널:
//! - Webhook (bearer token 인증 POST)
//!
//! 알림 실패는 항상 best-effort입니다 — 호출자는 오류를 기록만 하고
//! 실행 실패로 승격시키지 않습니다.

pub mod types;
pub mod webhook;

pub use types::*;
pub use webhook::*;
