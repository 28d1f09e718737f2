//! Standalone reconciliation collector for IDX stock splits.
//!
//! 이 crate는 SahamIDX 공시와 저장소를 동기화하는 바이너리를 제공합니다:
//! - 공시 페이지 수집 및 행 정규화
//! - 기존 미래 레코드와의 대칭 reconcile
//! - 삭제/upsert 적용 및 외부 엔드포인트 알림

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::SyncStats;
