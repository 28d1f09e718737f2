//! 수집 파이프라인 모듈.

pub mod split_sync;

pub use split_sync::sync_splits;
