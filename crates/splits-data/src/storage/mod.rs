//! 데이터 저장소.

pub mod splits;

pub use splits::{DeleteOutcome, SplitRow, SplitStore};
