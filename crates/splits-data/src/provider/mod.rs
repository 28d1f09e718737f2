//! 외부 데이터 소스 provider.

pub mod sahamidx;

pub use sahamidx::{ColumnMap, SahamIdxFetcher, SplitPageParser, DEFAULT_PAGE_URLS};
