//! 액면분할 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - SahamIDX 공시 페이지 크롤러 및 행 정규화 (provider)
//! - PostgreSQL 레코드 저장소: 미래 레코드 조회, 일괄 upsert, 개별 삭제 RPC (storage)

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use provider::{ColumnMap, SahamIdxFetcher, SplitPageParser, DEFAULT_PAGE_URLS};
pub use storage::{DeleteOutcome, SplitRow, SplitStore};
