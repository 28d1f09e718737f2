//! 액면분할 reconcile 핵심 로직.
//!
//! 이 crate는 다음을 제공합니다:
//! - `SplitRecord`: surrogate key 없이 값 동등성으로 식별되는 도메인 레코드
//! - `reconcile`: 저장소와 소스 간 최소 삭제/삽입 집합 계산
//!
//! I/O가 전혀 없는 순수 로직으로, 수집 파이프라인과 독립적으로 테스트됩니다.

pub mod record;
pub mod reconcile;

pub use record::{SplitRecord, MARKET_SUFFIX};
pub use reconcile::{reconcile, Reconciliation};
