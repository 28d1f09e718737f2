//! 실행 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// reconcile 실행 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// 실행 시작 시점의 기존 미래 레코드 수
    pub existing: usize,
    /// 소스에서 수집된 후보 레코드 수
    pub candidates: usize,
    /// 삭제 성공 수
    pub deleted: usize,
    /// 삭제 실패 수 (best-effort, 실행은 계속)
    pub delete_failures: usize,
    /// upsert된 레코드 수
    pub upserted: usize,
    /// 알림 전송 성공 여부
    pub notified: bool,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장소 변경이 전혀 없었는지 확인
    pub fn is_noop(&self) -> bool {
        self.deleted == 0 && self.delete_failures == 0 && self.upserted == 0
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            existing = self.existing,
            candidates = self.candidates,
            deleted = self.deleted,
            delete_failures = self.delete_failures,
            upserted = self.upserted,
            notified = self.notified,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "실행 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_noop() {
        let mut stats = SyncStats::new();
        assert!(stats.is_noop());

        stats.upserted = 1;
        assert!(!stats.is_noop());

        let mut delete_only = SyncStats::new();
        delete_only.deleted = 2;
        assert!(!delete_only.is_noop());
    }
}
