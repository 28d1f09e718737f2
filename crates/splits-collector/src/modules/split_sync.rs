//! 액면분할 동기화 모듈.
//!
//! 파이프라인: 수집 → 파싱 → reconcile → 삭제(best-effort) →
//! 일괄 upsert(치명적) → 알림(best-effort). 엄격히 순차 실행되며
//! 한 실행 내의 후보 목록 외에는 공유 가변 상태가 없습니다.

use crate::{CollectorConfig, Result, SyncStats};
use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Bangkok;
use splits_core::reconcile;
use splits_data::{SahamIdxFetcher, SplitPageParser, SplitStore};
use splits_notification::{NotificationSender, WebhookNotifier};
use sqlx::PgPool;
use std::time::Instant;

/// 시장 현지 시각(UTC+7) 기준 실행 날짜.
///
/// 미래 이벤트 필터는 전역 시계가 아닌 이 값을 명시적으로 주입받습니다.
fn run_date() -> NaiveDate {
    Utc::now().with_timezone(&Bangkok).date_naive()
}

/// 소스 공시와 저장소의 미래 레코드를 동기화.
///
/// upsert할 것이 없으면 정상적인 no-op으로 종료합니다 (오류 아님).
/// 수집 실패와 일괄 upsert 실패만 실행 전체를 중단시킵니다.
pub async fn sync_splits(pool: &PgPool, config: &CollectorConfig) -> Result<SyncStats> {
    let start = Instant::now();
    let mut stats = SyncStats::new();
    let today = run_date();

    tracing::info!(%today, "액면분할 동기화 시작");

    let store = SplitStore::new(pool.clone());

    // 1. 실행 시작 시점의 기존 미래 레코드 (한 번만 읽음)
    let existing = store.future_records(today).await?;
    stats.existing = existing.len();
    tracing::info!(count = existing.len(), "기존 미래 레코드 조회 완료");

    // 2. 소스 페이지 수집 + 파싱 — 실패 시 저장소 변경 전에 전체 중단
    let parser = SplitPageParser::new(today);
    let fetcher = SahamIdxFetcher::with_pages(config.source.page_urls.clone())
        .with_delay(config.source.request_delay());
    let candidates = fetcher.fetch_split_records(&parser).await?;
    stats.candidates = candidates.len();
    tracing::info!(count = candidates.len(), "후보 레코드 수집 완료");

    // 3. 대칭 차집합 계산
    let diff = reconcile(today, &existing, &candidates);
    tracing::info!(
        to_delete = diff.to_delete.len(),
        to_upsert = diff.to_upsert.len(),
        "reconcile 완료"
    );

    // 4. 소스에서 사라진 레코드 삭제 (레코드별 best-effort)
    if !diff.to_delete.is_empty() {
        tracing::info!("소스 변경으로 인한 레코드 삭제 시작");
        let outcomes = store.delete_records(&diff.to_delete).await;
        stats.deleted = outcomes.iter().filter(|o| o.is_ok()).count();
        stats.delete_failures = outcomes.len() - stats.deleted;
    }

    // 5. upsert할 것이 없으면 정상 no-op 종료
    if diff.to_upsert.is_empty() {
        tracing::info!("upsert할 레코드 없음, 모든 데이터가 최신 상태");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    // 6. 일괄 upsert — 실패는 실행의 치명적 오류
    stats.upserted = store.upsert_records(&diff.to_upsert).await?;

    // 7. 알림 — 실패해도 실행 실패로 승격되지 않음
    let notifier =
        WebhookNotifier::new(config.notify.endpoint.clone(), config.notify.api_key.clone());
    if notifier.is_enabled() {
        match notifier.send_upserted(&diff.to_upsert).await {
            Ok(()) => stats.notified = true,
            Err(e) => tracing::warn!(error = %e, "알림 전송 실패, 무시하고 계속"),
        }
    } else {
        tracing::debug!("알림 비활성 상태 (API 키 없음)");
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
