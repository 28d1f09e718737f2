//! 액면분할 레코드 PostgreSQL 저장소.
//!
//! `idx_stock_split` 테이블에 대한 세 가지 연산을 제공합니다:
//!
//! 1. 미래 레코드 조회 — reconcile의 `Existing` 집합
//! 2. 일괄 upsert — UNNEST 패턴, 실패 시 실행 전체 중단
//! 3. 개별 삭제 RPC — 레코드별 best-effort, 부분 실패 관찰 가능

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use splits_core::SplitRecord;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::{info, instrument, warn};

/// `idx_stock_split` 테이블 행.
#[derive(Debug, Clone, FromRow)]
pub struct SplitRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub split_ratio: Decimal,
    pub cum_date: Option<NaiveDate>,
    pub recording_date: Option<NaiveDate>,
}

impl SplitRow {
    /// 도메인 레코드로 변환.
    pub fn to_record(&self) -> SplitRecord {
        SplitRecord {
            symbol: self.symbol.clone(),
            ex_date: self.date,
            split_ratio: self.split_ratio,
            cum_date: self.cum_date,
            recording_date: self.recording_date,
        }
    }
}

/// 개별 삭제 시도의 결과.
///
/// 삭제 실패는 레코드별로 독립적이므로 예외를 삼키는 대신 결과를
/// 그대로 모아 호출자가 부분 실패를 검사할 수 있게 합니다.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub record: SplitRecord,
    pub error: Option<DataError>,
}

impl DeleteOutcome {
    /// 삭제 성공 여부.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// 액면분할 레코드 저장소.
#[derive(Clone)]
pub struct SplitStore {
    pool: PgPool,
}

impl SplitStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 적용일이 기준일보다 미래인 레코드 전체 조회.
    ///
    /// 실행 시작 시 한 번 읽어 reconcile의 `Existing` 집합으로 사용합니다.
    #[instrument(skip(self))]
    pub async fn future_records(&self, today: NaiveDate) -> Result<Vec<SplitRecord>> {
        let rows: Vec<SplitRow> = sqlx::query_as(
            r#"
            SELECT symbol, date, split_ratio, cum_date, recording_date
            FROM idx_stock_split
            WHERE date > $1
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))?;

        Ok(rows.iter().map(|r| r.to_record()).collect())
    }

    /// 후보 레코드 일괄 upsert.
    ///
    /// UNNEST 패턴으로 한 번에 삽입하며 ON CONFLICT로 중복을 갱신합니다.
    /// 배치 실패는 부분 성공을 추적하지 않고 치명적 오류로 반환됩니다.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn upsert_records(&self, records: &[SplitRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.ex_date).collect();
        let ratios: Vec<Decimal> = records.iter().map(|r| r.split_ratio).collect();
        let cum_dates: Vec<Option<NaiveDate>> = records.iter().map(|r| r.cum_date).collect();
        let recording_dates: Vec<Option<NaiveDate>> =
            records.iter().map(|r| r.recording_date).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO idx_stock_split
                (symbol, date, split_ratio, cum_date, recording_date, updated_at)
            SELECT * FROM UNNEST(
                $1::text[], $2::date[], $3::numeric[], $4::date[], $5::date[]
            ), NOW()
            ON CONFLICT (symbol, date, split_ratio) DO UPDATE SET
                cum_date = EXCLUDED.cum_date,
                recording_date = EXCLUDED.recording_date,
                updated_at = NOW()
            "#,
        )
        .bind(&symbols)
        .bind(&dates)
        .bind(&ratios)
        .bind(&cum_dates)
        .bind(&recording_dates)
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::InsertError(e.to_string()))?;

        let upserted = result.rows_affected() as usize;
        info!(upserted, "레코드 일괄 upsert 완료");

        Ok(upserted)
    }

    /// 삭제 RPC를 레코드별로 호출 (best-effort).
    ///
    /// 개별 실패는 기록하고 나머지 삭제를 계속 진행합니다.
    pub async fn delete_records(&self, records: &[SplitRecord]) -> Vec<DeleteOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());

        for record in records {
            let result = self.delete_record(record).await;
            match &result {
                Ok(()) => {
                    info!(symbol = %record.symbol, date = %record.ex_date, "레코드 삭제 완료");
                }
                Err(e) => {
                    warn!(
                        symbol = %record.symbol,
                        date = %record.ex_date,
                        error = %e,
                        "레코드 삭제 실패, 계속 진행"
                    );
                }
            }
            outcomes.push(DeleteOutcome {
                record: record.clone(),
                error: result.err(),
            });
        }

        outcomes
    }

    /// `delete_stock_split_records` 저장 프로시저 호출.
    ///
    /// surrogate key가 없으므로 값 전체(종목, 날짜, 비율)로 행을 식별합니다.
    pub async fn delete_record(&self, record: &SplitRecord) -> Result<()> {
        let updated_on: DateTime<Utc> = Utc::now();

        sqlx::query("SELECT delete_stock_split_records($1, $2, $3, $4)")
            .bind(&record.symbol)
            .bind(record.ex_date)
            .bind(record.split_ratio)
            .bind(updated_on)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::DeleteError(e.to_string()))?;

        Ok(())
    }
}
