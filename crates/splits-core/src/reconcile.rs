//! 저장소-소스 reconcile 엔진.
//!
//! 새로 수집한 후보 레코드와 저장소의 기존 미래 레코드를 값 동등성 기준으로
//! 대칭 비교하여, 저장소를 소스와 일치시키는 최소 변경 집합을 계산합니다.
//!
//! # 동작 방식
//!
//! 1. 양쪽 입력을 기준일보다 미래인 레코드로 제한 (과거 이력은 불변)
//! 2. `to_delete` = 후보에 없는 기존 레코드 (철회/정정/일정 변경)
//! 3. `to_upsert` = 저장소에 그대로 존재하지 않는 후보 레코드 (신규/변경)
//! 4. 양쪽에 모두 존재하는 레코드는 삭제도 재기록도 하지 않음

use crate::record::SplitRecord;
use chrono::NaiveDate;

/// reconcile 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// 소스에서 사라진 기존 레코드 — 개별 삭제 대상
    pub to_delete: Vec<SplitRecord>,
    /// 저장소에 없는 후보 레코드 — 일괄 upsert 대상
    pub to_upsert: Vec<SplitRecord>,
}

impl Reconciliation {
    /// 양쪽 집합이 모두 비어 있는지 확인 (저장소 쓰기가 전혀 없는 실행).
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_upsert.is_empty()
    }
}

/// 기존 레코드와 후보 레코드의 대칭 차집합을 계산합니다.
///
/// 레코드에는 surrogate key가 없으므로 같은 종목/날짜의 비율 변경은
/// "수정"으로 감지되지 않고 `to_delete`의 구 레코드 + `to_upsert`의
/// 신 레코드 쌍으로 나타납니다. 값 전체가 곧 기본 키입니다.
///
/// 페이지 간 중복 후보는 허용되며 `to_upsert`에서 한 번으로 합쳐집니다.
pub fn reconcile(
    today: NaiveDate,
    existing: &[SplitRecord],
    candidates: &[SplitRecord],
) -> Reconciliation {
    // 과거 날짜 레코드는 어느 쪽에 있든 작업 집합에서 제외
    let existing: Vec<&SplitRecord> = existing.iter().filter(|r| r.is_future(today)).collect();
    let candidates: Vec<&SplitRecord> = candidates.iter().filter(|r| r.is_future(today)).collect();

    let mut to_delete: Vec<SplitRecord> = Vec::new();
    for record in &existing {
        if !candidates.iter().any(|c| c == record) {
            to_delete.push((*record).clone());
        }
    }

    let mut to_upsert: Vec<SplitRecord> = Vec::new();
    for candidate in &candidates {
        if existing.iter().any(|r| r == candidate) {
            continue;
        }
        if to_upsert.iter().any(|u| u == *candidate) {
            continue;
        }
        to_upsert.push((*candidate).clone());
    }

    Reconciliation {
        to_delete,
        to_upsert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(symbol: &str, ex_date: &str, ratio: Decimal) -> SplitRecord {
        SplitRecord {
            symbol: symbol.to_string(),
            ex_date: date(ex_date),
            split_ratio: ratio,
            cum_date: None,
            recording_date: None,
        }
    }

    const TODAY: &str = "2024-01-15";

    #[test]
    fn test_identical_sets_are_noop() {
        let existing = vec![record("ABCD.JK", "2024-02-01", dec!(2.0))];
        let candidates = vec![record("ABCD.JK", "2024-02-01", dec!(2.0))];

        let result = reconcile(date(TODAY), &existing, &candidates);
        assert!(result.is_noop());
    }

    #[test]
    fn test_ratio_change_becomes_delete_plus_upsert() {
        let existing = vec![record("ABCD.JK", "2024-02-01", dec!(2.0))];
        let candidates = vec![record("ABCD.JK", "2024-02-01", dec!(3.0))];

        let result = reconcile(date(TODAY), &existing, &candidates);
        assert_eq!(result.to_delete, vec![record("ABCD.JK", "2024-02-01", dec!(2.0))]);
        assert_eq!(result.to_upsert, vec![record("ABCD.JK", "2024-02-01", dec!(3.0))]);
    }

    #[test]
    fn test_withdrawn_split_is_delete_only() {
        let existing = vec![record("ABCD.JK", "2024-02-01", dec!(2.0))];
        let candidates = vec![];

        let result = reconcile(date(TODAY), &existing, &candidates);
        assert_eq!(result.to_delete.len(), 1);
        assert!(result.to_upsert.is_empty());
    }

    #[test]
    fn test_new_split_is_upsert_only() {
        let existing = vec![];
        let candidates = vec![record("WXYZ.JK", "2024-03-01", dec!(0.1))];

        let result = reconcile(date(TODAY), &existing, &candidates);
        assert!(result.to_delete.is_empty());
        assert_eq!(result.to_upsert.len(), 1);
    }

    #[test]
    fn test_past_records_are_never_touched() {
        // 과거 날짜는 양쪽 모두 작업 집합 밖
        let existing = vec![record("OLDA.JK", "2024-01-01", dec!(2.0))];
        let candidates = vec![record("OLDB.JK", "2024-01-10", dec!(5.0))];

        let result = reconcile(date(TODAY), &existing, &candidates);
        assert!(result.is_noop());
    }

    #[test]
    fn test_run_date_itself_is_not_future() {
        let candidates = vec![record("ABCD.JK", TODAY, dec!(2.0))];
        let result = reconcile(date(TODAY), &[], &candidates);
        assert!(result.to_upsert.is_empty());
    }

    #[test]
    fn test_duplicate_candidates_collapse() {
        let candidates = vec![
            record("ABCD.JK", "2024-02-01", dec!(2.0)),
            record("ABCD.JK", "2024-02-01", dec!(2.0)),
        ];

        let result = reconcile(date(TODAY), &[], &candidates);
        assert_eq!(result.to_upsert.len(), 1);
    }

    #[test]
    fn test_set_identities() {
        let existing = vec![
            record("AAAA.JK", "2024-02-01", dec!(2.0)),
            record("BBBB.JK", "2024-02-05", dec!(4.0)),
        ];
        let candidates = vec![
            record("BBBB.JK", "2024-02-05", dec!(4.0)),
            record("CCCC.JK", "2024-02-10", dec!(0.2)),
        ];

        let result = reconcile(date(TODAY), &existing, &candidates);

        // to_delete ⊆ existing, to_upsert ⊆ candidates
        assert!(result.to_delete.iter().all(|r| existing.contains(r)));
        assert!(result.to_upsert.iter().all(|r| candidates.contains(r)));
        // to_delete ∩ to_upsert = ∅
        assert!(result
            .to_delete
            .iter()
            .all(|r| !result.to_upsert.contains(r)));

        assert_eq!(result.to_delete, vec![record("AAAA.JK", "2024-02-01", dec!(2.0))]);
        assert_eq!(result.to_upsert, vec![record("CCCC.JK", "2024-02-10", dec!(0.2))]);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let existing = vec![
            record("AAAA.JK", "2024-02-01", dec!(2.0)),
            record("BBBB.JK", "2024-02-05", dec!(4.0)),
        ];
        let candidates = vec![
            record("BBBB.JK", "2024-02-05", dec!(4.0)),
            record("AAAA.JK", "2024-02-01", dec!(3.0)),
            record("CCCC.JK", "2024-02-10", dec!(0.2)),
        ];

        let first = reconcile(date(TODAY), &existing, &candidates);

        // 결과를 저장소에 적용: existing' = existing - to_delete + to_upsert
        let mut next_existing: Vec<SplitRecord> = existing
            .iter()
            .filter(|r| !first.to_delete.contains(r))
            .cloned()
            .collect();
        next_existing.extend(first.to_upsert.iter().cloned());

        let second = reconcile(date(TODAY), &next_existing, &candidates);
        assert!(second.is_noop());
    }

    #[test]
    fn test_missing_optional_date_does_not_force_rewrite() {
        // 저장소 레코드에는 cum_date가 없고 소스 레코드에는 있는 경우,
        // 필수 필드가 같으면 동일 레코드로 취급되어 변경이 발생하지 않음
        let existing = vec![record("ABCD.JK", "2024-02-01", dec!(2.0))];
        let mut candidate = record("ABCD.JK", "2024-02-01", dec!(2.0));
        candidate.cum_date = Some(date("2024-01-30"));
        candidate.recording_date = Some(date("2024-01-31"));

        let result = reconcile(date(TODAY), &existing, &[candidate]);
        assert!(result.is_noop());
    }
}
