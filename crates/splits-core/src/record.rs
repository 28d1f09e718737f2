//! 액면분할 레코드 도메인 모델.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// IDX 종목 코드에 붙는 시장 접미사 (예: "BBCA" -> "BBCA.JK")
pub const MARKET_SUFFIX: &str = ".JK";

/// 액면분할(또는 병합) 이벤트 레코드.
///
/// surrogate key가 없으며, 채워진 필드 값 전체가 곧 레코드의 식별자입니다.
/// 같은 종목/날짜의 비율 변경은 별개의 레코드로 취급되어
/// 삭제+삽입 쌍으로 모델링됩니다.
///
/// 옵션 날짜 필드는 소스 스키마 버전에 따라 없을 수 있으므로,
/// 양쪽 레코드 모두 값이 있을 때만 동등성 비교에 참여합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitRecord {
    /// 시장 접미사가 붙은 종목 코드 (예: "BBCA.JK")
    pub symbol: String,
    /// 분할 적용일 (Ex Date) — reconcile이 기준으로 삼는 날짜
    #[serde(rename = "date")]
    pub ex_date: NaiveDate,
    /// 분할 비율 = 분할 후 주식 수 / 분할 전 주식 수 (소수점 5자리 반올림)
    ///
    /// 항상 ratio 셀의 양변에서 파생되며, 1 미만이면 주식 병합(reverse split)입니다.
    pub split_ratio: Decimal,
    /// Cum Date (마지막 권리부 거래일)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cum_date: Option<NaiveDate>,
    /// Recording Date (주주명부 기준일)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_date: Option<NaiveDate>,
}

impl SplitRecord {
    /// 적용일이 기준일보다 엄격히 미래인지 확인.
    ///
    /// 과거 날짜 레코드는 불변 이력이므로 reconcile 작업 집합에서 제외됩니다.
    pub fn is_future(&self, today: NaiveDate) -> bool {
        self.ex_date > today
    }

    /// 주식 병합(reverse split) 여부 (비율 < 1).
    pub fn is_reverse_split(&self) -> bool {
        self.split_ratio < Decimal::ONE
    }
}

// 옵션 날짜는 양쪽 모두 존재할 때만 비교하므로 이 동등성은 추이적이지 않습니다.
// 따라서 Eq/Hash는 의도적으로 구현하지 않으며, 비교는 선형 탐색으로 수행합니다.
impl PartialEq for SplitRecord {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.ex_date == other.ex_date
            && self.split_ratio == other.split_ratio
            && both_present_eq(self.cum_date, other.cum_date)
            && both_present_eq(self.recording_date, other.recording_date)
    }
}

/// 양쪽 모두 값이 있을 때만 비교, 한쪽이라도 없으면 동등으로 간주.
fn both_present_eq(a: Option<NaiveDate>, b: Option<NaiveDate>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}
