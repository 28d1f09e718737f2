//! SahamIDX 액면분할 공시 크롤러.
//!
//! IDX 상장사의 액면분할/병합 공시를 SahamIDX 공시 페이지에서 수집합니다.
//! 페이지의 `<tr>` 행을 후보 레코드로 정규화하며, 형식이 맞지 않는 행은
//! 오류 없이 건너뜁니다 (skip-not-fail).
//!
//! ## 행 정규화 규칙
//! - 이름/비율/적용일 셀 중 하나라도 없으면 행 건너뜀
//! - 종목 코드는 이름 셀의 첫 괄호 안 텍스트 + `.JK` 접미사
//! - 날짜는 `dd-Mon-yyyy` 형식 (예: "05-Jan-2024"), 기준일 이하이면 건너뜀
//! - 비율 셀은 "분할 전:분할 후" 두 숫자, 분할 전이 0이면 건너뜀
//! - Cum/Recording Date는 best-effort — 실패해도 행은 유지
//!
//! ## 사용 예시
//! ```rust,ignore
//! let parser = SplitPageParser::new(today);
//! let fetcher = SahamIdxFetcher::new();
//! let candidates = fetcher.fetch_split_records(&parser).await?;
//! ```

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use splits_core::{SplitRecord, MARKET_SUFFIX};
use std::time::Duration;

/// 기본 수집 대상 페이지.
pub const DEFAULT_PAGE_URLS: &[&str] = &["https://www.new.sahamidx.com/?/stock-split/page/1"];

/// 행에서 셀을 찾는 방법 — 소스 스키마 버전별 컬럼 매핑 규약.
///
/// 옵션 날짜 컬럼은 일부 스키마 버전에만 존재하므로 매핑 자체가 옵션입니다.
#[derive(Debug, Clone)]
pub enum ColumnMap {
    /// `data-header` 속성 라벨로 셀을 찾는 방식 (현행 스키마)
    Labeled {
        symbol: String,
        ratio: String,
        ex_date: String,
        cum_date: Option<String>,
        recording_date: Option<String>,
    },
    /// 고정 셀 인덱스로 찾는 방식 (라벨 속성이 없는 구형 스키마)
    Positional {
        symbol: usize,
        ratio: usize,
        ex_date: usize,
        cum_date: Option<usize>,
        recording_date: Option<usize>,
    },
}

impl ColumnMap {
    /// SahamIDX 현행 페이지의 라벨 매핑.
    pub fn sahamidx() -> Self {
        Self::Labeled {
            symbol: "Nama".to_string(),
            ratio: "Ratio".to_string(),
            ex_date: "Ex Date".to_string(),
            cum_date: Some("Cum Date".to_string()),
            recording_date: Some("Recording Date".to_string()),
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::sahamidx()
    }
}

/// 한 행에서 추출한 원본 셀 텍스트.
#[derive(Debug, Default)]
struct RowCells {
    symbol: Option<String>,
    ratio: Option<String>,
    ex_date: Option<String>,
    cum_date: Option<String>,
    recording_date: Option<String>,
}

/// 공시 페이지 행 파서.
///
/// 기준일(run date)은 전역 시계 대신 생성 시점에 명시적으로 주입받아
/// 미래 이벤트 필터를 순수하게 유지합니다.
pub struct SplitPageParser {
    today: NaiveDate,
    columns: ColumnMap,
}

impl SplitPageParser {
    /// 기본 컬럼 매핑(SahamIDX 현행 스키마)으로 생성.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_columns(today, ColumnMap::default())
    }

    /// 지정한 컬럼 매핑으로 생성.
    pub fn with_columns(today: NaiveDate, columns: ColumnMap) -> Self {
        Self { today, columns }
    }

    /// 페이지 전체를 후보 레코드 목록으로 파싱.
    ///
    /// 조건에 맞지 않는 행은 건너뛰며, 출력 순서에는 의미가 없습니다.
    /// 페이지 간 중복은 허용되고 reconcile 단계에서 합쳐집니다.
    pub fn parse_page(&self, html: &str) -> Vec<SplitRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        if let Ok(tr_selector) = Selector::parse("tr") {
            for row in document.select(&tr_selector) {
                if let Some(record) = self.parse_row(row) {
                    records.push(record);
                }
            }
        }

        records
    }

    /// 한 행을 후보 레코드로 정규화. 규칙 위반 시 None (행 건너뜀).
    fn parse_row(&self, row: ElementRef) -> Option<SplitRecord> {
        let cells = self.row_cells(row);

        let (Some(name_text), Some(ratio_text), Some(date_text)) =
            (cells.symbol, cells.ratio, cells.ex_date)
        else {
            // 헤더/푸터 등 필수 셀이 없는 행
            tracing::debug!("필수 셀 누락, 행 건너뜀");
            return None;
        };

        let ex_date = match parse_source_date(&date_text) {
            Some(d) => d,
            None => {
                tracing::debug!(date = %date_text, "적용일 파싱 실패, 행 건너뜀");
                return None;
            }
        };

        // 미래 이벤트만 수집 — reconcile뿐 아니라 파싱 시점에도 강제
        if ex_date <= self.today {
            tracing::debug!(ex_date = %ex_date, "과거 또는 당일 이벤트, 행 건너뜀");
            return None;
        }

        let symbol = match extract_symbol(&name_text) {
            Some(s) => s,
            None => {
                tracing::debug!(name = %name_text, "괄호 안 종목 코드 없음, 행 건너뜀");
                return None;
            }
        };

        let split_ratio = match parse_ratio(&ratio_text) {
            Some(r) => r,
            None => {
                tracing::debug!(ratio = %ratio_text, "비율 파싱 실패, 행 건너뜀");
                return None;
            }
        };

        // 옵션 날짜는 best-effort — 실패해도 행은 유지
        let cum_date = cells.cum_date.as_deref().and_then(parse_source_date);
        let recording_date = cells.recording_date.as_deref().and_then(parse_source_date);

        Some(SplitRecord {
            symbol,
            ex_date,
            split_ratio,
            cum_date,
            recording_date,
        })
    }

    /// 컬럼 매핑 규약에 따라 행에서 셀 텍스트를 추출.
    fn row_cells(&self, row: ElementRef) -> RowCells {
        match &self.columns {
            ColumnMap::Labeled {
                symbol,
                ratio,
                ex_date,
                cum_date,
                recording_date,
            } => RowCells {
                symbol: labeled_cell_text(row, symbol),
                ratio: labeled_cell_text(row, ratio),
                ex_date: labeled_cell_text(row, ex_date),
                cum_date: cum_date.as_deref().and_then(|l| labeled_cell_text(row, l)),
                recording_date: recording_date
                    .as_deref()
                    .and_then(|l| labeled_cell_text(row, l)),
            },
            ColumnMap::Positional {
                symbol,
                ratio,
                ex_date,
                cum_date,
                recording_date,
            } => {
                let cells = collect_cell_texts(row);
                RowCells {
                    symbol: cells.get(*symbol).cloned(),
                    ratio: cells.get(*ratio).cloned(),
                    ex_date: cells.get(*ex_date).cloned(),
                    cum_date: cum_date.and_then(|i| cells.get(i).cloned()),
                    recording_date: recording_date.and_then(|i| cells.get(i).cloned()),
                }
            }
        }
    }
}

/// `data-header` 라벨로 셀을 찾아 텍스트를 반환.
fn labeled_cell_text(row: ElementRef, label: &str) -> Option<String> {
    let selector = Selector::parse(&format!("td[data-header=\"{}\"]", label)).ok()?;
    row.select(&selector)
        .next()
        .map(|td| td.text().collect::<String>().trim().to_string())
}

/// 행의 모든 td 텍스트를 순서대로 수집 (Positional 매핑용).
fn collect_cell_texts(row: ElementRef) -> Vec<String> {
    let mut cells = Vec::new();
    if let Ok(td_selector) = Selector::parse("td") {
        for td in row.select(&td_selector) {
            cells.push(td.text().collect::<String>().trim().to_string());
        }
    }
    cells
}

/// 이름 셀에서 첫 괄호 안의 종목 코드를 추출하고 시장 접미사를 붙입니다.
///
/// 예: "Bank ABC (ABCD)" -> "ABCD.JK"
fn extract_symbol(text: &str) -> Option<String> {
    let start = text.find('(')?;
    let rest = &text[start + 1..];
    let end = rest.find(')')?;
    let ticker = rest[..end].trim();
    if ticker.is_empty() {
        return None;
    }
    Some(format!("{}{}", ticker, MARKET_SUFFIX))
}

/// `dd-Mon-yyyy` 형식 날짜 파싱 (예: "05-Jan-2024").
fn parse_source_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d-%b-%Y").ok()
}

/// "분할 전:분할 후" 비율 셀 파싱, 소수점 5자리 반올림.
///
/// 콜론으로 나눈 부분이 정확히 둘이 아니거나, 숫자가 아니거나,
/// 분할 전 값이 0이거나, 결과가 양수가 아니면 None.
fn parse_ratio(text: &str) -> Option<Decimal> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }

    let pre: Decimal = parts[0].trim().parse().ok()?;
    let post: Decimal = parts[1].trim().parse().ok()?;

    // checked_div가 분할 전 0을 걸러냄
    let ratio = post.checked_div(pre)?;
    if ratio <= Decimal::ZERO {
        return None;
    }

    Some(ratio.round_dp(5))
}

/// SahamIDX 공시 페이지 크롤러.
///
/// 소스가 rate limit에 민감한 서드파티이므로 페이지는 한 번에 하나씩,
/// 요청 사이에 딜레이를 두고 수집합니다. 어떤 페이지든 수집 실패는
/// 저장소 변경 전에 실행 전체를 중단시킵니다 (fail-fast, 재시도 없음).
pub struct SahamIdxFetcher {
    client: Client,
    page_urls: Vec<String>,
    /// 페이지 요청 간 딜레이 (기본: 2초)
    request_delay: Duration,
}

impl SahamIdxFetcher {
    /// 기본 페이지 목록으로 생성.
    pub fn new() -> Self {
        Self::with_pages(DEFAULT_PAGE_URLS.iter().map(|s| s.to_string()).collect())
    }

    /// 지정한 페이지 목록으로 생성.
    pub fn with_pages(page_urls: Vec<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            page_urls,
            request_delay: Duration::from_secs(2),
        }
    }

    /// 페이지 요청 간 딜레이 변경.
    pub fn with_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    /// 단일 페이지의 원본 마크업 수집.
    ///
    /// 비정상 상태 코드는 `DataError::HttpStatus`로 반환됩니다.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// 모든 페이지를 순차 수집하여 후보 레코드로 파싱.
    pub async fn fetch_split_records(&self, parser: &SplitPageParser) -> Result<Vec<SplitRecord>> {
        let mut records = Vec::new();

        for (i, url) in self.page_urls.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.request_delay).await;
            }

            let html = self.fetch_page(url).await?;
            let page_records = parser.parse_page(&html);
            tracing::info!(url = %url, count = page_records.len(), "페이지 수집 완료");
            records.extend(page_records);
        }

        Ok(records)
    }
}

impl Default for SahamIdxFetcher {
    fn default() -> Self {
        Self::new()
    }
}
