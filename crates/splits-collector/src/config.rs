//! 환경변수 기반 설정 모듈.

use crate::Result;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 소스 수집 설정
    pub source: SourceConfig,
    /// 알림 설정
    pub notify: NotifyConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 소스 수집 설정
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// 수집 대상 공시 페이지 URL 목록
    pub page_urls: Vec<String>,
    /// 페이지 요청 간 딜레이 (밀리초, rate limit 대응)
    pub request_delay_ms: u64,
}

/// 알림 설정
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// upsert 배치를 전송할 엔드포인트
    pub endpoint: String,
    /// bearer 인증용 API 키 (없으면 알림 비활성)
    pub api_key: Option<String>,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 동기화 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            crate::error::CollectorError::Config(
                "DATABASE_URL 환경변수가 설정되지 않았습니다".to_string(),
            )
        })?;

        let page_urls = std::env::var("SPLIT_SOURCE_URLS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                splits_data::DEFAULT_PAGE_URLS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        Ok(Self {
            database_url,
            source: SourceConfig {
                page_urls,
                request_delay_ms: env_var_parse("SPLIT_REQUEST_DELAY_MS", 2000),
            },
            notify: NotifyConfig {
                endpoint: std::env::var("SPLIT_NOTIFY_ENDPOINT")
                    .unwrap_or_else(|_| splits_notification::DEFAULT_ENDPOINT.to_string()),
                api_key: std::env::var("NOTIFY_API_KEY").ok(),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 60),
            },
        })
    }
}

impl SourceConfig {
    /// 페이지 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl DaemonConfig {
    /// 동기화 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
