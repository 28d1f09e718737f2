//! Webhook 알림 전송기.
//!
//! upsert된 레코드 배치를 JSON으로 외부 엔드포인트에 POST합니다.
//! 인증은 환경에서 주입받은 API 키의 bearer token 방식입니다.

use crate::types::{NotificationError, NotificationResult, NotificationSender};
use async_trait::async_trait;
use reqwest::Client;
use splits_core::SplitRecord;
use std::time::Duration;

/// 기본 알림 엔드포인트.
pub const DEFAULT_ENDPOINT: &str = "https://sectors-news-endpoint.fly.dev/stock-split";

/// Webhook 알림 전송기.
///
/// API 키가 없으면 비활성 상태로 생성되며, 호출자는 `is_enabled`로
/// 전송을 건너뛸 수 있습니다.
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl WebhookNotifier {
    /// 새 전송기 생성.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("HTTP 클라이언트 생성 실패");

        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// 기본 엔드포인트로 생성.
    pub fn with_default_endpoint(api_key: Option<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, api_key)
    }
}

#[async_trait]
impl NotificationSender for WebhookNotifier {
    async fn send_upserted(&self, records: &[SplitRecord]) -> NotificationResult<()> {
        let Some(api_key) = &self.api_key else {
            return Err(NotificationError::InvalidConfig(
                "API 키가 설정되지 않았습니다".to_string(),
            ));
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(records)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(count = records.len(), "외부 엔드포인트 전송 성공");
            Ok(())
        } else {
            Err(NotificationError::SendFailed(format!(
                "status code {}",
                status.as_u16()
            )))
        }
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
