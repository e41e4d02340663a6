//! 完成通知 - 业务能力层
//!
//! 只负责"推送一条完成通知"能力，尽力而为：
//! 通知失败绝不让注释流水线失败

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// 通知载荷
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyPayload {
    pub text_id: String,
    pub topics: Vec<String>,
    pub emoji: String,
}

/// 通知能力
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &str, payload: &NotifyPayload) -> Result<()>;
}

/// Webhook 通知器
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, user_id: &str, payload: &NotifyPayload) -> Result<()> {
        debug!("推送完成通知: 用户 {} 文章 {}", user_id, payload.text_id);

        let body = serde_json::json!({
            "userId": user_id,
            "event": "annotation_completed",
            "payload": payload,
        });

        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

/// 空通知器（未配置 webhook 时使用）
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, user_id: &str, payload: &NotifyPayload) -> Result<()> {
        debug!(
            "未配置通知渠道，忽略: 用户 {} 文章 {}",
            user_id, payload.text_id
        );
        Ok(())
    }
}
