//! 注释进度跟踪 - 业务能力层
//!
//! 只负责"读写进度"能力，不关心流程。
//! 写方唯一是编排层；轮询端只读

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::infrastructure::TtlStore;
use crate::models::{ProgressState, ProgressView};

/// 进度跟踪服务
///
/// 职责：
/// - 把进度状态写进带 TTL 的临时存储
/// - 状态只许前进（annotating → saving → completed），回退写入被忽略
/// - 存储不可用时读取退化为 Unknown，写入告警后继续，都不阻塞流水线
pub struct ProgressTracker {
    store: Arc<dyn TtlStore>,
    ttl: Duration,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn TtlStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(text_id: &str) -> String {
        format!("annotation:progress:{}", text_id)
    }

    /// 写入进度，回退写入被忽略
    pub async fn set_progress(&self, text_id: &str, state: ProgressState) {
        let key = Self::key(text_id);

        // 读当前状态，禁止回退
        match self.store.get(&key).await {
            Ok(Some(current)) => {
                if let Some(current) = ProgressState::parse(&current) {
                    if current.rank() > state.rank() {
                        warn!(
                            "忽略进度回退写入: {} 当前 {} → 请求 {}",
                            text_id, current, state
                        );
                        return;
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                // 读不到就按首次写入处理
                warn!("读取进度失败 ({}): {}", text_id, e);
            }
        }

        if let Err(e) = self.store.set(&key, state.as_str(), self.ttl).await {
            warn!("写入进度失败 ({} → {}): {}", text_id, state, e);
            return;
        }
        debug!("进度更新: {} → {}", text_id, state);
    }

    /// 读取进度，键缺失/过期/存储不可用都退化为 Unknown
    pub async fn get_progress(&self, text_id: &str) -> ProgressView {
        match self.store.get(&Self::key(text_id)).await {
            Ok(Some(raw)) => match ProgressState::parse(&raw) {
                Some(state) => state.into(),
                None => {
                    warn!("无法识别的进度值 ({}): '{}'", text_id, raw);
                    ProgressView::Unknown
                }
            },
            Ok(None) => ProgressView::Unknown,
            Err(e) => {
                warn!("读取进度失败 ({}): {}", text_id, e);
                ProgressView::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryTtlStore;

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Arc::new(MemoryTtlStore::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_unknown_before_first_write() {
        let tracker = tracker();
        assert_eq!(tracker.get_progress("t-1").await, ProgressView::Unknown);
    }

    #[tokio::test]
    async fn test_forward_transitions() {
        let tracker = tracker();
        tracker.set_progress("t-1", ProgressState::Annotating).await;
        assert_eq!(tracker.get_progress("t-1").await, ProgressView::Annotating);

        tracker.set_progress("t-1", ProgressState::Saving).await;
        assert_eq!(tracker.get_progress("t-1").await, ProgressView::Saving);

        tracker.set_progress("t-1", ProgressState::Completed).await;
        assert_eq!(tracker.get_progress("t-1").await, ProgressView::Completed);
    }

    #[tokio::test]
    async fn test_regression_is_ignored() {
        let tracker = tracker();
        tracker.set_progress("t-1", ProgressState::Saving).await;
        tracker.set_progress("t-1", ProgressState::Annotating).await;
        assert_eq!(tracker.get_progress("t-1").await, ProgressView::Saving);
    }

    #[tokio::test]
    async fn test_runs_are_isolated_by_key() {
        let tracker = tracker();
        tracker.set_progress("t-1", ProgressState::Completed).await;
        assert_eq!(tracker.get_progress("t-2").await, ProgressView::Unknown);
    }

    #[tokio::test]
    async fn test_expires_to_unknown() {
        let tracker = ProgressTracker::new(
            Arc::new(MemoryTtlStore::new()),
            Duration::from_millis(10),
        );
        tracker.set_progress("t-1", ProgressState::Annotating).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(tracker.get_progress("t-1").await, ProgressView::Unknown);
    }
}
