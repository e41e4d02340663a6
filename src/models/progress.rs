//! 注释进度状态
//!
//! 由编排层写入、轮询端只读的微型状态机，存放在带 TTL 的临时存储里。
//! 状态只会前进：annotating → saving → completed。
//! 任务出错时不写终态，键随 TTL 过期后读到 Unknown——
//! 轮询端本来就要处理过期场景，所以没有单独的 failed 状态。

use serde::{Deserialize, Serialize};

/// 一次注释任务的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressState {
    /// 已分发生成调用
    Annotating,
    /// 全部分段已合并，正在持久化
    Saving,
    /// 持久化完成
    Completed,
}

impl ProgressState {
    /// 状态在状态机中的序号，用于禁止回退
    pub fn rank(self) -> u8 {
        match self {
            ProgressState::Annotating => 0,
            ProgressState::Saving => 1,
            ProgressState::Completed => 2,
        }
    }

    /// 存储用的字符串形式
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressState::Annotating => "annotating",
            ProgressState::Saving => "saving",
            ProgressState::Completed => "completed",
        }
    }

    /// 从存储形式解析，无法识别的值视为不存在
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "annotating" => Some(ProgressState::Annotating),
            "saving" => Some(ProgressState::Saving),
            "completed" => Some(ProgressState::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProgressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 轮询端看到的进度：三个真实状态，外加键缺失/过期时的 Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressView {
    Annotating,
    Saving,
    Completed,
    Unknown,
}

impl From<ProgressState> for ProgressView {
    fn from(state: ProgressState) -> Self {
        match state {
            ProgressState::Annotating => ProgressView::Annotating,
            ProgressState::Saving => ProgressView::Saving,
            ProgressState::Completed => ProgressView::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_is_monotonic() {
        assert!(ProgressState::Annotating.rank() < ProgressState::Saving.rank());
        assert!(ProgressState::Saving.rank() < ProgressState::Completed.rank());
    }

    #[test]
    fn test_parse_round_trip() {
        for state in [
            ProgressState::Annotating,
            ProgressState::Saving,
            ProgressState::Completed,
        ] {
            assert_eq!(ProgressState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ProgressState::parse("failed"), None);
    }
}
