use crate::models::Language;

/// 应用程序错误类型
///
/// 按失败类别划分：
/// - 准入失败（配额不足）和输入超长在任何外部调用之前同步返回
/// - 生成单元失败在重试耗尽后向上传播，已扣配额不退还
/// - 标记语法不合法永远不是错误（解析器按普通文字处理），
///   只有对不存在的结构做编辑操作才会报 `SectionNotFound`
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 配额不足，请求被准入门拒绝
    #[error("配额不足: 用户 {user_id} 本次需要 {cost} 点")]
    QuotaExceeded { user_id: String, cost: u32 },

    /// 文章超过语种长度上限，在分段前被拒绝
    #[error("文章过长: {chars} 字符，{language} 上限 {max_chars} 字符")]
    InputTooLarge {
        chars: usize,
        max_chars: usize,
        language: Language,
    },

    /// 单个生成单元在重试耗尽后仍然失败
    #[error("生成单元失败 ({unit}): {source}")]
    UnitOfWork {
        unit: String,
        #[source]
        source: anyhow::Error,
    },

    /// 持久化存储操作失败
    #[error("存储操作失败 ({operation}): {source}")]
    Store {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// 对不存在的音频段做结构化编辑
    #[error("音频段不存在: {id}")]
    SectionNotFound { id: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
