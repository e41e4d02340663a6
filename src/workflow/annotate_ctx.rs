//! 分段处理上下文
//!
//! 封装"我正在处理哪篇文章的第几段"这一信息

use std::fmt::Display;

use crate::models::Language;

/// 分段处理上下文
///
/// 包含处理单个分段所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct AnnotateCtx {
    /// 文章标识（也用于日志显示）
    pub text_id: String,

    /// 分段在文章中的序号（从 0 开始）
    pub chunk_index: usize,

    /// 文章的分段总数
    pub total_chunks: usize,

    /// 文章语种
    pub language: Language,
}

impl AnnotateCtx {
    /// 创建新的分段上下文
    pub fn new(
        text_id: String,
        chunk_index: usize,
        total_chunks: usize,
        language: Language,
    ) -> Self {
        Self {
            text_id,
            chunk_index,
            total_chunks,
            language,
        }
    }
}

impl Display for AnnotateCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文章 ID#{} 分段#{}/{} 语种#{}]",
            self.text_id,
            self.chunk_index + 1,
            self.total_chunks,
            self.language.code()
        )
    }
}
