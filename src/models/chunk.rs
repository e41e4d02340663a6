//! 文章分段
//!
//! 分段只在一次注释任务内存活：分段 → 并发生成 → 按序合并后即丢弃，
//! 从不单独持久化

/// 一个待注释的文章分段
///
/// 不变式：把所有分段的 `text` 按原始 `index` 顺序用空行重新拼接，
/// 能还原出原始输入（分隔空白可以不同）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 分段在原文中的序号（从 0 开始），合并时据此恢复顺序
    pub index: usize,
    /// 分段文本
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// 分段的字符长度（按字符计，不是字节）
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// 生成单元的确定性标识
    ///
    /// 由分段内容和语种代码派生，同样的输入总是得到同一个 key，
    /// 重试失败的分段时不会影响已成功的分段
    pub fn unit_key(&self, language_code: &str) -> String {
        use std::hash::{Hash, Hasher};

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.text.hash(&mut hasher);
        language_code.hash(&mut hasher);
        format!("chunk-{}-{}-{:016x}", language_code, self.index, hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_key_is_deterministic() {
        let a = Chunk::new(0, "Hello world.");
        let b = Chunk::new(0, "Hello world.");
        assert_eq!(a.unit_key("en"), b.unit_key("en"));
    }

    #[test]
    fn test_unit_key_depends_on_content_and_language() {
        let a = Chunk::new(0, "Hello world.");
        let b = Chunk::new(0, "Goodbye world.");
        assert_ne!(a.unit_key("en"), b.unit_key("en"));
        assert_ne!(a.unit_key("en"), a.unit_key("ja"));
    }

    #[test]
    fn test_char_len_counts_chars() {
        let chunk = Chunk::new(0, "世界");
        assert_eq!(chunk.char_len(), 2);
    }
}
