//! HTML 清洗
//!
//! 展示树渲染前的清洗步骤。必须在定界符展开【之前】对原始规范文本执行：
//! 展开之后再清洗，portion 内容就有机会把不安全标记重新注入渲染结果

use regex::Regex;

/// HTML 清洗器
///
/// 正则在构造时编译一次，实例可跨调用复用
pub struct Sanitizer {
    script_block: Regex,
    comment_block: Regex,
    tag: Regex,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            // script / style 连同内容一起删除
            script_block: Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
                .expect("固定正则"),
            comment_block: Regex::new(r"(?s)<!--.*?-->").expect("固定正则"),
            // 剩余的所有标签只去壳保留文字
            tag: Regex::new(r"(?i)</?[a-z][^>]*>").expect("固定正则"),
        }
    }

    /// 去除不安全的 HTML 标记，保留纯文字和定界符语法
    pub fn sanitize(&self, text: &str) -> String {
        let text = self.script_block.replace_all(text, "");
        let text = self.comment_block.replace_all(&text, "");
        self.tag.replace_all(&text, "").into_owned()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        let s = Sanitizer::new();
        assert_eq!(s.sanitize("Hello {{world||世界}}."), "Hello {{world||世界}}.");
    }

    #[test]
    fn test_script_removed_with_content() {
        let s = Sanitizer::new();
        assert_eq!(
            s.sanitize("a<script>alert('x')</script>b"),
            "ab"
        );
    }

    #[test]
    fn test_tags_stripped_keep_text() {
        let s = Sanitizer::new();
        assert_eq!(s.sanitize("<b>bold</b> <img src=x onerror=y>"), "bold ");
    }

    #[test]
    fn test_unsafe_markup_inside_portion() {
        // 清洗发生在定界符展开之前，portion 里的标签同样被剥掉
        let s = Sanitizer::new();
        assert_eq!(
            s.sanitize("{{word||<script>bad()</script>释义}}"),
            "{{word||释义}}"
        );
    }

    #[test]
    fn test_comment_removed() {
        let s = Sanitizer::new();
        assert_eq!(s.sanitize("a<!-- hidden -->b"), "ab");
    }
}
