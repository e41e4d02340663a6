//! 注释标记编解码器
//!
//! 存储、展示、编辑三方共用的内联+块级标记语法：
//!
//! ```text
//! document     := (text | annotation | audioSection | emphasis)*
//! annotation   := "{{" portion ("||" portion){0,4} "}}"
//! audioSection := ":::" identifier 换行 document 换行 ":::"
//! emphasis     := "&&" text "&&"
//! portion      := 不含字面 "||" 和裸换行的文字（编码时转义：\| \\ \n）
//! ```
//!
//! 三种表示：
//! 1. **规范文本** —— 存储与传输格式（上面的定界符语法）
//! 2. **展示树** —— [`Node`] 树，只读渲染用；解析前先过 [`Sanitizer`]
//! 3. **编辑器文档** —— [`EditorDoc`]，注释为原子内联元素、音频段为块级容器
//!
//! 解析优先级固定：块级构造 → 内联注释 → 重点标记。
//! 不合法的定界序列一律按普通文字保留，解析永不失败；
//! 唯一的错误路径是对不存在的音频段做结构化编辑

pub mod editor;
pub mod node;
pub mod parser;
pub mod sanitize;
pub mod serializer;

pub use editor::{
    audio_section_ids, from_editor_doc, replace_audio_section, to_editor_doc, EditorDoc,
    EditorNode,
};
pub use node::{Annotation, Node};
pub use parser::parse_document;
pub use sanitize::Sanitizer;
pub use serializer::{normalize_ws, serialize, strip_markup};

/// 清洗后解析，供只读渲染使用
///
/// 清洗必须发生在定界符展开之前（见 [`Sanitizer`] 的模块说明）
pub fn parse_display(sanitizer: &Sanitizer, text: &str) -> Vec<Node> {
    parse_document(&sanitizer.sanitize(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_strips_markup_before_expansion() {
        let sanitizer = Sanitizer::new();
        let nodes = parse_display(&sanitizer, "<p>Hello {{world||<b>世界</b>}}</p>");
        assert_eq!(
            nodes,
            vec![
                Node::Text("Hello ".to_string()),
                Node::Annotation(Annotation {
                    surface: "world".to_string(),
                    lemma: Some("世界".to_string()),
                    meaning: None,
                    etymology: None,
                    cognates: None,
                }),
            ]
        );
    }
}
