//! 富文本编辑器文档
//!
//! 可编辑的文档模型：注释是带 `portions` 属性的原子内联元素，
//! 音频段是带 `id` 属性的块级容器。与规范文本互相转换，
//! 序列化为 JSON 后交给前端编辑器

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::markup::node::{Annotation, Node};
use crate::markup::parser::{parse_document, parse_inline};
use crate::markup::serializer::{escape_portion, serialize};

/// 编辑器文档节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorNode {
    /// 普通文字
    Text { text: String },
    /// 原子内联注释元素
    Annotation { portions: Vec<String> },
    /// 重点标记
    Emphasis { text: String },
    /// 音频段容器
    AudioSection { id: String, content: Vec<EditorNode> },
}

/// 编辑器文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorDoc {
    pub content: Vec<EditorNode>,
}

/// 规范文本 → 编辑器文档（定界符展开为元素）
pub fn to_editor_doc(text: &str) -> EditorDoc {
    EditorDoc {
        content: nodes_to_editor(&parse_document(text)),
    }
}

fn nodes_to_editor(nodes: &[Node]) -> Vec<EditorNode> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(text) => EditorNode::Text { text: text.clone() },
            Node::Annotation(ann) => EditorNode::Annotation {
                portions: ann.portions(),
            },
            Node::Emphasis(text) => EditorNode::Emphasis { text: text.clone() },
            Node::AudioSection { id, children } => EditorNode::AudioSection {
                id: id.clone(),
                content: nodes_to_editor(children),
            },
        })
        .collect()
}

/// 编辑器文档 → 规范文本
///
/// 注释元素按 `||` 连接 portion 重新编码，音频段重新包回 `:::id` 框架。
/// 编辑器可能产出不合法的注释元素（例如 portion 为空），
/// 写出的定界序列会被解析器当作普通文字，容错方向与解析一致
pub fn from_editor_doc(doc: &EditorDoc) -> String {
    let mut out = String::new();
    write_editor_nodes(&mut out, &doc.content);
    out
}

fn write_editor_nodes(out: &mut String, nodes: &[EditorNode]) {
    for node in nodes {
        match node {
            EditorNode::Text { text } => out.push_str(text),
            EditorNode::Annotation { portions } => {
                out.push_str("{{");
                for (i, portion) in portions.iter().enumerate() {
                    if i > 0 {
                        out.push_str("||");
                    }
                    out.push_str(&escape_portion(portion));
                }
                out.push_str("}}");
            }
            EditorNode::Emphasis { text } => {
                out.push_str("&&");
                out.push_str(text);
                out.push_str("&&");
            }
            EditorNode::AudioSection { id, content } => {
                out.push_str(":::");
                out.push_str(id);
                out.push('\n');
                write_editor_nodes(out, content);
                out.push_str("\n:::");
            }
        }
    }
}

/// 列出文档里的音频段标识（按出现顺序）
pub fn audio_section_ids(text: &str) -> Vec<String> {
    parse_document(text)
        .iter()
        .filter_map(|node| match node {
            Node::AudioSection { id, .. } => Some(id.clone()),
            _ => None,
        })
        .collect()
}

/// 替换指定音频段的内容，返回新的规范文本
///
/// 这是编解码器唯一的失败路径：对不存在的段做结构化编辑
pub fn replace_audio_section(text: &str, id: &str, new_inner: &str) -> AppResult<String> {
    let mut nodes = parse_document(text);
    let mut found = false;

    for node in nodes.iter_mut() {
        if let Node::AudioSection { id: sec_id, children } = node {
            if sec_id == id {
                *children = parse_inline(new_inner);
                found = true;
                break;
            }
        }
    }

    if !found {
        return Err(AppError::SectionNotFound { id: id.to_string() });
    }

    Ok(serialize(&nodes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_editor_doc() {
        let doc = to_editor_doc("Hello {{world||world||n. 世界}}.");
        assert_eq!(
            doc.content,
            vec![
                EditorNode::Text {
                    text: "Hello ".to_string()
                },
                EditorNode::Annotation {
                    portions: vec![
                        "world".to_string(),
                        "world".to_string(),
                        "n. 世界".to_string()
                    ]
                },
                EditorNode::Text {
                    text: ".".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_editor_round_trip() {
        let canonical = "Hello {{world||world||n. 世界}}.\n\n:::abc\n{{cat||cat||n. 猫}}\n:::";
        let doc = to_editor_doc(canonical);
        assert_eq!(from_editor_doc(&doc), canonical);
    }

    #[test]
    fn test_editor_doc_json_shape() {
        let doc = to_editor_doc("{{cat||cat}}");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["content"][0]["type"], "annotation");
        assert_eq!(json["content"][0]["portions"][0], "cat");

        let parsed: EditorDoc = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_audio_section_json_shape() {
        let doc = to_editor_doc(":::s1\nhi\n:::");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["content"][0]["type"], "audioSection");
        assert_eq!(json["content"][0]["id"], "s1");
        assert_eq!(json["content"][0]["content"][0]["type"], "text");
    }

    #[test]
    fn test_replace_audio_section() {
        let text = "头\n:::s1\n旧内容\n:::\n尾";
        let updated = replace_audio_section(text, "s1", "{{new||新}}").unwrap();
        assert_eq!(updated, "头\n:::s1\n{{new||新}}\n:::\n尾");
    }

    #[test]
    fn test_replace_missing_section_fails() {
        let err = replace_audio_section("plain text", "nope", "x").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::SectionNotFound { .. }
        ));
    }

    #[test]
    fn test_audio_section_ids() {
        let text = ":::a\n1\n:::\n:::b\n2\n:::";
        assert_eq!(audio_section_ids(text), vec!["a", "b"]);
    }
}
