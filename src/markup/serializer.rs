//! 展示树 → 规范文本
//!
//! 与解析器互逆：对任何解析器接受的规范文本，
//! `serialize(parse_document(t))` 在空白归一化意义下等于 `t`。
//! 转义序列按规范形式重新输出（`\|\|` 表示 portion 内的 `||`）

use crate::markup::node::Node;

/// 序列化整棵展示树
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Annotation(ann) => {
            out.push_str("{{");
            let portions = ann.portions();
            for (i, portion) in portions.iter().enumerate() {
                if i > 0 {
                    out.push_str("||");
                }
                out.push_str(&escape_portion(portion));
            }
            out.push_str("}}");
        }
        Node::Emphasis(text) => {
            out.push_str("&&");
            out.push_str(text);
            out.push_str("&&");
        }
        Node::AudioSection { id, children } => {
            out.push_str(":::");
            out.push_str(id);
            out.push('\n');
            for child in children {
                write_node(out, child);
            }
            out.push_str("\n:::");
        }
    }
}

/// portion 编码：`\` → `\\`，`||` → `\|\|`，换行 → `\n`
///
/// 单个 `|` 不需要转义（语法只禁止字面 `||`）
pub fn escape_portion(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace("||", "\\|\\|")
        .replace('\n', "\\n")
}

/// 去掉所有标记，只留可读文字
///
/// 注释退化为表层词形，重点标记退化为内部文字，音频段退化为其内容。
/// 编排层用它校验生成结果没有改动注释以外的内容
pub fn strip_markup(text: &str) -> String {
    let nodes = crate::markup::parser::parse_document(text);
    let mut out = String::new();
    strip_nodes(&nodes, &mut out);
    out
}

fn strip_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Annotation(ann) => out.push_str(&ann.surface),
            Node::Emphasis(text) => out.push_str(text),
            Node::AudioSection { children, .. } => strip_nodes(children, out),
        }
    }
}

/// 空白归一化：空白串折叠为单个空格，首尾去空白
///
/// 往返契约和内容保全校验都在这个意义下比较文本
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parser::parse_document;

    fn round_trip(input: &str) {
        let serialized = serialize(&parse_document(input));
        assert_eq!(
            normalize_ws(&serialized),
            normalize_ws(input),
            "往返失败: {:?} -> {:?}",
            input,
            serialized
        );
    }

    #[test]
    fn test_round_trip_plain() {
        round_trip("Hello world.");
        round_trip("两段\n\n文字");
    }

    #[test]
    fn test_round_trip_annotation() {
        round_trip("Hello {{world||world||n. 世界}}.");
        round_trip("{{ran||run||跑||古英语 rinnan||德语 rennen}}");
    }

    #[test]
    fn test_round_trip_interior_empty_portion() {
        round_trip("{{a||||c}}");
        round_trip("{{word||}}");
    }

    #[test]
    fn test_round_trip_audio_section_exact() {
        let input = ":::abc\n{{cat||cat||n. 猫}}\n:::";
        let serialized = serialize(&parse_document(input));
        assert_eq!(serialized, input);
    }

    #[test]
    fn test_round_trip_emphasis() {
        round_trip("注意 &&这句话&& 很重要");
    }

    #[test]
    fn test_round_trip_malformed_stays_literal() {
        round_trip("a {{word b");
        round_trip("a {{}} b");
        round_trip(":::abc\nunclosed");
        round_trip("a && b");
    }

    #[test]
    fn test_round_trip_mixed_document() {
        round_trip(
            "开头 {{word||词||n. 词}} 中间\n\n:::sec-1\n&&重点&& {{cat||cat||n. 猫}}\n:::\n结尾",
        );
    }

    #[test]
    fn test_escape_round_trip_through_parser() {
        let input = r"{{or\|\|else||或者}}";
        let serialized = serialize(&parse_document(input));
        assert_eq!(serialized, input);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("Hello {{world||world||n. 世界}}."),
            "Hello world."
        );
        assert_eq!(strip_markup("&&big&& deal"), "big deal");
        assert_eq!(strip_markup(":::a\ncat {{dog||狗}}\n:::"), "cat dog");
    }

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("  a \n\n b  "), "a b");
    }
}
