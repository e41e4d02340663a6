//! 规范文本解析器
//!
//! 显式两遍扫描，优先级固定：
//! 1. 块级扫描（逐行识别音频段）
//! 2. 内联扫描（识别注释）
//! 3. 重点标记扫描（在剩余的纯文字里识别 `&&…&&`）
//!
//! 解析对任意输入都是全函数：所有不合法的定界序列
//! （未闭合的 `{{` / `:::`、空 portion 列表、嵌套、跨行注释、
//! 落单的 `&&`）都按普通文字原样保留，永远不报错

use crate::markup::node::{Annotation, Node};

/// 解析规范文本为展示树
pub fn parse_document(text: &str) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut plain = String::new();
    let mut open: Option<OpenBlock> = None;

    // ========== 第一遍：块级扫描 ==========
    for line in text.split_inclusive('\n') {
        let stripped = line.trim();

        if open.is_some() {
            if stripped == ":::" {
                let block = open.take().expect("block is open");
                // 内容末尾的换行属于语法框架，序列化时再补回
                let inner = block.content.strip_suffix('\n').unwrap_or(&block.content);
                nodes.push(Node::AudioSection {
                    id: block.id.clone(),
                    children: parse_inline(inner),
                });
                // 关闭行自己的换行归属后续文字
                if line.ends_with('\n') {
                    plain.push('\n');
                }
            } else {
                // 音频段不能嵌套：段内再出现开启行也只是普通内容
                let block = open.as_mut().expect("block is open");
                block.content.push_str(line);
            }
        } else if let Some(id) = opener_id(stripped) {
            flush_plain(&mut nodes, &mut plain);
            open = Some(OpenBlock {
                id,
                opener: line.to_string(),
                content: String::new(),
            });
        } else {
            // 包括没有对应开启行的 ":::" 关闭行
            plain.push_str(line);
        }
    }

    // 未闭合的音频段整体退回普通文字
    if let Some(block) = open.take() {
        plain.push_str(&block.opener);
        plain.push_str(&block.content);
    }

    flush_plain(&mut nodes, &mut plain);
    nodes
}

struct OpenBlock {
    id: String,
    opener: String,
    content: String,
}

fn flush_plain(nodes: &mut Vec<Node>, plain: &mut String) {
    if !plain.is_empty() {
        nodes.extend(parse_inline(plain));
        plain.clear();
    }
}

/// 识别音频段开启行，返回标识
///
/// 标识限制为字母、数字、`-`、`_`，且不能为空；不满足的行按普通文字处理
fn opener_id(stripped: &str) -> Option<String> {
    let rest = stripped.strip_prefix(":::")?;
    let id = rest.trim();
    if id.is_empty() {
        return None;
    }
    if !id.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    Some(id.to_string())
}

/// 第二、三遍：在一段不含音频段的文本里识别注释和重点标记
pub fn parse_inline(text: &str) -> Vec<Node> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let before = &rest[..start];
        let after = &rest[start + 2..];

        let parsed = after.find("}}").and_then(|end| {
            let inner = &after[..end];
            // 注释不嵌套、不跨行
            if inner.contains("{{") || inner.contains('\n') {
                return None;
            }
            parse_annotation(inner).map(|ann| (ann, end))
        });

        match parsed {
            Some((ann, end)) => {
                buf.push_str(before);
                flush_text(&mut out, &mut buf);
                out.push(Node::Annotation(ann));
                rest = &after[end + 2..];
            }
            None => {
                // 定界序列不合法：`{{` 本身按普通文字保留，从它之后继续扫描
                buf.push_str(before);
                buf.push_str("{{");
                rest = after;
            }
        }
    }

    buf.push_str(rest);
    flush_text(&mut out, &mut buf);
    out
}

/// 把缓冲的纯文字切成 Text / Emphasis 节点
///
/// 重点标记不跨行，也不会越过注释边界（缓冲在注释处被截断）
fn flush_text(out: &mut Vec<Node>, buf: &mut String) {
    if buf.is_empty() {
        return;
    }

    let mut plain = String::new();
    let mut rest = buf.as_str();

    while let Some(start) = rest.find("&&") {
        let after = &rest[start + 2..];
        match after.find("&&") {
            Some(end) if end > 0 && !after[..end].contains('\n') => {
                plain.push_str(&rest[..start]);
                if !plain.is_empty() {
                    out.push(Node::Text(std::mem::take(&mut plain)));
                }
                out.push(Node::Emphasis(after[..end].to_string()));
                rest = &after[end + 2..];
            }
            _ => {
                plain.push_str(&rest[..start]);
                plain.push_str("&&");
                rest = after;
            }
        }
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        out.push(Node::Text(plain));
    }
    buf.clear();
}

/// 解析 `{{` 与 `}}` 之间的内容
fn parse_annotation(inner: &str) -> Option<Annotation> {
    let portions: Vec<String> = split_portions(inner)
        .iter()
        .map(|raw| unescape_portion(raw.trim()))
        .collect();
    Annotation::from_portions(&portions)
}

/// 按未转义的 `||` 切分 portion，转义序列原样保留给 `unescape_portion`
fn split_portions(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cur = String::new();
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            cur.push('\\');
            if let Some(next) = chars.next() {
                cur.push(next);
            }
        } else if c == '|' && chars.peek() == Some(&'|') {
            chars.next();
            parts.push(std::mem::take(&mut cur));
        } else {
            cur.push(c);
        }
    }

    parts.push(cur);
    parts
}

/// 还原 portion 内的转义序列：`\|` `\\` `\n`
fn unescape_portion(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('|') => out.push('|'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let nodes = parse_document("Hello world.");
        assert_eq!(nodes, vec![Node::Text("Hello world.".to_string())]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_document("").is_empty());
    }

    #[test]
    fn test_annotation_with_three_portions() {
        let nodes = parse_document("Hello {{world||world||n. 世界}}.");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::Text("Hello ".to_string()));
        match &nodes[1] {
            Node::Annotation(ann) => {
                assert_eq!(ann.surface, "world");
                assert_eq!(ann.lemma.as_deref(), Some("world"));
                assert_eq!(ann.meaning.as_deref(), Some("n. 世界"));
                assert_eq!(ann.etymology, None);
            }
            other => panic!("期望注释节点，实际: {:?}", other),
        }
        assert_eq!(nodes[2], Node::Text(".".to_string()));
    }

    #[test]
    fn test_unbalanced_braces_are_literal() {
        let nodes = parse_document("a {{word b");
        assert_eq!(nodes, vec![Node::Text("a {{word b".to_string())]);
    }

    #[test]
    fn test_empty_annotation_is_literal() {
        let nodes = parse_document("a {{}} b");
        assert_eq!(nodes, vec![Node::Text("a {{}} b".to_string())]);
    }

    #[test]
    fn test_annotation_does_not_nest() {
        let nodes = parse_document("{{a {{b}} c}}");
        // 第一个 {{ 因内部又出现 {{ 而退化为文字，{{b}} 正常解析
        assert_eq!(
            nodes,
            vec![
                Node::Text("{{a ".to_string()),
                Node::Annotation(Annotation::surface_only("b")),
                Node::Text(" c}}".to_string()),
            ]
        );
    }

    #[test]
    fn test_annotation_does_not_cross_lines() {
        let nodes = parse_document("{{a\nb}}");
        assert_eq!(nodes, vec![Node::Text("{{a\nb}}".to_string())]);
    }

    #[test]
    fn test_escaped_pipes_in_portion() {
        let nodes = parse_document(r"{{or\|\|else||或者}}");
        match &nodes[0] {
            Node::Annotation(ann) => {
                assert_eq!(ann.surface, "or||else");
                assert_eq!(ann.lemma.as_deref(), Some("或者"));
            }
            other => panic!("期望注释节点，实际: {:?}", other),
        }
    }

    #[test]
    fn test_single_pipe_is_plain_content() {
        let nodes = parse_document("{{a|b||c}}");
        match &nodes[0] {
            Node::Annotation(ann) => {
                assert_eq!(ann.surface, "a|b");
                assert_eq!(ann.lemma.as_deref(), Some("c"));
            }
            other => panic!("期望注释节点，实际: {:?}", other),
        }
    }

    #[test]
    fn test_emphasis() {
        let nodes = parse_document("注意 &&这句话&& 很重要");
        assert_eq!(
            nodes,
            vec![
                Node::Text("注意 ".to_string()),
                Node::Emphasis("这句话".to_string()),
                Node::Text(" 很重要".to_string()),
            ]
        );
    }

    #[test]
    fn test_unpaired_emphasis_is_literal() {
        let nodes = parse_document("a && b");
        assert_eq!(nodes, vec![Node::Text("a && b".to_string())]);
    }

    #[test]
    fn test_emphasis_does_not_cross_annotation() {
        let nodes = parse_document("&&big {{w}} deal&&");
        assert_eq!(
            nodes,
            vec![
                Node::Text("&&big ".to_string()),
                Node::Annotation(Annotation::surface_only("w")),
                Node::Text(" deal&&".to_string()),
            ]
        );
    }

    #[test]
    fn test_audio_section() {
        let nodes = parse_document(":::abc\n{{cat||cat||n. 猫}}\n:::");
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::AudioSection { id, children } => {
                assert_eq!(id, "abc");
                assert_eq!(children.len(), 1);
                match &children[0] {
                    Node::Annotation(ann) => assert_eq!(ann.surface, "cat"),
                    other => panic!("期望注释节点，实际: {:?}", other),
                }
            }
            other => panic!("期望音频段节点，实际: {:?}", other),
        }
    }

    #[test]
    fn test_audio_section_does_not_nest() {
        let nodes = parse_document(":::outer\n:::inner\ntext\n:::");
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::AudioSection { id, children } => {
                assert_eq!(id, "outer");
                // 内层开启行按普通文字保留
                assert_eq!(children, &vec![Node::Text(":::inner\ntext".to_string())]);
            }
            other => panic!("期望音频段节点，实际: {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_audio_section_is_literal() {
        let nodes = parse_document(":::abc\nsome text");
        assert_eq!(nodes, vec![Node::Text(":::abc\nsome text".to_string())]);
    }

    #[test]
    fn test_orphan_closer_is_literal() {
        let nodes = parse_document("text\n:::\nmore");
        assert_eq!(nodes, vec![Node::Text("text\n:::\nmore".to_string())]);
    }

    #[test]
    fn test_text_around_audio_section() {
        let nodes = parse_document("before\n:::s1\ninner\n:::\nafter");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::Text("before\n".to_string()));
        match &nodes[1] {
            Node::AudioSection { id, .. } => assert_eq!(id, "s1"),
            other => panic!("期望音频段节点，实际: {:?}", other),
        }
        assert_eq!(nodes[2], Node::Text("\nafter".to_string()));
    }

    #[test]
    fn test_invalid_section_id_is_literal() {
        let nodes = parse_document(":::bad id\ntext\n:::");
        // 标识含空格 → 开启行不成立，后面的 ::: 也成了孤儿关闭行
        assert_eq!(
            nodes,
            vec![Node::Text(":::bad id\ntext\n:::".to_string())]
        );
    }
}
