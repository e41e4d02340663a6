//! 文章分段服务 - 业务能力层
//!
//! 只负责"切分文本"能力，不关心流程
//!
//! 三层回退策略：
//! 1. 按空行切段落，累积到上限就落一个分段
//! 2. 单个段落就超限时，退到句子粒度（句末标点切分）再做同样的累积
//! 3. 单个句子仍超限时，最后按固定长度硬切
//!
//! 回退顺序保证每个分段在不超限的前提下语义尽量完整，
//! 同时给下游生成调用一个可靠的长度上界

use regex::Regex;

use crate::models::Chunk;

/// 分段服务
///
/// 职责：
/// - 把原始文章切成有序、有界的分段
/// - 只做纯文本切分
/// - 不出现 text_id / user_id
/// - 不关心流程顺序
pub struct Chunker {
    paragraph_re: Regex,
}

impl Chunker {
    /// 创建新的分段服务（正则只编译一次）
    pub fn new() -> Self {
        Self {
            paragraph_re: Regex::new(r"\n[ \t\r]*\n").expect("固定正则"),
        }
    }

    /// 切分文本，每段字符数 ≤ `max_chars`（单句超限硬切的情况除外，
    /// 硬切出的子段严格等于 `max_chars`，末尾一段可能更短）
    ///
    /// 空输入返回空列表；不超限的输入恰好返回一个分段。
    /// 把所有分段按序用空行拼回去，可以还原原文（分隔空白归一化）
    pub fn chunk(&self, text: &str, max_chars: usize) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut pieces: Vec<String> = Vec::new();
        let mut buffer = String::new();
        let mut buffer_chars = 0usize;

        for paragraph in self.paragraph_re.split(text) {
            let paragraph = paragraph.trim_matches(['\n', '\r']);
            if paragraph.trim().is_empty() {
                continue;
            }
            let para_chars = paragraph.chars().count();

            // ========== 回退 2：单个段落就超限 ==========
            if para_chars >= max_chars {
                flush(&mut pieces, &mut buffer, &mut buffer_chars);
                self.chunk_sentences(paragraph, max_chars, &mut pieces);
                continue;
            }

            // ========== 层级 1：段落累积 ==========
            if buffer.is_empty() {
                buffer.push_str(paragraph);
                buffer_chars = para_chars;
            } else if buffer_chars + 2 + para_chars > max_chars {
                flush(&mut pieces, &mut buffer, &mut buffer_chars);
                buffer.push_str(paragraph);
                buffer_chars = para_chars;
            } else {
                buffer.push_str("\n\n");
                buffer.push_str(paragraph);
                buffer_chars += 2 + para_chars;
            }
        }

        flush(&mut pieces, &mut buffer, &mut buffer_chars);

        pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk::new(index, text))
            .collect()
    }

    /// 句子粒度的累积/落段，句子切片严格划分段落原文
    fn chunk_sentences(&self, paragraph: &str, max_chars: usize, pieces: &mut Vec<String>) {
        let mut buffer = String::new();
        let mut buffer_chars = 0usize;

        for sentence in split_sentences(paragraph) {
            let sent_chars = sentence.chars().count();

            // ========== 回退 3：单个句子仍超限，硬切 ==========
            if sent_chars >= max_chars {
                flush(pieces, &mut buffer, &mut buffer_chars);
                hard_slice(sentence, max_chars, pieces);
                continue;
            }

            if buffer_chars + sent_chars > max_chars {
                flush(pieces, &mut buffer, &mut buffer_chars);
            }
            // 句子切片自带尾随空白，直接拼接即可还原
            buffer.push_str(sentence);
            buffer_chars += sent_chars;
        }

        flush(pieces, &mut buffer, &mut buffer_chars);
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}

fn flush(pieces: &mut Vec<String>, buffer: &mut String, buffer_chars: &mut usize) {
    if !buffer.trim().is_empty() {
        pieces.push(std::mem::take(buffer));
    } else {
        buffer.clear();
    }
    *buffer_chars = 0;
}

/// 把段落切成句子切片，切片拼接严格等于段落原文
///
/// 句末标点（含中日文全角）连同后续的引号和空白都归入当前句
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut iter = paragraph.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if !is_terminal(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = iter.peek() {
            if is_terminal(next) || is_closing_quote(next) || next.is_whitespace() {
                end = j + next.len_utf8();
                iter.next();
            } else {
                break;
            }
        }
        sentences.push(&paragraph[start..end]);
        start = end;
    }

    if start < paragraph.len() {
        sentences.push(&paragraph[start..]);
    }
    sentences
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | '…')
}

fn is_closing_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '”' | '’' | '」' | '』' | '）' | ')')
}

/// 最后手段：按固定字符数硬切
fn hard_slice(sentence: &str, max_chars: usize, pieces: &mut Vec<String>) {
    let mut cur = String::new();
    let mut count = 0usize;

    for c in sentence.chars() {
        cur.push(c);
        count += 1;
        if count == max_chars {
            pieces.push(std::mem::take(&mut cur));
            count = 0;
        }
    }

    if !cur.is_empty() {
        pieces.push(cur);
    }
}
