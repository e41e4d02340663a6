//! 提示词构建 - 业务能力层
//!
//! 每个语种一套注释要求，静态表在编译期固化

use phf::phf_map;

use crate::models::Language;

/// 语种特定的注释要求，按语种代码索引
static ANNOTATE_GUIDES: phf::Map<&'static str, &'static str> = phf_map! {
    "en" => "挑选中国学习者容易生词的英文单词和短语。词典原形给不带屈折变化的形式；\
             语境释义用中文并带词性标注（如 n. / v. / adj.）；词源简述来源语言和演变；\
             同源词列出 1-2 个拼写相近、记忆上有帮助的词。",
    "ja" => "挑选 N3 以上难度的日语词汇和惯用表达。词典原形给辞书形；\
             语境释义用中文并标注词性；词源说明汉字来源或和语/外来语属性；\
             同源词列出同一汉字系的常见词。",
    "fr" => "挑选中国学习者容易生词的法语单词和短语。词典原形给不定式或单数阳性形式；\
             语境释义用中文并带词性标注；词源简述拉丁语来源；同源词优先给英语同源词。",
    "de" => "挑选中国学习者容易生词的德语单词和短语。词典原形给不定式或单数主格（名词带词性冠词）；\
             语境释义用中文并带词性标注；词源简述来源；同源词优先给英语同源词。",
    "es" => "挑选中国学习者容易生词的西班牙语单词和短语。词典原形给不定式或单数阳性形式；\
             语境释义用中文并带词性标注；词源简述拉丁语来源；同源词优先给英语同源词。",
};

/// 新语种还没有专门要求时的兜底
static DEFAULT_GUIDE: &str = "挑选中国学习者容易生词的单词和短语。词典原形给不带屈折变化的形式；\
                              语境释义用中文并带词性标注；词源和同源词酌情给出。";

/// 取语种的注释要求
pub fn annotate_guide(language: Language) -> &'static str {
    ANNOTATE_GUIDES
        .get(language.code())
        .copied()
        .unwrap_or(DEFAULT_GUIDE)
}

/// 构建分段注释的消息
///
/// 返回 (user_message, system_message)
pub fn build_chunk_messages(
    chunk_text: &str,
    language: Language,
    only_comments: bool,
) -> (String, String) {
    let system_message = format!(
        "你是一个专业的{}阅读注释助手，负责为语言学习者在原文里内嵌词汇注释。\
         你只在需要注释的词上加标记，其余内容一个字符都不许改动。",
        language.name()
    );

    let emphasis_rule = if only_comments {
        "本次只生成词汇注释，不要使用 &&…&& 重点标记。"
    } else {
        "可以用 &&句子&& 把全文最关键的 1-2 句包成重点标记，不要更多。"
    };

    let user_message = format!(
        r#"请为下面的{}文本添加内嵌词汇注释。

【标记语法】
- 注释写成 {{{{表层词形||词典原形||语境释义||词源||同源词}}}}，后四项可以从右往左省略，但不能跳项
- 表层词形必须是原文中实际出现的那个形式，原样保留
- portion 内不能出现字面的 || 和换行，需要时用 \| 和 \n 转义
- 注释不能嵌套

【重要说明】
- 除了被 {{{{…}}}} 包住的词之外，所有内容必须逐字保留：不许增删改任何文字、标点、空行
- 文中已有的 {{{{…}}}} 注释保持原样，不要重复注释，也不要修改它们
- {}
- 注释密度：每 100 个词挑 3-8 个值得注释的

【注释要求】
{}

【待注释文本】
{}

只返回加好标记的文本，不要任何额外解释。"#,
        language.name(),
        emphasis_rule,
        annotate_guide(language),
        chunk_text
    );

    (user_message, system_message)
}

/// 构建全文话题提取的消息
pub fn build_topics_messages(article_text: &str, language: Language) -> (String, String) {
    let system_message = "你是一个文章分类助手，擅长提炼简洁的中文话题标签。".to_string();

    let user_message = format!(
        r#"阅读下面的{}文章，提炼 3-5 个中文话题标签。

【要求】
- 每个标签 2-6 个字，按相关度从高到低排列
- 一行一个标签，不要编号，不要任何额外解释

【文章】
{}"#,
        language.name(),
        article_text
    );

    (user_message, system_message)
}

/// 构建全文表情选择的消息
pub fn build_emoji_messages(article_text: &str, language: Language) -> (String, String) {
    let system_message = "你是一个挑选表情符号的助手。".to_string();

    let user_message = format!(
        r#"阅读下面的{}文章，挑选一个最能代表文章主题的 emoji。

只返回这一个 emoji，不要返回任何其他内容。

【文章】
{}"#,
        language.name(),
        article_text
    );

    (user_message, system_message)
}
