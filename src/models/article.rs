//! 文章与注释请求的领域模型

use serde::{Deserialize, Serialize};

use crate::models::Language;

/// 一篇文章
///
/// `content` 始终是标记语法下的规范文本。语法不合法的片段会被解析器
/// 当作普通文字原样保留，所以这里不存在"内容解析失败"的状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// 文章唯一标识
    pub id: String,
    /// 规范文本（标记语法）
    pub content: String,
    /// 话题标签，保持生成时的顺序
    #[serde(default)]
    pub topics: Vec<String>,
    /// 文章表情符号（单个 emoji）
    #[serde(default)]
    pub emoji: String,
    /// 文章语种
    pub language: Language,
    /// 所属文库
    #[serde(default)]
    pub library_id: Option<String>,
}

/// 注释请求
///
/// 用户与订阅体系不在本系统内，`user_id` 与 `has_subscription`
/// 由调用方（外部用户服务）提供
#[derive(Debug, Clone)]
pub struct AnnotationRequest {
    /// 待注释的原始文章文本
    pub article_text: String,
    /// 文章标识，也是进度查询的键
    pub text_id: String,
    /// 文章语种
    pub language: Language,
    /// 只生成注释，不加重点标记
    pub only_comments: bool,
    /// 发起请求的用户
    pub user_id: String,
    /// 用户是否有有效订阅（决定完成后是否推送通知）
    pub has_subscription: bool,
}

/// 注释流水线的产出：新的规范文本加全文级元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedArticle {
    pub content: String,
    pub topics: Vec<String>,
    pub emoji: String,
}

/// `request_annotation` 的同步返回：进入后台执行，或在准入阶段被拒
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationOutcome {
    /// 已通过准入检查并开始执行
    Enqueued,
    /// 配额不足，未发起任何外部调用
    QuotaExceeded,
}
