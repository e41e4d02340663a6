//! LLM 服务 - 业务能力层
//!
//! 只负责"文本生成"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;

/// 文本生成能力
///
/// 外部生成服务的契约：给定提示词，返回全文。
/// 编排层只依赖这个 trait，测试里用它注入可控的假实现
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 非流式生成
    async fn generate(&self, user_message: &str, system_message: Option<&str>) -> Result<String>;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成文本
/// - 只处理单次调用
/// - 不出现 Vec<Chunk>
/// - 不出现 text_id / chunk_index
/// - 不关心流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求（注释输出可能比输入长，max_tokens 要给足）
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(8192u32)
            .build()?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        self.send_to_llm(user_message, system_message).await
    }
}

/// 解析话题提取的 LLM 响应
///
/// 容错解析：按行/逗号切分，去掉编号和点缀符号，最多保留 5 个
pub fn parse_topics(response: &str) -> Vec<String> {
    let mut topics = Vec::new();

    for piece in response.lines().flat_map(|l| l.split(['，', ','])) {
        let topic = piece
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '、' || c == '-')
            .trim();
        if topic.is_empty() {
            continue;
        }
        if !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
        if topics.len() == 5 {
            break;
        }
    }

    if topics.is_empty() {
        warn!("无法从响应中解析话题: '{}'", response);
    }
    topics
}

/// 解析表情选择的 LLM 响应
///
/// 取第一个落在 emoji 码位区间的字符；实在没有时退回默认值
pub fn parse_emoji(response: &str) -> String {
    match response.chars().find(|&c| is_emoji_char(c)) {
        Some(c) => c.to_string(),
        None => {
            warn!("无法从响应中解析 emoji: '{}', 使用默认值", response);
            "📖".to_string()
        }
    }
}

fn is_emoji_char(c: char) -> bool {
    let cp = c as u32;
    (0x1F300..=0x1FAFF).contains(&cp) || (0x2600..=0x27BF).contains(&cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topics_one_per_line() {
        let topics = parse_topics("科技\n人工智能\n教育");
        assert_eq!(topics, vec!["科技", "人工智能", "教育"]);
    }

    #[test]
    fn test_parse_topics_numbered_and_comma() {
        let topics = parse_topics("1. 科技，2. 教育");
        assert_eq!(topics, vec!["科技", "教育"]);
    }

    #[test]
    fn test_parse_topics_caps_at_five_and_dedups() {
        let topics = parse_topics("a\nb\na\nc\nd\ne\nf");
        assert_eq!(topics.len(), 5);
        assert_eq!(topics, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_parse_emoji_direct() {
        assert_eq!(parse_emoji("🚀"), "🚀");
    }

    #[test]
    fn test_parse_emoji_with_noise() {
        assert_eq!(parse_emoji("我选择：🐱"), "🐱");
        assert_eq!(parse_emoji("emoji: 🐱"), "🐱");
    }

    #[test]
    fn test_parse_emoji_fallback() {
        assert_eq!(parse_emoji("none"), "📖");
    }
}
