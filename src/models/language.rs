/// 文章语种枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Language {
    /// 英语
    English,
    /// 日语
    Japanese,
    /// 法语
    French,
    /// 德语
    German,
    /// 西班牙语
    Spanish,
}

impl Language {
    /// 获取语种代码（BCP 47）
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Japanese => "ja",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "英语",
            Language::Japanese => "日语",
            Language::French => "法语",
            Language::German => "德语",
            Language::Spanish => "西班牙语",
        }
    }

    /// 单次生成调用允许的最大分段长度（字符数）
    ///
    /// 日语文本信息密度高，分段上限取其他语种的一半
    pub fn max_chunk_chars(self) -> usize {
        match self {
            Language::Japanese => 1000,
            _ => 2000,
        }
    }

    /// 单篇文章允许的最大长度（字符数），超过则在分段前拒绝
    pub fn max_article_chars(self) -> usize {
        match self {
            Language::Japanese => 25_000,
            _ => 50_000,
        }
    }

    /// 从代码解析语种
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::English),
            "ja" => Some(Language::Japanese),
            "fr" => Some(Language::French),
            "de" => Some(Language::German),
            "es" => Some(Language::Spanish),
            _ => None,
        }
    }

    /// 尝试从字符串解析语种（精确匹配）
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "英语" | "英" | "en" | "english" => Some(Language::English),
            "日语" | "日" | "ja" | "japanese" => Some(Language::Japanese),
            "法语" | "法" | "fr" | "french" => Some(Language::French),
            "德语" | "德" | "de" | "german" => Some(Language::German),
            "西班牙语" | "西" | "es" | "spanish" => Some(Language::Spanish),
            _ => None,
        }
    }

    /// 智能查找语种（支持模糊匹配）
    pub fn find(s: &str) -> Option<Self> {
        // 先尝试精确匹配
        if let Some(language) = Self::from_str(s) {
            return Some(language);
        }

        // 模糊匹配
        let s_lower = s.to_lowercase();
        if s_lower.contains("英语") || s_lower.contains("english") {
            return Some(Language::English);
        }
        if s_lower.contains("日语") || s_lower.contains("japanese") {
            return Some(Language::Japanese);
        }
        if s_lower.contains("法语") || s_lower.contains("french") {
            return Some(Language::French);
        }
        if s_lower.contains("德语") || s_lower.contains("german") {
            return Some(Language::German);
        }
        if s_lower.contains("西班牙语") || s_lower.contains("spanish") {
            return Some(Language::Spanish);
        }

        None
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
