/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的文章数量
    pub max_concurrent_articles: usize,
    /// 单篇文章内同时在飞的生成调用数量
    pub max_concurrent_chunks: usize,
    /// 单个生成单元的最大尝试次数
    pub max_chunk_attempts: usize,
    /// 进度键的存活时间（秒），任务应远早于它结束
    pub progress_ttl_secs: u64,
    /// TOML文章文件存放目录
    pub articles_folder: String,
    /// 注释结果输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 通知配置 ---
    /// 完成通知的 webhook 地址，为空则不通知
    pub notify_webhook_url: String,
    /// 批处理模式下每个用户的初始配额
    pub default_quota: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_articles: 4,
            max_concurrent_chunks: 8,
            max_chunk_attempts: 3,
            progress_ttl_secs: 300,
            articles_folder: "articles_toml".to_string(),
            output_folder: "annotated".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_api_key: "26e96c4d312e48feacbd78b7c42bd71e".to_string(),
            llm_api_base_url: "http://menshen.xdf.cn/v1".to_string(),
            llm_model_name: "gemini-3.0-pro-preview".to_string(),
            notify_webhook_url: String::new(),
            default_quota: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_articles: std::env::var("MAX_CONCURRENT_ARTICLES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_articles),
            max_concurrent_chunks: std::env::var("MAX_CONCURRENT_CHUNKS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_chunks),
            max_chunk_attempts: std::env::var("MAX_CHUNK_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_chunk_attempts),
            progress_ttl_secs: std::env::var("PROGRESS_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.progress_ttl_secs),
            articles_folder: std::env::var("ARTICLES_FOLDER").unwrap_or(default.articles_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").unwrap_or(default.notify_webhook_url),
            default_quota: std::env::var("DEFAULT_QUOTA").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_quota),
        }
    }
}
