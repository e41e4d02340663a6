use article_annotate::services::llm_service::{parse_topics, LlmService};
use article_annotate::services::prompts;
use article_annotate::utils::logging;
use article_annotate::{
    AnnotationRequest, Annotator, Article, Config, Language, MemoryArticleStore, MemoryTtlStore,
};
use article_annotate::infrastructure::ArticleStore;
use article_annotate::services::{MemoryQuotaLedger, NoopNotifier};
use std::sync::Arc;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_annotate_single_article() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 组装协作方（真实 LLM + 内存存储）
    let generator = Arc::new(LlmService::new(&config));
    let quota = Arc::new(MemoryQuotaLedger::new(config.default_quota));
    let store = Arc::new(MemoryArticleStore::new());
    let ttl_store = Arc::new(MemoryTtlStore::new());

    let annotator = Annotator::new(
        generator,
        quota,
        Arc::clone(&store) as Arc<dyn ArticleStore>,
        ttl_store,
        Arc::new(NoopNotifier),
        config,
    );

    let text = "The quick brown fox jumps over the lazy dog. \
                It was a bright cold day in April, and the clocks were striking thirteen.";

    store
        .put(Article {
            id: "live-1".to_string(),
            content: text.to_string(),
            topics: Vec::new(),
            emoji: String::new(),
            language: Language::English,
            library_id: None,
        })
        .await
        .expect("初始化文章失败");

    let req = AnnotationRequest {
        article_text: text.to_string(),
        text_id: "live-1".to_string(),
        language: Language::English,
        only_comments: false,
        user_id: "tester".to_string(),
        has_subscription: false,
    };

    let annotated = annotator
        .annotate_article(&req)
        .await
        .expect("注释流水线失败");

    println!("\n========== 注释结果 ==========");
    println!("{}", annotated.content);
    println!("话题: {:?}", annotated.topics);
    println!("表情: {}", annotated.emoji);
    println!("==============================\n");

    assert!(!annotated.content.is_empty());
    assert!(annotated.content.contains("{{"), "结果中应该出现注释标记");
}

#[tokio::test]
#[ignore]
async fn test_llm_topics_live() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();
    let service = LlmService::new(&config);

    let (user, system) = prompts::build_topics_messages(
        "Artificial intelligence is transforming how students learn foreign languages.",
        Language::English,
    );

    let response = service
        .send_to_llm(&user, Some(&system))
        .await
        .expect("LLM 调用失败");

    println!("\n========== LLM 响应 ==========");
    println!("{}", response);
    println!("==============================\n");

    let topics = parse_topics(&response);
    println!("解析出的话题: {:?}", topics);
    assert!(!topics.is_empty(), "应该能解析出至少一个话题");
}
