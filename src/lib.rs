//! # Article Annotate
//!
//! 一个为语言学习者在长文里内嵌词汇注释的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有存储资源，只暴露能力
//! - `TtlStore` - 带 TTL 的临时键值存储（进度状态的载体）
//! - `ArticleStore` - 文章持久化存储
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个分段/单次调用
//! - `Chunker` - 段落 → 句子 → 硬切的三层分段能力
//! - `TextGenerator` / `LlmService` - 文本生成能力
//! - `ProgressTracker` - 进度读写能力
//! - `QuotaLedger` - 配额扣减能力（准入门）
//! - `Notifier` - 完成通知能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个分段"的完整处理流程
//! - `AnnotateCtx` - 上下文封装（text_id + chunk_index）
//! - `ChunkFlow` - 流程编排（提示词 → 生成 → 校验 → 重试）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/annotation_pipeline` - 单篇文章的扇出/合并流水线
//! - `orchestrator/article_processor` - 批处理模式下的单篇文章处理器
//! - `orchestrator/batch_processor` - 批量文章处理器，管理资源和并发
//!
//! 标记编解码器（`markup/`）独立于流水线，存储、展示、编辑三方共用。
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod markup;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ArticleStore, MemoryArticleStore, MemoryTtlStore, TtlStore};
pub use markup::{EditorDoc, EditorNode, Node, Sanitizer};
pub use models::{
    AnnotatedArticle, AnnotationOutcome, AnnotationRequest, Article, Chunk, Language,
    ProgressState, ProgressView,
};
pub use orchestrator::{process_article, Annotator, App};
pub use services::{Chunker, LlmService, TextGenerator};
pub use workflow::{AnnotateCtx, ChunkFlow};
