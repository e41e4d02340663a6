//! 注释流水线 - 编排层
//!
//! ## 职责
//!
//! 本模块负责单篇文章的完整注释流水线，是分段级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **准入控制**：长度门 + 配额门，任何外部调用之前完成
//! 2. **并发扇出**：每个分段一个生成单元，外加话题、表情两路全文调用
//! 3. **有序合并**：结果按原始分段序号归位，与完成顺序无关
//! 4. **进度推进**：annotating → saving → completed
//! 5. **一次落库**：内容、话题、表情在一次更新里持久化
//! 6. **尽力通知**：订阅用户完成后推送，失败不影响流水线
//!
//! ## 失败语义
//!
//! 任何单元重试耗尽即整个任务失败：已存内容保持不变，已扣配额不退还，
//! 进度键停在 annotating 并随 TTL 过期，轮询端据此读到 unknown

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{ArticleStore, TtlStore};
use crate::models::{
    AnnotatedArticle, AnnotationOutcome, AnnotationRequest, ProgressState, ProgressView,
};
use crate::services::llm_service::{parse_emoji, parse_topics};
use crate::services::{
    prompts, Chunker, Notifier, NotifyPayload, ProgressTracker, QuotaLedger, TextGenerator,
};
use crate::workflow::{AnnotateCtx, ChunkFlow};

/// 注释编排器
pub struct Annotator {
    generator: Arc<dyn TextGenerator>,
    quota: Arc<dyn QuotaLedger>,
    store: Arc<dyn ArticleStore>,
    notifier: Arc<dyn Notifier>,
    progress: ProgressTracker,
    chunker: Chunker,
    config: Config,
}

impl Annotator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        quota: Arc<dyn QuotaLedger>,
        store: Arc<dyn ArticleStore>,
        ttl_store: Arc<dyn TtlStore>,
        notifier: Arc<dyn Notifier>,
        config: Config,
    ) -> Self {
        let progress = ProgressTracker::new(ttl_store, Duration::from_secs(config.progress_ttl_secs));
        Self {
            generator,
            quota,
            store,
            notifier,
            progress,
            chunker: Chunker::new(),
            config,
        }
    }

    /// 一次注释任务的配额成本
    ///
    /// 准入发生在分段之前，成本按文章长度折算而不是分段数
    pub fn annotation_cost(text: &str) -> u32 {
        1 + (text.chars().count() / 1000) as u32
    }

    /// 受理注释请求：通过两道门后转入后台执行
    ///
    /// 配额不足是正常业务结果（`QuotaExceeded`），不发起任何外部调用；
    /// 文章超长是错误（`InputTooLarge`），在扣配额之前就被拒绝
    pub async fn request_annotation(
        self: &Arc<Self>,
        req: AnnotationRequest,
    ) -> AppResult<AnnotationOutcome> {
        if !self.admit(&req).await? {
            return Ok(AnnotationOutcome::QuotaExceeded);
        }

        let annotator = Arc::clone(self);
        let text_id = req.text_id.clone();
        tokio::spawn(async move {
            if let Err(e) = annotator.run_pipeline(&req).await {
                // 进度停在 annotating，随 TTL 过期；已扣配额不退还
                error!("[文章 {}] ❌ 注释任务失败: {:#}", req.text_id, e);
            }
        });

        info!("✓ 注释任务已受理: {}", text_id);
        Ok(AnnotationOutcome::Enqueued)
    }

    /// 同步执行完整流水线（批处理模式和测试用）
    pub async fn annotate_article(&self, req: &AnnotationRequest) -> AppResult<AnnotatedArticle> {
        if !self.admit(req).await? {
            return Err(AppError::QuotaExceeded {
                user_id: req.user_id.clone(),
                cost: Self::annotation_cost(&req.article_text),
            });
        }

        self.run_pipeline(req).await.map_err(|e| AppError::UnitOfWork {
            unit: format!("article:{}", req.text_id),
            source: e,
        })
    }

    /// 查询注释进度
    pub async fn get_progress(&self, text_id: &str) -> ProgressView {
        self.progress.get_progress(text_id).await
    }

    /// 两道准入门：长度门（免费，先查）→ 配额门
    ///
    /// 返回 Ok(false) 表示配额不足；此时没有发生任何扣减和外部调用
    async fn admit(&self, req: &AnnotationRequest) -> AppResult<bool> {
        let chars = req.article_text.chars().count();
        let max_chars = req.language.max_article_chars();
        if chars > max_chars {
            return Err(AppError::InputTooLarge {
                chars,
                max_chars,
                language: req.language,
            });
        }

        let cost = Self::annotation_cost(&req.article_text);
        let admitted = self
            .quota
            .try_debit(&req.user_id, cost)
            .await
            .map_err(|e| AppError::Store {
                operation: "try_debit".to_string(),
                source: e,
            })?;

        if !admitted {
            warn!(
                "⚠️ 配额不足: 用户 {} 请求 {} 点，文章 {}",
                req.user_id, cost, req.text_id
            );
        }
        Ok(admitted)
    }

    /// 流水线主体：分段 → 扇出 → 按序合并 → 落库 → 通知
    async fn run_pipeline(&self, req: &AnnotationRequest) -> Result<AnnotatedArticle> {
        let chunks = self
            .chunker
            .chunk(&req.article_text, req.language.max_chunk_chars());

        log_pipeline_start(&req.text_id, req.language.name(), chunks.len());

        // 进度：分发之前置为 annotating
        self.progress
            .set_progress(&req.text_id, ProgressState::Annotating)
            .await;

        // ========== 两路全文调用（与分段调用并发，不占分段信号量） ==========
        let topics_handle = {
            let generator = Arc::clone(&self.generator);
            let (user, system) = prompts::build_topics_messages(&req.article_text, req.language);
            tokio::spawn(async move {
                generator
                    .generate(&user, Some(&system))
                    .await
                    .map(|response| parse_topics(&response))
            })
        };
        let emoji_handle = {
            let generator = Arc::clone(&self.generator);
            let (user, system) = prompts::build_emoji_messages(&req.article_text, req.language);
            tokio::spawn(async move {
                generator
                    .generate(&user, Some(&system))
                    .await
                    .map(|response| parse_emoji(&response))
            })
        };

        // ========== 分段扇出 ==========
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_chunks));
        let flow = Arc::new(ChunkFlow::new(
            Arc::clone(&self.generator),
            self.config.max_chunk_attempts,
        ));

        let mut handles = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("信号量已关闭")?;
            let flow = Arc::clone(&flow);
            let chunk = chunk.clone();
            let ctx = AnnotateCtx::new(req.text_id.clone(), chunk.index, chunks.len(), req.language);
            let only_comments = req.only_comments;

            handles.push((
                chunk.index,
                tokio::spawn(async move {
                    let _permit = permit;
                    flow.annotate_chunk(&chunk, &ctx, only_comments).await
                }),
            ));
        }

        // ========== 合并屏障：等齐所有单元，结果按原始分段序号归位，与完成顺序无关 ==========
        let joined = futures::future::join_all(
            handles
                .into_iter()
                .map(|(index, handle)| async move { (index, handle.await) }),
        )
        .await;

        let mut slots: Vec<Option<String>> = vec![None; chunks.len()];
        for (index, join_result) in joined {
            let annotated = join_result
                .context("分段任务执行失败")?
                .with_context(|| format!("分段 {} 注释失败", index))?;
            slots[index] = Some(annotated);
        }

        let topics = topics_handle
            .await
            .context("话题任务执行失败")?
            .context("话题提取失败")?;
        let emoji = emoji_handle
            .await
            .context("表情任务执行失败")?
            .context("表情选择失败")?;

        // 段落分隔归一化后拼接
        let content = slots
            .into_iter()
            .map(|slot| slot.expect("合并屏障保证所有槽位已填"))
            .collect::<Vec<_>>()
            .join("\n\n");

        // 进度：合并完成、落库之前置为 saving
        self.progress
            .set_progress(&req.text_id, ProgressState::Saving)
            .await;

        // 内容、话题、表情一次落库，绝不部分生效
        self.store
            .save_annotated(&req.text_id, &content, &topics, &emoji)
            .await
            .with_context(|| format!("持久化失败: {}", req.text_id))?;

        self.progress
            .set_progress(&req.text_id, ProgressState::Completed)
            .await;

        // ========== 尽力通知（订阅用户） ==========
        if req.has_subscription {
            let notifier = Arc::clone(&self.notifier);
            let user_id = req.user_id.clone();
            let payload = NotifyPayload {
                text_id: req.text_id.clone(),
                topics: topics.clone(),
                emoji: emoji.clone(),
            };
            tokio::spawn(async move {
                if let Err(e) = notifier.notify(&user_id, &payload).await {
                    warn!("⚠️ 完成通知推送失败 (用户 {}): {}", user_id, e);
                }
            });
        }

        log_pipeline_complete(&req.text_id, &topics, &emoji);

        Ok(AnnotatedArticle {
            content,
            topics,
            emoji,
        })
    }
}

// ========== 日志辅助函数 ==========

fn log_pipeline_start(text_id: &str, language: &str, chunk_count: usize) {
    info!("[文章 {}] 开始注释", text_id);
    info!("[文章 {}] 语种: {}", text_id, language);
    info!("[文章 {}] 🚀 分发 {} 个分段单元 + 话题 + 表情", text_id, chunk_count);
}

fn log_pipeline_complete(text_id: &str, topics: &[String], emoji: &str) {
    info!(
        "[文章 {}] ✅ 注释完成: 话题 [{}] 表情 {}",
        text_id,
        topics.join(", "),
        emoji
    );
}
