//! 批量文章处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量文章的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、组装生成服务和各个协作方
//! 2. **批量加载**：扫描并加载所有待处理的文章（`Vec<ArticleJob>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将文章分批次处理，每批完成后再开始下一批
//! 5. **资源管理**：唯一持有各协作方的 Arc，向下只传引用
//! 6. **全局统计**：汇总所有文章的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单篇文章的细节
//! - **并发安全**：通过 Semaphore 和 tokio::spawn 实现并发
//! - **向下委托**：委托 article_processor 处理单篇文章

use crate::config::Config;
use crate::infrastructure::{ArticleStore, MemoryArticleStore, MemoryTtlStore};
use crate::models::{load_all_toml_files, ArticleJob};
use crate::orchestrator::annotation_pipeline::Annotator;
use crate::orchestrator::article_processor;
use crate::services::{
    LlmService, MemoryQuotaLedger, NoopNotifier, Notifier, WebhookNotifier,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::utils::logging::{
    init_log_file, log_articles_loaded, log_batch_complete, log_batch_start, log_startup,
    print_final_stats,
};

/// 应用主结构
pub struct App {
    config: Config,
    annotator: Arc<Annotator>,
    store: Arc<dyn ArticleStore>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(config.max_concurrent_articles);

        // 组装协作方
        let generator = Arc::new(LlmService::new(&config));
        let quota = Arc::new(MemoryQuotaLedger::new(config.default_quota));
        let store: Arc<dyn ArticleStore> = Arc::new(MemoryArticleStore::new());
        let ttl_store = Arc::new(MemoryTtlStore::new());
        let notifier: Arc<dyn Notifier> = if config.notify_webhook_url.is_empty() {
            Arc::new(NoopNotifier)
        } else {
            Arc::new(WebhookNotifier::new(config.notify_webhook_url.clone()))
        };

        let annotator = Arc::new(Annotator::new(
            generator,
            quota,
            Arc::clone(&store),
            ttl_store,
            notifier,
            config.clone(),
        ));

        Ok(Self {
            config,
            annotator,
            store,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待处理的文章
        let all_jobs = self.load_jobs().await?;

        if all_jobs.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(());
        }

        let total_jobs = all_jobs.len();
        log_articles_loaded(total_jobs, self.config.max_concurrent_articles);

        // 处理所有文章
        let stats = self.process_all_articles(all_jobs).await?;

        // 输出最终统计
        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(())
    }

    /// 加载文章
    async fn load_jobs(&self) -> Result<Vec<ArticleJob>> {
        info!("\n📁 正在扫描待处理的文章...");
        load_all_toml_files(&self.config.articles_folder).await
    }

    /// 处理所有文章
    async fn process_all_articles(&self, all_jobs: Vec<ArticleJob>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_articles));
        let total_jobs = all_jobs.len();
        let mut stats = ProcessingStats {
            total: total_jobs,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total_jobs).step_by(self.config.max_concurrent_articles) {
            let batch_end = (batch_start + self.config.max_concurrent_articles).min(total_jobs);
            let batch_jobs = &all_jobs[batch_start..batch_end];
            let batch_num = (batch_start / self.config.max_concurrent_articles) + 1;
            let total_batches = (total_jobs + self.config.max_concurrent_articles - 1)
                / self.config.max_concurrent_articles;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_jobs,
            );

            // 处理本批
            let batch_result = self
                .process_batch(batch_jobs, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, batch_result.success, batch_result.total());
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_jobs: &[ArticleJob],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, job) in batch_jobs.iter().enumerate() {
            let article_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let annotator = Arc::clone(&self.annotator);
            let store = Arc::clone(&self.store);
            let job_clone = job.clone();
            let config_clone = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                match article_processor::process_article(
                    &annotator,
                    store.as_ref(),
                    job_clone,
                    article_index,
                    &config_clone,
                )
                .await
                {
                    Ok(done) => Ok(done),
                    Err(e) => {
                        error!("[文章 {}] ❌ 处理过程中发生错误: {:#}", article_index, e);
                        Err(e)
                    }
                }
            });
            batch_handles.push((article_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for (article_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(true)) => {
                    result.success += 1;
                }
                Ok(Ok(false)) | Ok(Err(_)) => {
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[文章 {}] 任务执行失败: {}", article_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

impl BatchResult {
    fn total(&self) -> usize {
        self.success + self.failed
    }
}
