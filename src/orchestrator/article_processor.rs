//! 单篇文章处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责批处理模式下单篇文章的完整生命周期。
//!
//! ## 核心功能
//!
//! 1. **请求构建**：把 TOML 任务转换为注释请求
//! 2. **落库初始化**：先把原文写进文章存储
//! 3. **流程调度**：委托 Annotator 执行注释流水线
//! 4. **结果输出**：把注释产物写到输出目录
//! 5. **文件清理**：删除已处理的 TOML 文件
//! 6. **统计输出**：记录成功/跳过数量

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::ArticleStore;
use crate::models::{Article, ArticleJob};
use crate::orchestrator::annotation_pipeline::Annotator;
use crate::utils::logging::truncate_text;

/// 处理单篇文章
///
/// # 参数
/// - `annotator`: 注释编排器
/// - `store`: 文章存储（用于初始化原文）
/// - `job`: 文章任务数据
/// - `article_index`: 文章索引（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回是否成功处理（true=成功，false=跳过）
pub async fn process_article(
    annotator: &Annotator,
    store: &dyn ArticleStore,
    job: ArticleJob,
    article_index: usize,
    config: &Config,
) -> Result<bool> {
    let req = job.to_request()?;

    log_article_start(article_index, &job);

    // 原文先落库，注释产出随后以一次更新覆盖
    store
        .put(Article {
            id: req.text_id.clone(),
            content: req.article_text.clone(),
            topics: Vec::new(),
            emoji: String::new(),
            language: req.language,
            library_id: None,
        })
        .await?;

    // 执行注释流水线
    let annotated = match annotator.annotate_article(&req).await {
        Ok(annotated) => annotated,
        Err(AppError::QuotaExceeded { user_id, cost }) => {
            warn!(
                "[文章 {}] ⚠️ 配额不足 (用户 {} 需要 {} 点)，跳过",
                article_index, user_id, cost
            );
            return Ok(false);
        }
        Err(e) => return Err(e).context("注释流水线失败"),
    };

    // 写出注释结果
    write_output(&req.text_id, &annotated.content, &annotated.topics, &annotated.emoji, config)
        .with_context(|| format!("写出注释结果失败: {}", req.text_id))?;

    // 清理文件
    cleanup_file(job.file_path.as_deref(), article_index)?;

    info!(
        "[文章 {}] ✅ 处理完成: {} 个话题, 表情 {}\n",
        article_index,
        annotated.topics.len(),
        annotated.emoji
    );

    Ok(true)
}

/// 把注释产物写到输出目录
fn write_output(
    text_id: &str,
    content: &str,
    topics: &[String],
    emoji: &str,
    config: &Config,
) -> Result<()> {
    fs::create_dir_all(&config.output_folder)?;

    let out_path = Path::new(&config.output_folder).join(format!("{}.md", text_id));
    let body = format!(
        "{} {}\n话题: {}\n\n{}\n",
        emoji,
        text_id,
        topics.join(", "),
        content
    );
    fs::write(&out_path, body)?;

    info!("输出已写入: {}", out_path.display());
    Ok(())
}

/// 清理已处理的文件
fn cleanup_file(file_path: Option<&str>, article_index: usize) -> Result<()> {
    if let Some(file_path) = file_path {
        if Path::new(file_path).exists() {
            fs::remove_file(file_path).with_context(|| format!("无法删除文件: {}", file_path))?;
            info!(
                "[文章 {}] 🗑️ 文件已删除: {}",
                article_index,
                Path::new(file_path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            );
        } else {
            warn!("[文章 {}] ⚠️ 文件不存在: {}", article_index, file_path);
        }
    } else {
        warn!("[文章 {}] ⚠️ 文件路径未设置", article_index);
    }

    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_article_start(article_index: usize, job: &ArticleJob) {
    info!("[文章 {}] 开始处理", article_index);
    if !job.title.is_empty() {
        info!("[文章 {}] 标题: {}", article_index, job.title);
    }
    info!("[文章 {}] ID: {}", article_index, job.id);
    info!(
        "[文章 {}] 语种: {} | 长度: {} 字符",
        article_index,
        job.language,
        job.text.chars().count()
    );
    info!(
        "[文章 {}] 开头: {}",
        article_index,
        truncate_text(&job.text, 60)
    );
}
