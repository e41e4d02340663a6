//! 分段注释流程 - 流程层
//!
//! 核心职责：定义"一个分段"的完整处理流程
//!
//! 流程顺序：
//! 1. 构建提示词（语种要求 + 标记语法约定）
//! 2. 调用生成服务
//! 3. 校验注释以外的内容逐字保留
//! 4. 失败则重试，重试耗尽后整体报错

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::markup::{normalize_ws, strip_markup};
use crate::models::Chunk;
use crate::services::{prompts, TextGenerator};
use crate::workflow::annotate_ctx::AnnotateCtx;

/// 分段注释流程
///
/// - 编排单个分段的生成与校验
/// - 不持有任何资源，只依赖生成能力（TextGenerator）
/// - 同样的分段内容 + 语种总是产生同一个单元标识，
///   重试失败的单元不会波及已成功的单元
pub struct ChunkFlow {
    generator: Arc<dyn TextGenerator>,
    max_attempts: usize,
}

impl ChunkFlow {
    /// 创建新的分段流程
    pub fn new(generator: Arc<dyn TextGenerator>, max_attempts: usize) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 注释一个分段，返回带标记的文本
    pub async fn annotate_chunk(
        &self,
        chunk: &Chunk,
        ctx: &AnnotateCtx,
        only_comments: bool,
    ) -> Result<String> {
        let unit_key = chunk.unit_key(ctx.language.code());
        let (user_message, system_message) =
            prompts::build_chunk_messages(&chunk.text, ctx.language, only_comments);

        for attempt in 1..=self.max_attempts {
            match self
                .generator
                .generate(&user_message, Some(&system_message))
                .await
            {
                Ok(annotated) => {
                    if verify_content_preserved(&chunk.text, &annotated) {
                        info!(
                            "[文章 {}] ✓ 分段 {}/{} 注释完成 (尝试 {})",
                            ctx.text_id,
                            ctx.chunk_index + 1,
                            ctx.total_chunks,
                            attempt
                        );
                        return Ok(annotated);
                    }
                    warn!(
                        "[文章 {}] ⚠️ 单元 {} 内容保全校验失败 (尝试 {}/{})",
                        ctx.text_id, unit_key, attempt, self.max_attempts
                    );
                }
                Err(e) => {
                    warn!(
                        "[文章 {}] ⚠️ 单元 {} 生成调用失败 (尝试 {}/{}): {}",
                        ctx.text_id, unit_key, attempt, self.max_attempts, e
                    );
                }
            }

            if attempt < self.max_attempts {
                sleep(Duration::from_millis(500 * attempt as u64)).await;
            }
        }

        anyhow::bail!(
            "单元 {} 在 {} 次尝试后仍失败",
            unit_key,
            self.max_attempts
        )
    }
}

/// 校验生成结果：去掉标记后必须与原文一致（空白归一化）
///
/// 生成服务的契约是"只包裹指定的词，其余内容逐字保留"；
/// 原文里已有的注释在两侧都会退化为表层词形，所以重注释也能比对
fn verify_content_preserved(original: &str, annotated: &str) -> bool {
    normalize_ws(&strip_markup(annotated)) == normalize_ws(&strip_markup(original))
}
