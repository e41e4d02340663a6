use crate::models::article::AnnotationRequest;
use crate::models::Language;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 批处理输入文件中的一篇文章
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleJob {
    /// 文章标识
    pub id: String,
    /// 文章标题（仅用于日志显示）
    #[serde(default)]
    pub title: String,
    /// 语种（支持中文名、代码或模糊匹配）
    pub language: String,
    /// 原始文章文本
    pub text: String,
    /// 发起用户
    #[serde(default = "default_user")]
    pub user_id: String,
    /// 只生成注释，不加重点标记
    #[serde(default)]
    pub only_comments: bool,
    /// 用户是否有有效订阅
    #[serde(default)]
    pub has_subscription: bool,
    /// 来源文件路径（加载后填入）
    #[serde(skip)]
    pub file_path: Option<String>,
}

fn default_user() -> String {
    "batch".to_string()
}

impl ArticleJob {
    /// 转换为注释请求，语种解析失败时报错
    pub fn to_request(&self) -> Result<AnnotationRequest> {
        let language = Language::find(&self.language)
            .with_context(|| format!("无法解析语种: {}", self.language))?;

        Ok(AnnotationRequest {
            article_text: self.text.clone(),
            text_id: self.id.clone(),
            language,
            only_comments: self.only_comments,
            user_id: self.user_id.clone(),
            has_subscription: self.has_subscription,
        })
    }
}

/// 从 TOML 文件加载数据并转换为 ArticleJob 对象
pub async fn load_toml_to_article_job(toml_file_path: &Path) -> Result<ArticleJob> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut job: ArticleJob = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 设置文件路径
    job.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(job)
}

/// 从文件夹中加载所有 TOML 文件并转换为 ArticleJob 对象列表
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<ArticleJob>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut jobs = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_toml_to_article_job(&path).await {
                Ok(job) => {
                    tracing::info!(
                        "成功加载文章 {} ({} 字符)",
                        job.id,
                        job.text.chars().count()
                    );
                    jobs.push(job);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(jobs)
}
