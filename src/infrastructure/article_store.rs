//! 文章持久化存储 - 基础设施层

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::models::Article;

/// 文章存储能力
///
/// 注释产出的内容、话题、表情必须在一次更新里落库：
/// 合并/持久化步骤不允许部分生效
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// 读取文章
    async fn get(&self, id: &str) -> Result<Option<Article>>;

    /// 写入文章（插入或整体覆盖）
    async fn put(&self, article: Article) -> Result<()>;

    /// 一次更新写入注释产出的三个字段，文章不存在时报错
    async fn save_annotated(
        &self,
        id: &str,
        content: &str,
        topics: &[String],
        emoji: &str,
    ) -> Result<()>;
}

/// 内存文章存储
pub struct MemoryArticleStore {
    articles: Mutex<HashMap<String, Article>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self {
            articles: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn get(&self, id: &str) -> Result<Option<Article>> {
        let articles = self.articles.lock().await;
        Ok(articles.get(id).cloned())
    }

    async fn put(&self, article: Article) -> Result<()> {
        let mut articles = self.articles.lock().await;
        articles.insert(article.id.clone(), article);
        Ok(())
    }

    async fn save_annotated(
        &self,
        id: &str,
        content: &str,
        topics: &[String],
        emoji: &str,
    ) -> Result<()> {
        let mut articles = self.articles.lock().await;
        let article = articles
            .get_mut(id)
            .with_context(|| format!("文章不存在: {}", id))?;

        article.content = content.to_string();
        article.topics = topics.to_vec();
        article.emoji = emoji.to_string();
        Ok(())
    }
}
