//! 带 TTL 的临时键值存储 - 基础设施层
//!
//! 进度状态的载体。按键传入、显式持有，绝不做进程级单例，
//! 这样不同文章的并发注释任务互不干扰

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// 临时键值存储能力
///
/// 外部协作方（如 Redis）实现同样的契约；测试和批处理模式用内存实现
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// 写入键值，`ttl` 后过期
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// 读取键值，不存在或已过期返回 None
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// 内存 TTL 存储
pub struct MemoryTtlStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTtlStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                // 惰性清理过期键
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
