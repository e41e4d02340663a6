//! 配额台账 - 业务能力层
//!
//! 准入门：任何付费外部调用之前必须先扣到配额。
//! 台账本体是外部协作方，这里只定义契约和内存实现

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// 配额扣减能力
#[async_trait]
pub trait QuotaLedger: Send + Sync {
    /// 尝试一次性扣减 `cost` 点配额
    ///
    /// 余额不足时返回 false 且不产生任何扣减；
    /// 返回 true 后配额即已消费，后续失败不退还
    async fn try_debit(&self, user_id: &str, cost: u32) -> Result<bool>;
}

/// 内存配额台账
///
/// 首次见到的用户按默认额度初始化
pub struct MemoryQuotaLedger {
    balances: Mutex<HashMap<String, u32>>,
    default_quota: u32,
}

impl MemoryQuotaLedger {
    pub fn new(default_quota: u32) -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            default_quota,
        }
    }

    /// 直接设置余额（测试和批处理模式用）
    pub async fn set_balance(&self, user_id: &str, balance: u32) {
        let mut balances = self.balances.lock().await;
        balances.insert(user_id.to_string(), balance);
    }

    pub async fn balance(&self, user_id: &str) -> u32 {
        let balances = self.balances.lock().await;
        balances.get(user_id).copied().unwrap_or(self.default_quota)
    }
}

#[async_trait]
impl QuotaLedger for MemoryQuotaLedger {
    async fn try_debit(&self, user_id: &str, cost: u32) -> Result<bool> {
        let mut balances = self.balances.lock().await;
        let balance = balances
            .entry(user_id.to_string())
            .or_insert(self.default_quota);

        if *balance < cost {
            debug!("配额不足: 用户 {} 余额 {} < 需要 {}", user_id, balance, cost);
            return Ok(false);
        }

        *balance -= cost;
        debug!("配额扣减: 用户 {} -{} → 余额 {}", user_id, cost, balance);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_debit_until_exhausted() {
        let ledger = MemoryQuotaLedger::new(10);
        assert!(ledger.try_debit("u-1", 6).await.unwrap());
        assert!(!ledger.try_debit("u-1", 6).await.unwrap());
        assert_eq!(ledger.balance("u-1").await, 4);
    }

    #[tokio::test]
    async fn test_failed_debit_leaves_balance_untouched() {
        let ledger = MemoryQuotaLedger::new(5);
        assert!(!ledger.try_debit("u-1", 6).await.unwrap());
        assert_eq!(ledger.balance("u-1").await, 5);
    }

    #[tokio::test]
    async fn test_set_balance() {
        let ledger = MemoryQuotaLedger::new(5);
        ledger.set_balance("u-1", 0).await;
        assert!(!ledger.try_debit("u-1", 1).await.unwrap());
    }
}
