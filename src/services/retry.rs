//! 重试控制 - 业务能力层
//!
//! 包装任意一次异步调用：瞬时错误（限流 / 配额 / 过载）按指数退避重试，
//! 其他错误或重试耗尽时原样返回。不关心被包装的操作是什么。

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::AppResult;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    /// 默认 3 次重试，起始 2 秒：最坏等待 2s、4s、8s
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
        }
    }
}

/// 执行 `operation`，瞬时失败时等待后重试，每次等待翻倍
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut retries_left = policy.max_retries;
    let mut delay = policy.initial_delay;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retries_left > 0 => {
                warn!(
                    "⏳ 瞬时错误，{:?} 后重试 (剩余 {} 次): {}",
                    delay, retries_left, e
                );
                sleep(delay).await;
                retries_left -= 1;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
