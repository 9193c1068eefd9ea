//! 模型层级选择与降级 - 业务能力层
//!
//! 每个任务声明首选层级和可接受的备用层级：
//! 1. 首选层级 + 重试
//! 2. 仍失败 → 记录警告，备用层级 + 重试
//! 3. 备用也失败 → 返回点名操作的最终错误

use std::future::Future;

use tracing::{info, warn};

use crate::clients::ModelTier;
use crate::error::{AppError, AppResult};
use crate::services::retry::{with_backoff, RetryPolicy};

/// 任务的层级计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPlan {
    pub primary: ModelTier,
    pub fallback: Option<ModelTier>,
}

impl TierPlan {
    /// 首选高质量，降级到快速
    pub const QUALITY_FIRST: TierPlan = TierPlan {
        primary: ModelTier::Preferred,
        fallback: Some(ModelTier::Fast),
    };

    /// 只用快速层级
    pub const FAST_ONLY: TierPlan = TierPlan {
        primary: ModelTier::Fast,
        fallback: None,
    };
}

/// 执行结果
#[derive(Debug, Clone, PartialEq)]
pub struct Routed<T> {
    pub value: T,
    /// 实际产出结果的层级
    pub tier: ModelTier,
    /// 降级过程中记录的警告
    pub warnings: Vec<String>,
}

impl<T> Routed<T> {
    pub fn fell_back(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// 按层级计划执行任务
///
/// `task` 会被以不同层级多次调用，因此必须能重复构造请求。
pub async fn run_tiered<T, F, Fut>(
    operation: &str,
    plan: TierPlan,
    policy: RetryPolicy,
    mut task: F,
) -> AppResult<Routed<T>>
where
    F: FnMut(ModelTier) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let primary_error = match with_backoff(policy, || task(plan.primary)).await {
        Ok(value) => {
            return Ok(Routed {
                value,
                tier: plan.primary,
                warnings: Vec::new(),
            })
        }
        Err(e) => e,
    };

    let Some(fallback) = plan.fallback else {
        return Err(AppError::task_failed(operation, primary_error));
    };

    let warning = format!(
        "{} failed on {} tier, falling back to {} tier: {}",
        operation, plan.primary, fallback, primary_error
    );
    warn!("⚠️ {}", warning);

    match with_backoff(policy, || task(fallback)).await {
        Ok(value) => {
            info!("✓ {} 在 {} 层级完成", operation, fallback);
            Ok(Routed {
                value,
                tier: fallback,
                warnings: vec![warning],
            })
        }
        Err(e) => Err(AppError::task_failed(operation, e)),
    }
}
