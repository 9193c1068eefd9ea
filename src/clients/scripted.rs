//! 确定性的脚本化 LLM 客户端
//!
//! 由一个处理函数决定每次调用的返回（固定回复或注入的失败），
//! 并记录所有调用，供测试断言调用次数、顺序与层级。
//!
//! ```rust
//! use manuscript_drafter::clients::{ScriptedProvider, ModelTier};
//! use manuscript_drafter::AppError;
//!
//! let provider = ScriptedProvider::new(|request| match request.tier {
//!     ModelTier::Preferred => Err(AppError::provider_call_failed("pro", "429 quota")),
//!     ModelTier::Fast => Ok("fast answer".to_string()),
//! });
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::provider::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::error::AppResult;

type Handler = dyn Fn(&CompletionRequest) -> AppResult<String> + Send + Sync;

/// 脚本化客户端
#[derive(Clone)]
pub struct ScriptedProvider {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    latency: Duration,
}

impl ScriptedProvider {
    /// 用处理函数创建
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CompletionRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            calls: Arc::new(Mutex::new(Vec::new())),
            latency: Duration::ZERO,
        }
    }

    /// 每次都返回同一段文本
    pub fn always(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// 模拟调用耗时（配合暂停的 tokio 时钟使用）
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// 所有已记录的调用
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.log().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    fn log(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> AppResult<CompletionResponse> {
        self.log().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let text = (self.handler)(&request)?;
        Ok(CompletionResponse { text })
    }
}
