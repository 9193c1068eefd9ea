//! 新颖性 / 研究空白分析 - 流程层
//!
//! 流程顺序：
//! 1. 校验至少有一个文档（在任何调用之前）
//! 2. 文档压缩（直接附带或逐篇摘要）
//! 3. 首选层级 → 快速层级，按固定 Schema 输出 JSON
//! 4. 解析失败或空响应视为任务失败，不填默认值

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, info};

use crate::clients::{CompletionProvider, CompletionRequest};
use crate::config::Config;
use crate::error::{AppError, AppResult, InputError};
use crate::models::{analysis_schema, AnalysisResult, ContentPart, SourceDocument};
use crate::services::condensation::{condense, CondensationPolicy};
use crate::services::prompts;
use crate::services::retry::RetryPolicy;
use crate::services::tier_router::{run_tiered, Routed, TierPlan};

const TASK: &str = "analysis";

/// 分析任务
pub struct AnalysisTask {
    provider: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
    condensation: CondensationPolicy,
}

impl AnalysisTask {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self {
            provider,
            retry: config.retry_policy(),
            condensation: config.condensation(),
        }
    }

    pub async fn run(&self, documents: &[Arc<SourceDocument>]) -> AppResult<Routed<AnalysisResult>> {
        if documents.is_empty() {
            return Err(InputError::NoDocuments.into());
        }

        info!("🔬 开始分析 {} 个文档", documents.len());

        let mut parts = condense(self.provider.as_ref(), self.condensation, documents)
            .await?
            .into_parts();
        parts.push(ContentPart::text(prompts::ANALYSIS_INSTRUCTION));

        let request = CompletionRequest::text(parts)
            .with_system(prompts::ANALYSIS_SYSTEM)
            .with_json_schema(analysis_schema());

        let routed = run_tiered(TASK, TierPlan::QUALITY_FIRST, self.retry, |tier| {
            let request = request.on_tier(tier);
            let provider = Arc::clone(&self.provider);
            async move {
                let response = provider.complete(request).await?;
                parse_analysis(&response.text)
            }
        })
        .await?;

        info!("✓ 分析完成: {}", routed.value.title);
        Ok(routed)
    }
}

/// 解析结构化分析结果
pub fn parse_analysis(raw: &str) -> AppResult<AnalysisResult> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(AppError::empty_response(TASK));
    }
    debug!("分析响应 {} 字节", body.len());
    serde_json::from_str(body).map_err(|e| AppError::malformed_response(TASK, e))
}

const FENCE_PATTERN: &str = r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$";

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    // 常量模式，编译失败只可能是代码错误（有单元测试覆盖）
    FENCE.get_or_init(|| Regex::new(FENCE_PATTERN).expect("FENCE_PATTERN is a valid regex"))
}

/// 去掉模型有时包在 JSON 外面的 ``` 代码块
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match fence_regex().captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    }
}
