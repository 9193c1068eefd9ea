//! 文档压缩策略 - 业务能力层
//!
//! 文档数量不超过阈值时直接附带全部文档；超过阈值时逐篇摘要（map），
//! 再把摘要合并为一个文本片段（reduce）替代原始文档。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::clients::{CompletionProvider, CompletionRequest, ModelTier};
use crate::error::{AppError, AppResult};
use crate::models::{ContentPart, SourceDocument};
use crate::services::attachment;
use crate::services::prompts;

/// 压缩策略参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CondensationPolicy {
    /// 文档数超过该值时切换到摘要模式
    pub threshold: usize,
    /// 相邻两次摘要调用之间的停顿
    pub pause: Duration,
}

impl Default for CondensationPolicy {
    fn default() -> Self {
        Self {
            threshold: 2,
            pause: Duration::from_millis(500),
        }
    }
}

impl CondensationPolicy {
    pub fn should_summarize(&self, document_count: usize) -> bool {
        document_count > self.threshold
    }
}

/// 压缩后的输入
#[derive(Debug, Clone, PartialEq)]
pub enum CondensedInput {
    /// 直接附带的文档片段
    Direct(Vec<ContentPart>),
    /// 合并后的摘要文本
    Summarized { combined: String, documents: usize },
}

impl CondensedInput {
    pub fn into_parts(self) -> Vec<ContentPart> {
        match self {
            CondensedInput::Direct(parts) => parts,
            CondensedInput::Summarized { combined, .. } => vec![ContentPart::Text(combined)],
        }
    }
}

const TASK: &str = "document condensation";

/// 按策略压缩文档集合
///
/// 摘要模式下一篇摘要都没有得到时返回错误，不让后续分析在空输入上进行。
pub async fn condense(
    provider: &dyn CompletionProvider,
    policy: CondensationPolicy,
    documents: &[Arc<SourceDocument>],
) -> AppResult<CondensedInput> {
    if !policy.should_summarize(documents.len()) {
        let parts = attachment::prepare_all(documents.iter().map(Arc::as_ref));
        debug!("直接附带 {} 个文档片段", parts.len());
        return Ok(CondensedInput::Direct(parts));
    }

    info!(
        "📚 文档数 {} 超过阈值 {}，逐篇摘要",
        documents.len(),
        policy.threshold
    );

    let mut entries = Vec::with_capacity(documents.len());
    for (i, document) in documents.iter().enumerate() {
        if i > 0 && !policy.pause.is_zero() {
            sleep(policy.pause).await;
        }
        let summary = summarize_document(provider, document).await;
        if summary.trim().is_empty() {
            warn!("⚠️ 文档 {} 没有得到摘要，跳过", document.name);
            continue;
        }
        entries.push(prompts::summary_entry(&document.name, &summary));
    }

    if entries.is_empty() {
        return Err(AppError::task_failed(TASK, AppError::empty_response(TASK)));
    }

    let combined = format!(
        "{}\n\n{}",
        prompts::COMBINED_SUMMARIES_HEADER,
        entries.join("\n\n")
    );
    Ok(CondensedInput::Summarized {
        combined,
        documents: entries.len(),
    })
}

/// 单篇摘要：只用快速层级，不重试，失败返回空串
pub async fn summarize_document(
    provider: &dyn CompletionProvider,
    document: &SourceDocument,
) -> String {
    let Some(part) = attachment::prepare(document) else {
        return String::new();
    };

    let request = CompletionRequest::text(vec![
        part,
        ContentPart::text(prompts::summary_instruction(&document.name)),
    ])
    .with_system(prompts::SUMMARY_SYSTEM)
    .on_tier(ModelTier::Fast);

    match provider.complete(request).await {
        Ok(response) => response.text,
        Err(e) => {
            warn!("⚠️ 文档 {} 摘要失败: {}", document.name, e);
            String::new()
        }
    }
}
