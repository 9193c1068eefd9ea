//! 章节撰写 - 流程层
//!
//! 输入：目标章节、当前分析结果、其他章节的摘录、作者备注和前几个源文档。
//! 输出：该章节的正文文本；空文本视为失败。

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::{CompletionProvider, CompletionRequest};
use crate::config::Config;
use crate::error::{AppError, AppResult, InputError};
use crate::models::{ContentPart, SectionKind, SessionState};
use crate::services::attachment;
use crate::services::prompts;
use crate::services::retry::RetryPolicy;
use crate::services::tier_router::{run_tiered, Routed, TierPlan};
use crate::utils::logging::truncate_text;

/// 撰写任务
pub struct DraftingTask {
    provider: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
    document_limit: usize,
    excerpt_chars: usize,
}

impl DraftingTask {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self {
            provider,
            retry: config.retry_policy(),
            document_limit: config.drafting_document_limit,
            excerpt_chars: config.section_excerpt_chars,
        }
    }

    /// 在给定的会话快照上撰写一个章节
    pub async fn run(&self, kind: SectionKind, state: &SessionState) -> AppResult<Routed<String>> {
        let request = self.build_request(kind, state)?;
        let operation = format!("drafting {}", kind.id());

        info!("✍️ 撰写章节: {}", kind);

        run_tiered(&operation, TierPlan::QUALITY_FIRST, self.retry, |tier| {
            let request = request.on_tier(tier);
            let provider = Arc::clone(&self.provider);
            let operation = operation.as_str();
            async move {
                let response = provider.complete(request).await?;
                let text = response.text.trim();
                if text.is_empty() {
                    return Err(AppError::empty_response(operation));
                }
                Ok(text.to_string())
            }
        })
        .await
    }

    /// 构建请求；没有分析结果时拒绝
    pub fn build_request(&self, kind: SectionKind, state: &SessionState) -> AppResult<CompletionRequest> {
        let analysis = state.analysis.as_ref().ok_or(InputError::AnalysisMissing)?;

        if kind == SectionKind::References && !analysis.references.is_empty() {
            return Ok(CompletionRequest::text(vec![ContentPart::text(
                prompts::references_prompt(&analysis.references),
            )])
            .with_system(prompts::DRAFTING_SYSTEM));
        }

        let mut parts = attachment::prepare_all(
            state
                .documents
                .iter()
                .take(self.document_limit)
                .map(Arc::as_ref),
        );
        let excerpts = self.other_section_excerpts(kind, state);
        let notes = &state.section(kind).notes;
        parts.push(ContentPart::text(prompts::drafting_prompt(
            kind, analysis, &excerpts, notes,
        )));

        debug!(
            "章节 {} 请求: {} 个片段, {} 段上下文",
            kind.id(),
            parts.len(),
            excerpts.len()
        );

        Ok(CompletionRequest::text(parts).with_system(prompts::DRAFTING_SYSTEM))
    }

    fn other_section_excerpts(&self, kind: SectionKind, state: &SessionState) -> Vec<(SectionKind, String)> {
        state
            .sections
            .iter()
            .filter(|section| section.kind != kind && !section.content.trim().is_empty())
            .map(|section| {
                (
                    section.kind,
                    truncate_text(&section.content, self.excerpt_chars),
                )
            })
            .collect()
    }
}
