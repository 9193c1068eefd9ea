//! 稿件会话 - 编排层
//!
//! ## 职责
//!
//! 持有会话状态和各个流程任务，对外提供会话级操作：
//! 上传文档、分析、撰写章节、手动编辑、改写、顾问对话、导出。
//!
//! ## 并发约定
//!
//! - 每个操作开始时提交"开始"转换（拿到请求序号），调用结束后提交"完成"转换
//! - 完成转换在写锁内读取最新状态，只修改自己负责的字段
//! - 序号不是最新的响应被丢弃，记一条警告

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::clients::{CompletionProvider, OpenAiProvider};
use crate::config::Config;
use crate::error::{AppResult, InputError};
use crate::models::{
    load_documents_from_folder, AnalysisResult, ChatTurn, SectionKind, SessionState,
    SourceDocument,
};
use crate::orchestrator::session_store::SessionStore;
use crate::services::tier_router::Routed;
use crate::workflow::{
    AdvisorReply, AdvisorTask, AnalysisTask, DraftingTask, TransformKind, TransformOutcome,
    TransformTask,
};

/// 章节撰写结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    /// 新内容已写入
    Drafted,
    /// 撰写失败，原内容保留，错误记录在 `last_error`
    Failed(String),
    /// 期间有更新的请求或手动编辑，本次结果被丢弃
    Superseded,
}

/// 分析结果
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(Routed<AnalysisResult>),
    /// 期间有更新的分析请求，本次结果被丢弃
    Superseded,
}

/// 稿件会话
pub struct ManuscriptApp {
    config: Config,
    store: SessionStore,
    analysis: AnalysisTask,
    drafting: DraftingTask,
    transform: TransformTask,
    advisor: AdvisorTask,
}

impl ManuscriptApp {
    pub fn new(config: Config, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            analysis: AnalysisTask::new(Arc::clone(&provider), &config),
            drafting: DraftingTask::new(Arc::clone(&provider), &config),
            transform: TransformTask::new(Arc::clone(&provider), &config),
            advisor: AdvisorTask::new(provider, &config),
            store: SessionStore::new(),
            config,
        }
    }

    /// 使用 OpenAI 兼容接口的会话
    pub fn with_openai(config: Config) -> Self {
        let provider = Arc::new(OpenAiProvider::new(&config));
        Self::new(config, provider)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn snapshot(&self) -> SessionState {
        self.store.snapshot().await
    }

    // ========== 文档 ==========

    /// 上传一个文档；不支持的格式直接拒绝
    pub async fn add_document(
        &self,
        name: &str,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> AppResult<()> {
        let document = SourceDocument::ingest(name, declared_mime, bytes)?;
        info!("📄 添加文档: {} ({:?})", document.name, document.kind);
        self.store
            .commit(|s| s.add_document(Arc::new(document)))
            .await;
        Ok(())
    }

    /// 读取文件夹中所有支持的文档，返回新增数量
    pub async fn load_documents_from_folder(&self, folder: &str) -> AppResult<usize> {
        let documents = load_documents_from_folder(folder).await?;
        let count = documents.len();
        for document in documents {
            self.store
                .commit(|s| s.add_document(Arc::new(document)))
                .await;
        }
        Ok(count)
    }

    // ========== 分析 ==========

    pub async fn run_analysis(&self) -> AppResult<AnalysisOutcome> {
        let documents = self.store.snapshot().await.documents;
        if documents.is_empty() {
            return Err(InputError::NoDocuments.into());
        }

        let request = self.store.commit(|s| s.begin_analysis()).await;

        match self.analysis.run(&documents).await {
            Ok(routed) => {
                let result = routed.value.clone();
                let applied = self
                    .store
                    .commit(|s| s.finish_analysis(request, result))
                    .await;
                if applied {
                    Ok(AnalysisOutcome::Completed(routed))
                } else {
                    warn!("⚠️ 分析请求 #{} 已过期，结果丢弃", request);
                    Ok(AnalysisOutcome::Superseded)
                }
            }
            Err(e) => {
                error!("❌ {}", e);
                self.store.commit(|s| s.fail_analysis(request)).await;
                Err(e)
            }
        }
    }

    // ========== 章节 ==========

    /// 撰写一个章节；没有分析结果时在任何调用之前拒绝
    pub async fn draft_section(&self, kind: SectionKind) -> AppResult<DraftOutcome> {
        if self.store.snapshot().await.analysis.is_none() {
            return Err(InputError::AnalysisMissing.into());
        }

        let request = self.store.commit(|s| s.begin_drafting(kind)).await;
        let snapshot = self.store.snapshot().await;

        match self.drafting.run(kind, &snapshot).await {
            Ok(routed) => {
                let applied = self
                    .store
                    .commit(|s| s.finish_drafting(kind, request, routed.value))
                    .await;
                if applied {
                    info!("✓ 章节 {} 撰写完成", kind);
                    Ok(DraftOutcome::Drafted)
                } else {
                    warn!("⚠️ 章节 {} 的请求 #{} 已被取代，结果丢弃", kind, request);
                    Ok(DraftOutcome::Superseded)
                }
            }
            Err(e) => {
                let message = e.to_string();
                error!("❌ 章节 {} 撰写失败: {}", kind, message);
                let applied = self
                    .store
                    .commit(|s| s.fail_drafting(kind, request, message.clone()))
                    .await;
                if applied {
                    Ok(DraftOutcome::Failed(message))
                } else {
                    Ok(DraftOutcome::Superseded)
                }
            }
        }
    }

    /// 并发撰写除参考文献外的所有章节，最后整理参考文献
    pub async fn draft_all_sections(&self) -> AppResult<Vec<(SectionKind, DraftOutcome)>> {
        if self.store.snapshot().await.analysis.is_none() {
            return Err(InputError::AnalysisMissing.into());
        }

        let kinds: Vec<SectionKind> = SectionKind::ALL
            .into_iter()
            .filter(|kind| *kind != SectionKind::References)
            .collect();

        let results = join_all(kinds.iter().map(|kind| self.draft_section(*kind))).await;
        let mut outcomes: Vec<(SectionKind, DraftOutcome)> = kinds
            .into_iter()
            .zip(results)
            .map(|(kind, result)| (kind, settle(result)))
            .collect();

        let references = self.draft_section(SectionKind::References).await;
        outcomes.push((SectionKind::References, settle(references)));
        Ok(outcomes)
    }

    /// 手动编辑；正在生成的请求被取代
    pub async fn edit_section(&self, kind: SectionKind, content: impl Into<String>) {
        let content = content.into();
        self.store.commit(|s| s.edit_section(kind, content)).await;
    }

    pub async fn set_section_notes(&self, kind: SectionKind, notes: impl Into<String>) {
        let notes = notes.into();
        self.store.commit(|s| s.set_notes(kind, notes)).await;
    }

    // ========== 工具 ==========

    pub async fn transform(&self, text: &str, kind: TransformKind) -> TransformOutcome {
        self.transform.run(text, kind).await
    }

    /// 顾问对话；没有分析结果时在任何调用之前拒绝
    ///
    /// 问题和回复在拿到回复后一起追加，并发提问时对话记录按"问、答"成对排列。
    /// 每次提问看到的历史是发起时的快照，不包含同时进行中的其他提问。
    pub async fn ask_advisor(&self, query: &str) -> AppResult<AdvisorReply> {
        let snapshot = self.store.snapshot().await;
        let Some(analysis) = snapshot.analysis.as_ref() else {
            return Err(InputError::AnalysisMissing.into());
        };

        let question = ChatTurn::user(query);
        let reply = self.advisor.run(query, &snapshot.chat, analysis).await;

        let answer = ChatTurn::assistant(reply.text.clone());
        self.store
            .commit(|s| s.append_exchange(question, answer))
            .await;
        Ok(reply)
    }

    // ========== 导出 ==========

    /// 渲染为 Markdown：标题 + 每个非空章节
    pub async fn export_markdown(&self) -> String {
        render_markdown(&self.store.snapshot().await)
    }
}

fn settle(result: AppResult<DraftOutcome>) -> DraftOutcome {
    result.unwrap_or_else(|e| DraftOutcome::Failed(e.to_string()))
}

/// 标题取 Title 章节内容，其次是分析给出的标题
pub fn render_markdown(state: &SessionState) -> String {
    let title_section = state.section(SectionKind::Title).content.trim();
    let title = if !title_section.is_empty() {
        title_section
    } else {
        state
            .analysis
            .as_ref()
            .map(|a| a.title.as_str())
            .unwrap_or("Untitled Manuscript")
    };

    let mut out = format!("# {}\n", title);
    for section in &state.sections {
        if section.kind == SectionKind::Title || section.content.trim().is_empty() {
            continue;
        }
        out.push_str(&format!(
            "\n## {}\n\n{}\n",
            section.kind.heading(),
            section.content.trim()
        ));
    }
    out
}
