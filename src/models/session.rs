//! 会话状态及其纯函数式状态转换
//!
//! 每个转换读取提交时刻的最新状态，返回新状态（或丢弃），
//! 由 `orchestrator::SessionStore` 串行提交。

use std::sync::Arc;

use super::analysis::AnalysisResult;
use super::chat::ChatTurn;
use super::document::SourceDocument;
use super::section::{ManuscriptSection, SectionKind, SectionStatus};

/// 一次状态转换的结果
#[derive(Debug)]
pub enum Commit<R> {
    /// 用新状态替换旧状态
    Apply(SessionState, R),
    /// 状态不变（例如过期的响应）
    Discard(R),
}

/// 会话聚合状态
#[derive(Debug, Clone)]
pub struct SessionState {
    /// 源文档按引用共享，不复制字节
    pub documents: Vec<Arc<SourceDocument>>,
    pub analysis: Option<AnalysisResult>,
    /// 按 `SectionKind::ALL` 顺序排列，每种类型一个
    pub sections: Vec<ManuscriptSection>,
    pub chat: Vec<ChatTurn>,
    /// 已发出的最大分析请求序号
    pub(crate) analysis_issued: u64,
    /// 已结束（成功或失败）的最新分析请求序号
    pub(crate) analysis_settled: u64,
    /// 已提交的状态版本
    pub revision: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// 创建新会话，所有章节立即创建
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            analysis: None,
            sections: SectionKind::ALL
                .into_iter()
                .map(ManuscriptSection::new)
                .collect(),
            chat: Vec::new(),
            analysis_issued: 0,
            analysis_settled: 0,
            revision: 0,
        }
    }

    pub fn section(&self, kind: SectionKind) -> &ManuscriptSection {
        &self.sections[kind.index()]
    }

    pub fn is_analysis_pending(&self) -> bool {
        self.analysis_issued > self.analysis_settled
    }

    // ========== 状态转换 ==========

    pub fn add_document(&self, document: Arc<SourceDocument>) -> Commit<()> {
        let mut next = self.clone();
        next.documents.push(document);
        Commit::Apply(next, ())
    }

    /// 发出新的分析请求，返回请求序号
    pub fn begin_analysis(&self) -> Commit<u64> {
        let mut next = self.clone();
        next.analysis_issued += 1;
        let request = next.analysis_issued;
        Commit::Apply(next, request)
    }

    /// 只有最新的分析请求可以写入结果
    pub fn finish_analysis(&self, request: u64, result: AnalysisResult) -> Commit<bool> {
        if request != self.analysis_issued {
            return Commit::Discard(false);
        }
        let mut next = self.clone();
        next.analysis = Some(result);
        next.analysis_settled = request;
        Commit::Apply(next, true)
    }

    /// 分析失败：保留上一次的结果
    pub fn fail_analysis(&self, request: u64) -> Commit<bool> {
        if request != self.analysis_issued {
            return Commit::Discard(false);
        }
        let mut next = self.clone();
        next.analysis_settled = request;
        Commit::Apply(next, true)
    }

    /// 发出新的撰写请求，取代同一章节上仍在进行的请求
    pub fn begin_drafting(&self, kind: SectionKind) -> Commit<u64> {
        let mut next = self.clone();
        let section = &mut next.sections[kind.index()];
        section.issued += 1;
        section.status = SectionStatus::Generating {
            request: section.issued,
        };
        section.last_error = None;
        let request = section.issued;
        Commit::Apply(next, request)
    }

    /// 写入撰写结果；请求已被取代时丢弃
    pub fn finish_drafting(&self, kind: SectionKind, request: u64, content: String) -> Commit<bool> {
        if !self.is_current_request(kind, request) {
            return Commit::Discard(false);
        }
        let mut next = self.clone();
        let section = &mut next.sections[kind.index()];
        section.content = content;
        section.status = SectionStatus::Drafted;
        Commit::Apply(next, true)
    }

    /// 撰写失败：保留原内容，记录错误
    pub fn fail_drafting(&self, kind: SectionKind, request: u64, message: String) -> Commit<bool> {
        if !self.is_current_request(kind, request) {
            return Commit::Discard(false);
        }
        let mut next = self.clone();
        let section = &mut next.sections[kind.index()];
        section.status = section.settled_status();
        section.last_error = Some(message);
        Commit::Apply(next, true)
    }

    /// 手动编辑；若该章节正在生成，则该生成请求被取代
    pub fn edit_section(&self, kind: SectionKind, content: String) -> Commit<()> {
        let mut next = self.clone();
        let section = &mut next.sections[kind.index()];
        section.content = content;
        section.status = section.settled_status();
        section.last_error = None;
        Commit::Apply(next, ())
    }

    pub fn set_notes(&self, kind: SectionKind, notes: String) -> Commit<()> {
        let mut next = self.clone();
        next.sections[kind.index()].notes = notes;
        Commit::Apply(next, ())
    }

    /// 一问一答在同一次提交中追加，并发提问时各自的两轮保持相邻
    pub fn append_exchange(&self, question: ChatTurn, reply: ChatTurn) -> Commit<()> {
        let mut next = self.clone();
        next.chat.push(question);
        next.chat.push(reply);
        Commit::Apply(next, ())
    }

    fn is_current_request(&self, kind: SectionKind, request: u64) -> bool {
        self.section(kind).status == SectionStatus::Generating { request }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_analysis(title: &str) -> AnalysisResult {
        AnalysisResult {
            title: title.to_string(),
            target_venue: "J".to_string(),
            gap: String::new(),
            novelty: String::new(),
            methodology_plan: String::new(),
            expected_results: String::new(),
            checklist: Default::default(),
            references: Vec::new(),
        }
    }

    fn apply<R>(commit: Commit<R>) -> (SessionState, R) {
        match commit {
            Commit::Apply(state, r) => (state, r),
            Commit::Discard(_) => panic!("expected Apply"),
        }
    }

    #[test]
    fn test_sections_created_eagerly_in_order() {
        let state = SessionState::new();
        assert_eq!(state.sections.len(), SectionKind::ALL.len());
        for (section, kind) in state.sections.iter().zip(SectionKind::ALL) {
            assert_eq!(section.kind, kind);
            assert_eq!(section.id, kind.id());
        }
    }

    #[test]
    fn test_drafting_round_trip() {
        let state = SessionState::new();
        let (state, request) = apply(state.begin_drafting(SectionKind::Introduction));
        assert!(state.section(SectionKind::Introduction).is_generating());

        let (state, applied) = apply(state.finish_drafting(
            SectionKind::Introduction,
            request,
            "Intro text".to_string(),
        ));
        assert!(applied);
        let section = state.section(SectionKind::Introduction);
        assert_eq!(section.status, SectionStatus::Drafted);
        assert_eq!(section.content, "Intro text");
    }

    #[test]
    fn test_superseded_request_is_discarded() {
        let state = SessionState::new();
        let (state, first) = apply(state.begin_drafting(SectionKind::Results));
        let (state, second) = apply(state.begin_drafting(SectionKind::Results));
        assert!(second > first);

        match state.finish_drafting(SectionKind::Results, first, "stale".to_string()) {
            Commit::Discard(applied) => assert!(!applied),
            Commit::Apply(..) => panic!("stale response must not commit"),
        }

        let (state, _) = apply(state.finish_drafting(SectionKind::Results, second, "fresh".to_string()));
        assert_eq!(state.section(SectionKind::Results).content, "fresh");
    }

    #[test]
    fn test_manual_edit_supersedes_generation() {
        let state = SessionState::new();
        let (state, request) = apply(state.begin_drafting(SectionKind::Abstract));
        let (state, _) = apply(state.edit_section(SectionKind::Abstract, "hand written".to_string()));
        assert!(matches!(
            state.finish_drafting(SectionKind::Abstract, request, "model".to_string()),
            Commit::Discard(false)
        ));
        assert_eq!(state.section(SectionKind::Abstract).content, "hand written");
    }

    #[test]
    fn test_failure_preserves_prior_content() {
        let state = SessionState::new();
        let (state, _) = apply(state.edit_section(SectionKind::Discussion, "old".to_string()));
        let (state, request) = apply(state.begin_drafting(SectionKind::Discussion));
        let (state, _) = apply(state.fail_drafting(
            SectionKind::Discussion,
            request,
            "provider down".to_string(),
        ));
        let section = state.section(SectionKind::Discussion);
        assert_eq!(section.content, "old");
        assert_eq!(section.status, SectionStatus::Drafted);
        assert_eq!(section.last_error.as_deref(), Some("provider down"));
    }

    #[test]
    fn test_stale_analysis_is_discarded() {
        let state = SessionState::new();
        let (state, first) = apply(state.begin_analysis());
        let (state, second) = apply(state.begin_analysis());
        assert!(state.is_analysis_pending());

        assert!(matches!(
            state.finish_analysis(first, sample_analysis("old")),
            Commit::Discard(false)
        ));
        let (state, _) = apply(state.finish_analysis(second, sample_analysis("new")));
        assert!(!state.is_analysis_pending());
        assert_eq!(state.analysis.as_ref().map(|a| a.title.as_str()), Some("new"));
    }

    #[test]
    fn test_failed_analysis_settles_without_result() {
        let state = SessionState::new();
        let (state, request) = apply(state.begin_analysis());
        let (state, _) = apply(state.fail_analysis(request));
        assert!(!state.is_analysis_pending());
        assert!(state.analysis.is_none());
    }

    #[test]
    fn test_failure_on_empty_section_returns_to_empty() {
        let state = SessionState::new();
        let (state, request) = apply(state.begin_drafting(SectionKind::Conclusion));
        let (state, _) = apply(state.fail_drafting(SectionKind::Conclusion, request, "x".to_string()));
        assert_eq!(state.section(SectionKind::Conclusion).status, SectionStatus::Empty);
    }
}
