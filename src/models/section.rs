use serde::Serialize;

use crate::error::{AppError, InputError};

/// 章节类型（固定的稿件组成部分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    Title,
    Abstract,
    Introduction,
    LiteratureReview,
    Methodology,
    Results,
    Discussion,
    Conclusion,
    References,
}

impl SectionKind {
    /// 稿件顺序
    pub const ALL: [SectionKind; 9] = [
        SectionKind::Title,
        SectionKind::Abstract,
        SectionKind::Introduction,
        SectionKind::LiteratureReview,
        SectionKind::Methodology,
        SectionKind::Results,
        SectionKind::Discussion,
        SectionKind::Conclusion,
        SectionKind::References,
    ];

    /// 稳定的章节 id
    pub fn id(self) -> &'static str {
        match self {
            SectionKind::Title => "title",
            SectionKind::Abstract => "abstract",
            SectionKind::Introduction => "introduction",
            SectionKind::LiteratureReview => "literature_review",
            SectionKind::Methodology => "methodology",
            SectionKind::Results => "results",
            SectionKind::Discussion => "discussion",
            SectionKind::Conclusion => "conclusion",
            SectionKind::References => "references",
        }
    }

    /// 标准标题
    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::Title => "Title",
            SectionKind::Abstract => "Abstract",
            SectionKind::Introduction => "Introduction",
            SectionKind::LiteratureReview => "Literature Review",
            SectionKind::Methodology => "Methodology",
            SectionKind::Results => "Results",
            SectionKind::Discussion => "Discussion",
            SectionKind::Conclusion => "Conclusion",
            SectionKind::References => "References",
        }
    }

    /// 在 `ALL` 中的位置
    pub fn index(self) -> usize {
        self as usize
    }

    /// 从 id 解析
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl std::str::FromStr for SectionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| InputError::UnknownSection(s.to_string()).into())
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.heading())
    }
}

/// 章节生命周期
///
/// `Empty → Generating → Drafted`，手动编辑保持 `Drafted`，
/// 重新生成时带着原内容回到 `Generating`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SectionStatus {
    Empty,
    /// `request` 是本章节最新发出的撰写请求序号
    Generating { request: u64 },
    Drafted,
}

/// 稿件章节，每种类型恰好一个，会话内不销毁
#[derive(Debug, Clone, Serialize)]
pub struct ManuscriptSection {
    pub id: &'static str,
    pub kind: SectionKind,
    pub content: String,
    pub status: SectionStatus,
    /// 作者备注，撰写时作为指导
    pub notes: String,
    /// 最近一次撰写失败的信息
    pub last_error: Option<String>,
    /// 已发出的最大请求序号
    #[serde(skip)]
    pub(crate) issued: u64,
}

impl ManuscriptSection {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            id: kind.id(),
            kind,
            content: String::new(),
            status: SectionStatus::Empty,
            notes: String::new(),
            last_error: None,
            issued: 0,
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.status, SectionStatus::Generating { .. })
    }

    /// 内容为空时回到 `Empty`，否则 `Drafted`
    pub(crate) fn settled_status(&self) -> SectionStatus {
        if self.content.trim().is_empty() {
            SectionStatus::Empty
        } else {
            SectionStatus::Drafted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_round_trip() {
        let mut ids: Vec<&str> = SectionKind::ALL.iter().map(|k| k.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SectionKind::ALL.len());

        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(SectionKind::from_id("appendix"), None);
        assert_eq!(
            "literature_review".parse::<SectionKind>().unwrap(),
            SectionKind::LiteratureReview
        );
        assert!("appendix"
            .parse::<SectionKind>()
            .unwrap_err()
            .to_string()
            .contains("appendix"));
    }

    #[test]
    fn test_new_section_is_empty() {
        let section = ManuscriptSection::new(SectionKind::Methodology);
        assert_eq!(section.id, "methodology");
        assert_eq!(section.status, SectionStatus::Empty);
        assert!(!section.is_generating());
    }
}
