//! 提示词模板
//!
//! 所有发给模型的固定文本集中在这里，任务代码只负责填充上下文。

use crate::models::{AnalysisResult, SectionKind};

pub const ANALYSIS_SYSTEM: &str = "You are a senior academic editor and research strategist. \
Read the provided source material, identify the research gap it addresses and the novelty of \
the contribution, propose a suitable target journal, and assess the work's readiness for \
submission. Respond only with JSON.";

pub const ANALYSIS_INSTRUCTION: &str = "Analyse the documents above. Produce a working title, \
the most suitable target journal, the research gap, the novelty claim, a methodology plan, \
the expected results, a four-part review checklist (novelty, significance, clarity, journal \
fit) and the list of references cited in the material.";

pub const SUMMARY_SYSTEM: &str = "You condense research documents into compact, factual notes.";

/// 单篇文档摘要指令
pub fn summary_instruction(name: &str) -> String {
    format!(
        "Summarise the document \"{}\" above. Extract, as short labelled lines: \
         the research question, the methodology, the key findings, and the citations it relies on. \
         Do not add information that is not in the document.",
        name
    )
}

/// 摘要条目，带来源标记
pub fn summary_entry(name: &str, summary: &str) -> String {
    format!("[Source: {}]\n{}", name, summary.trim())
}

pub const COMBINED_SUMMARIES_HEADER: &str = "Summaries of the source documents:";

pub const DRAFTING_SYSTEM: &str = "You are an expert academic writer drafting one section of a \
research manuscript. Write in a formal scholarly register, stay consistent with the rest of \
the manuscript, and ground every claim in the provided sources. Return only the section body \
without its heading.";

/// 章节撰写请求正文
pub fn drafting_prompt(
    kind: SectionKind,
    analysis: &AnalysisResult,
    other_sections: &[(SectionKind, String)],
    notes: &str,
) -> String {
    let mut prompt = format!(
        "Paper title: {}\nTarget journal: {}\nResearch gap: {}\nNovelty: {}\nMethodology plan: {}\n",
        analysis.title,
        analysis.target_venue,
        analysis.gap,
        analysis.novelty,
        analysis.methodology_plan
    );

    if !other_sections.is_empty() {
        prompt.push_str("\nCurrent state of the other sections (excerpts):\n");
        for (other, excerpt) in other_sections {
            prompt.push_str(&format!("## {}\n{}\n", other.heading(), excerpt));
        }
    }

    if !notes.trim().is_empty() {
        prompt.push_str(&format!("\nAuthor notes for this section:\n{}\n", notes.trim()));
    }

    prompt.push_str(&format!("\nWrite the {} section now.", kind.heading()));
    prompt
}

/// 参考文献章节：按分析结果中的条目整理
pub fn references_prompt(references: &[String]) -> String {
    let listed = references
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Format the following references as a consistent numbered reference list \
         in the style of the target journal. Do not invent entries.\n\n{}",
        listed
    )
}

pub const TRANSFORM_SYSTEM: &str = "You are an academic copy editor. Return only the rewritten \
text, with no commentary.";

pub const EXPAND_INSTRUCTION: &str = "Expand the text above: develop each point in more depth \
and add supporting detail while keeping the original meaning.";
pub const CONDENSE_INSTRUCTION: &str = "Condense the text above: make it shorter and tighter \
without losing any key claim.";
pub const FIX_GRAMMAR_INSTRUCTION: &str = "Correct grammar, spelling and punctuation in the text \
above. Change nothing else.";
pub const MAKE_RIGOROUS_INSTRUCTION: &str = "Rewrite the text above with greater formal and \
mathematical rigor: precise definitions, explicit assumptions, and exact terminology.";

pub const ADVISOR_SYSTEM: &str = "You are a supportive research advisor helping an author \
prepare a manuscript for submission. Give concrete, actionable advice.";

/// 顾问对话的研究背景
pub fn advisor_grounding(analysis: &AnalysisResult) -> String {
    format!(
        "Research context:\nTitle: {}\nTarget journal: {}\nGap: {}\nNovelty: {}",
        analysis.title, analysis.target_venue, analysis.gap, analysis.novelty
    )
}

pub const ADVISOR_UNAVAILABLE: &str =
    "The advisor is unavailable right now. Please try again in a moment.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Checklist;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            title: "Sparse Attention for Tabular Data".to_string(),
            target_venue: "JMLR".to_string(),
            gap: "No sparse attention for tables".to_string(),
            novelty: "Column-wise sparsity".to_string(),
            methodology_plan: "Benchmarks".to_string(),
            expected_results: "Faster training".to_string(),
            checklist: Checklist::default(),
            references: vec![],
        }
    }

    #[test]
    fn test_drafting_prompt_includes_context_and_notes() {
        let prompt = drafting_prompt(
            SectionKind::Introduction,
            &analysis(),
            &[(SectionKind::Abstract, "We propose...".to_string())],
            "mention the 2023 benchmark",
        );
        assert!(prompt.contains("Sparse Attention for Tabular Data"));
        assert!(prompt.contains("## Abstract\nWe propose..."));
        assert!(prompt.contains("mention the 2023 benchmark"));
        assert!(prompt.ends_with("Write the Introduction section now."));
    }

    #[test]
    fn test_blank_notes_are_omitted() {
        let prompt = drafting_prompt(SectionKind::Methodology, &analysis(), &[], "  ");
        assert!(!prompt.contains("Author notes"));
    }

    #[test]
    fn test_references_are_numbered() {
        let prompt = references_prompt(&["A. Smith, 2020".to_string(), "B. Lee, 2021".to_string()]);
        assert!(prompt.contains("1. A. Smith, 2020\n2. B. Lee, 2021"));
    }
}
