use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 新颖性 / 研究空白分析结果
///
/// 每次分析整体替换上一次的结果，不做合并。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub title: String,
    #[serde(rename = "target_journal")]
    pub target_venue: String,
    pub gap: String,
    pub novelty: String,
    pub methodology_plan: String,
    pub expected_results: String,
    pub checklist: Checklist,
    #[serde(default)]
    pub references: Vec<String>,
}

/// 四项自评清单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub novelty_check: String,
    pub significance_check: String,
    pub clarity_check: String,
    pub journal_fit_check: String,
}

/// 分析任务的固定 JSON Schema
pub fn analysis_schema() -> Value {
    let string = json!({ "type": "string" });
    json!({
        "type": "object",
        "properties": {
            "title": string,
            "target_journal": string,
            "gap": string,
            "novelty": string,
            "methodology_plan": string,
            "expected_results": string,
            "checklist": {
                "type": "object",
                "properties": {
                    "novelty_check": string,
                    "significance_check": string,
                    "clarity_check": string,
                    "journal_fit_check": string
                },
                "required": ["novelty_check", "significance_check", "clarity_check", "journal_fit_check"]
            },
            "references": { "type": "array", "items": string }
        },
        "required": [
            "title", "target_journal", "gap", "novelty",
            "methodology_plan", "expected_results", "checklist"
        ]
    })
}
