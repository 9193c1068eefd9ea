//! 顾问对话 - 流程层
//!
//! 输入：用户问题、最近若干轮对话、分析结果（作为背景）。
//! 两个层级都失败时返回固定的不可用提示，调用方总能得到一条回复。

use std::sync::Arc;

use tracing::error;

use crate::clients::{CompletionProvider, CompletionRequest};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{AnalysisResult, ChatRole, ChatTurn, ContentPart};
use crate::services::prompts;
use crate::services::retry::RetryPolicy;
use crate::services::tier_router::{run_tiered, TierPlan};

const TASK: &str = "advisor";

/// 顾问回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorReply {
    pub text: String,
    /// false 表示两个层级都失败，`text` 是固定提示
    pub available: bool,
    pub warnings: Vec<String>,
}

/// 顾问任务
pub struct AdvisorTask {
    provider: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
    window: usize,
}

impl AdvisorTask {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self {
            provider,
            retry: config.retry_policy(),
            window: config.chat_window,
        }
    }

    pub async fn run(
        &self,
        query: &str,
        history: &[ChatTurn],
        analysis: &AnalysisResult,
    ) -> AdvisorReply {
        let request = self.build_request(query, history, analysis);

        let result = run_tiered(TASK, TierPlan::QUALITY_FIRST, self.retry, |tier| {
            let request = request.on_tier(tier);
            let provider = Arc::clone(&self.provider);
            async move {
                let response = provider.complete(request).await?;
                if response.text.trim().is_empty() {
                    return Err(AppError::empty_response(TASK));
                }
                Ok(response.text)
            }
        })
        .await;

        match result {
            Ok(routed) => AdvisorReply {
                text: routed.value,
                available: true,
                warnings: routed.warnings,
            },
            Err(e) => {
                error!("❌ {}", e);
                AdvisorReply {
                    text: prompts::ADVISOR_UNAVAILABLE.to_string(),
                    available: false,
                    warnings: vec![e.to_string()],
                }
            }
        }
    }

    pub fn build_request(
        &self,
        query: &str,
        history: &[ChatTurn],
        analysis: &AnalysisResult,
    ) -> CompletionRequest {
        let mut parts = vec![ContentPart::text(prompts::advisor_grounding(analysis))];

        let start = history.len().saturating_sub(self.window);
        let transcript = history[start..]
            .iter()
            .map(|turn| match turn.role {
                ChatRole::User => format!("User: {}", turn.text),
                ChatRole::Assistant => format!("Advisor: {}", turn.text),
            })
            .collect::<Vec<_>>();
        if !transcript.is_empty() {
            parts.push(ContentPart::text(format!(
                "Conversation so far:\n{}",
                transcript.join("\n")
            )));
        }

        parts.push(ContentPart::text(query));
        CompletionRequest::text(parts).with_system(prompts::ADVISOR_SYSTEM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ModelTier, ScriptedProvider};

    fn config() -> Config {
        Config {
            initial_retry_delay_ms: 10,
            ..Config::default()
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            title: "Sparse Attention for Tabular Data".to_string(),
            target_venue: "JMLR".to_string(),
            gap: "g".to_string(),
            novelty: "n".to_string(),
            methodology_plan: "m".to_string(),
            expected_results: "e".to_string(),
            checklist: Default::default(),
            references: Vec::new(),
        }
    }

    fn history(turns: usize) -> Vec<ChatTurn> {
        (0..turns)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("question {}", i))
                } else {
                    ChatTurn::assistant(format!("answer {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_history_window_keeps_most_recent_turns() {
        let task = AdvisorTask::new(Arc::new(ScriptedProvider::always("x")), &config());
        let request = task.build_request("next?", &history(14), &analysis());
        let text = request.joined_text();

        assert!(text.contains("Sparse Attention for Tabular Data"));
        assert!(!text.contains("question 2\n"));
        assert!(text.contains("User: question 4"));
        assert!(text.contains("Advisor: answer 13"));
        assert_eq!(request.parts.last().and_then(ContentPart::as_text), Some("next?"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_tier_answers_when_preferred_fails() {
        let provider = Arc::new(ScriptedProvider::new(|request| match request.tier {
            ModelTier::Preferred => Err(AppError::provider_call_failed("pro", "429")),
            ModelTier::Fast => Ok("Try a smaller venue.".to_string()),
        }));
        let task = AdvisorTask::new(provider, &config());

        let reply = task.run("Where should I submit?", &[], &analysis()).await;
        assert!(reply.available);
        assert_eq!(reply.text, "Try a smaller venue.");
        assert_eq!(reply.warnings.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_failure_returns_static_message() {
        let provider = Arc::new(ScriptedProvider::new(|_| {
            Err(AppError::provider_call_failed("any", "quota exceeded"))
        }));
        let task = AdvisorTask::new(provider, &config());

        let reply = task.run("Hello?", &history(3), &analysis()).await;
        assert!(!reply.available);
        assert_eq!(reply.text, prompts::ADVISOR_UNAVAILABLE);
    }
}
