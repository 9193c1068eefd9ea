//! 文本改写工具 - 流程层
//!
//! 对一段文本执行固定的改写指令。失败时原样返回输入文本。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clients::{CompletionProvider, CompletionRequest};
use crate::config::Config;
use crate::error::{AppError, InputError};
use crate::models::ContentPart;
use crate::services::prompts;
use crate::services::retry::RetryPolicy;
use crate::services::tier_router::{run_tiered, TierPlan};

/// 改写类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Expand,
    Condense,
    FixGrammar,
    MakeRigorous,
}

impl TransformKind {
    pub const ALL: [TransformKind; 4] = [
        TransformKind::Expand,
        TransformKind::Condense,
        TransformKind::FixGrammar,
        TransformKind::MakeRigorous,
    ];

    pub fn instruction(self) -> &'static str {
        match self {
            TransformKind::Expand => prompts::EXPAND_INSTRUCTION,
            TransformKind::Condense => prompts::CONDENSE_INSTRUCTION,
            TransformKind::FixGrammar => prompts::FIX_GRAMMAR_INSTRUCTION,
            TransformKind::MakeRigorous => prompts::MAKE_RIGOROUS_INSTRUCTION,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TransformKind::Expand => "expand",
            TransformKind::Condense => "condense",
            TransformKind::FixGrammar => "fix_grammar",
            TransformKind::MakeRigorous => "make_rigorous",
        }
    }
}

impl std::str::FromStr for TransformKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| InputError::UnknownTransform(s.to_string()).into())
    }
}

/// 改写结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub text: String,
    /// false 表示改写失败，`text` 是原文
    pub transformed: bool,
}

/// 改写任务
pub struct TransformTask {
    provider: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
}

impl TransformTask {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self {
            provider,
            retry: config.retry_policy(),
        }
    }

    pub async fn run(&self, text: &str, kind: TransformKind) -> TransformOutcome {
        let request = CompletionRequest::text(vec![
            ContentPart::text(text),
            ContentPart::text(kind.instruction()),
        ])
        .with_system(prompts::TRANSFORM_SYSTEM);
        let operation = format!("transform {}", kind.name());

        let result = run_tiered(&operation, TierPlan::QUALITY_FIRST, self.retry, |tier| {
            let request = request.on_tier(tier);
            let provider = Arc::clone(&self.provider);
            let operation = operation.as_str();
            async move {
                let response = provider.complete(request).await?;
                if response.text.trim().is_empty() {
                    return Err(AppError::empty_response(operation));
                }
                Ok(response.text)
            }
        })
        .await;

        match result {
            Ok(routed) => TransformOutcome {
                text: routed.value,
                transformed: true,
            },
            Err(e) => {
                warn!("⚠️ {}，保留原文", e);
                TransformOutcome {
                    text: text.to_string(),
                    transformed: false,
                }
            }
        }
    }
}
