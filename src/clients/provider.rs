//! LLM 能力抽象
//!
//! 流水线只依赖"给定内容片段、模型层级和响应格式，生成文本"这一能力，
//! 具体客户端（async-openai / 测试用脚本）都实现 [`CompletionProvider`]。

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;
use crate::models::ContentPart;

/// 模型层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    /// 高质量、较慢、配额紧
    Preferred,
    /// 快速、便宜、配额宽松
    Fast,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Preferred => write!(f, "preferred"),
            ModelTier::Fast => write!(f, "fast"),
        }
    }
}

/// 响应格式
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    Text,
    /// 按给定 JSON Schema 输出
    Json(Value),
}

/// 单次调用请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub tier: ModelTier,
    pub system_instruction: Option<String>,
    pub parts: Vec<ContentPart>,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    /// 纯文本请求
    pub fn text(parts: Vec<ContentPart>) -> Self {
        Self {
            tier: ModelTier::Preferred,
            system_instruction: None,
            parts,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_format = ResponseFormat::Json(schema);
        self
    }

    /// 同一请求换到指定层级
    pub fn on_tier(&self, tier: ModelTier) -> Self {
        Self {
            tier,
            ..self.clone()
        }
    }

    /// 所有文本片段拼接（日志与测试断言用）
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 调用结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub text: String,
}

/// LLM 生成能力
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// 执行一次生成；受限流 / 配额约束，可能失败
    async fn complete(&self, request: CompletionRequest) -> AppResult<CompletionResponse>;
}
