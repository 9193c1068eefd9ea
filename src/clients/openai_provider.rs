//! 基于 async-openai 的 LLM 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Gemini OpenAI 兼容端点、OpenRouter 等）
//! - 二进制附件（PDF）以 base64 data URL 的形式随用户消息发送

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

use crate::clients::provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, ModelTier, ResponseFormat,
};
use crate::config::Config;
use crate::error::{AppError, AppResult, ProviderError};
use crate::models::ContentPart;

/// OpenAI 兼容的 LLM 客户端
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    preferred_model: String,
    fast_model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl OpenAiProvider {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            preferred_model: config.preferred_model.clone(),
            fast_model: config.fast_model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// 层级对应的模型名
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Preferred => &self.preferred_model,
            ModelTier::Fast => &self.fast_model,
        }
    }

    fn build_messages(&self, request: &CompletionRequest) -> AppResult<Vec<ChatCompletionRequestMessage>> {
        let mut messages = Vec::new();

        if let Some(system) = system_text(request) {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText { text: text.clone() },
                ),
                ContentPart::Binary { mime_type, bytes } => {
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
                                detail: Some(ImageDetail::Auto),
                            },
                        },
                    )
                }
            })
            .collect();

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        Ok(messages)
    }
}

/// 系统消息：JSON 格式时附带 Schema 约束
fn system_text(request: &CompletionRequest) -> Option<String> {
    match (&request.system_instruction, &request.response_format) {
        (system, ResponseFormat::Text) => system.clone(),
        (system, ResponseFormat::Json(schema)) => {
            let schema_text = serde_json::to_string_pretty(schema).unwrap_or_default();
            let constraint = format!(
                "Respond with a single JSON object only, no prose and no code fences. \
                 It must validate against this JSON Schema:\n{}",
                schema_text
            );
            Some(match system {
                Some(system) => format!("{}\n\n{}", system, constraint),
                None => constraint,
            })
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> AppResult<CompletionResponse> {
        let model = self.model_for(request.tier).to_string();
        debug!(
            "调用 LLM API，模型: {} ({}), 片段数: {}",
            model,
            request.tier,
            request.parts.len()
        );

        let messages = self.build_messages(&request)?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_output_tokens)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败 (模型: {}): {}", model, e);
            AppError::provider_call_failed(&model, e.to_string())
        })?;

        debug!("LLM API 调用成功");

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(CompletionResponse {
            text: text.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis_schema;

    fn create_test_provider() -> OpenAiProvider {
        OpenAiProvider::new(&Config::default())
    }

    #[test]
    fn test_model_for_tier() {
        let provider = create_test_provider();
        assert_eq!(provider.model_for(ModelTier::Preferred), "gemini-2.5-pro");
        assert_eq!(provider.model_for(ModelTier::Fast), "gemini-2.5-flash");
    }

    #[test]
    fn test_json_format_adds_schema_constraint() {
        let request = CompletionRequest::text(vec![ContentPart::text("x")])
            .with_system("You are a reviewer.")
            .with_json_schema(analysis_schema());
        let system = system_text(&request).unwrap();
        assert!(system.starts_with("You are a reviewer."));
        assert!(system.contains("target_journal"));
    }

    #[test]
    fn test_build_messages_includes_binary_parts() {
        let provider = create_test_provider();
        let request = CompletionRequest::text(vec![
            ContentPart::text("Analyse these."),
            ContentPart::Binary {
                mime_type: "application/pdf".to_string(),
                bytes: b"%PDF".to_vec(),
            },
        ]);
        let messages = provider.build_messages(&request).unwrap();
        assert_eq!(messages.len(), 1);
    }

    /// 测试真实 API 连接
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_live_completion -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_completion() {
        let _ = tracing_subscriber::fmt::try_init();
        let provider = OpenAiProvider::new(&Config::from_env());
        let response = provider
            .complete(
                CompletionRequest::text(vec![ContentPart::text("Reply with the word: ready")])
                    .on_tier(ModelTier::Fast),
            )
            .await
            .unwrap();
        println!("LLM 响应: {}", response.text);
        assert!(!response.text.is_empty());
    }
}
