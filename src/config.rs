use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};
use crate::services::condensation::CondensationPolicy;
use crate::services::retry::RetryPolicy;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 高质量模型（慢、配额紧）
    pub preferred_model: String,
    /// 快速模型（便宜、配额宽松）
    pub fast_model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    // --- 重试配置 ---
    pub max_retries: u32,
    pub initial_retry_delay_ms: u64,
    // --- 文档压缩配置 ---
    /// 文档数超过该值时切换到 map-reduce 摘要模式
    pub condensation_threshold: usize,
    /// 逐篇摘要之间的间隔
    pub summary_pause_ms: u64,
    /// 章节撰写时直接附带的文档数上限
    pub drafting_document_limit: usize,
    /// 其他章节作为上下文时的截断长度（字符）
    pub section_excerpt_chars: usize,
    /// 顾问对话携带的历史轮数
    pub chat_window: usize,
    // --- 运行配置 ---
    pub documents_folder: String,
    pub output_file: String,
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            preferred_model: "gemini-2.5-pro".to_string(),
            fast_model: "gemini-2.5-flash".to_string(),
            max_output_tokens: 8192,
            temperature: 0.4,
            max_retries: 3,
            initial_retry_delay_ms: 2000,
            condensation_threshold: 2,
            summary_pause_ms: 500,
            drafting_document_limit: 3,
            section_excerpt_chars: 500,
            chat_window: 10,
            documents_folder: "papers".to_string(),
            output_file: "manuscript.md".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从 TOML 文件加载（缺省的键取默认值）
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// 从环境变量加载
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 加载配置：`CONFIG_FILE`（默认 manuscript.toml）存在时先读文件，再叠加环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "manuscript.toml".to_string());
        let path = Path::new(&path);
        let base = if path.exists() {
            Self::from_toml_file(path)?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    /// 用环境变量覆盖已有值
    pub fn with_env_overrides(self) -> Self {
        Self {
            llm_api_key: env_or("LLM_API_KEY", self.llm_api_key),
            llm_api_base_url: env_or("LLM_API_BASE_URL", self.llm_api_base_url),
            preferred_model: env_or("PREFERRED_MODEL", self.preferred_model),
            fast_model: env_or("FAST_MODEL", self.fast_model),
            max_output_tokens: env_parse_or("MAX_OUTPUT_TOKENS", self.max_output_tokens),
            temperature: env_parse_or("TEMPERATURE", self.temperature),
            max_retries: env_parse_or("MAX_RETRIES", self.max_retries),
            initial_retry_delay_ms: env_parse_or("INITIAL_RETRY_DELAY_MS", self.initial_retry_delay_ms),
            condensation_threshold: env_parse_or("CONDENSATION_THRESHOLD", self.condensation_threshold),
            summary_pause_ms: env_parse_or("SUMMARY_PAUSE_MS", self.summary_pause_ms),
            drafting_document_limit: env_parse_or("DRAFTING_DOCUMENT_LIMIT", self.drafting_document_limit),
            section_excerpt_chars: env_parse_or("SECTION_EXCERPT_CHARS", self.section_excerpt_chars),
            chat_window: env_parse_or("CHAT_WINDOW", self.chat_window),
            documents_folder: env_or("DOCUMENTS_FOLDER", self.documents_folder),
            output_file: env_or("OUTPUT_FILE", self.output_file),
            verbose_logging: env_parse_or("VERBOSE_LOGGING", self.verbose_logging),
        }
    }

    /// 重试策略
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_retry_delay_ms),
        }
    }

    /// 文档压缩策略
    pub fn condensation(&self) -> CondensationPolicy {
        CondensationPolicy {
            threshold: self.condensation_threshold,
            pause: Duration::from_millis(self.summary_pause_ms),
        }
    }
}

fn env_or(name: &str, current: String) -> String {
    std::env::var(name).unwrap_or(current)
}

fn env_parse_or<T: std::str::FromStr>(name: &str, current: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = Config::default();
        let retry = config.retry_policy();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.initial_delay, Duration::from_secs(2));

        let condensation = config.condensation();
        assert_eq!(condensation.threshold, 2);
        assert_eq!(condensation.pause, Duration::from_millis(500));

        assert_eq!(config.drafting_document_limit, 3);
        assert_eq!(config.chat_window, 10);
        assert!(config.llm_api_key.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            fast_model = "gemini-2.0-flash"
            max_retries = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.fast_model, "gemini-2.0-flash");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.preferred_model, "gemini-2.5-pro");
        assert_eq!(config.section_excerpt_chars, 500);
    }

    #[test]
    fn test_missing_toml_file_is_config_error() {
        let err = Config::from_toml_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
