use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 提供方错误
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// LLM 响应内容错误
    #[error("response error: {0}")]
    Response(#[from] ResponseError),
    /// 输入校验错误（在任何 LLM 调用之前拒绝）
    #[error("{0}")]
    Input(#[from] InputError),
    /// 配置错误
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// 主备两个模型层级都失败后的最终错误
    #[error("{operation} failed after retries: {source}")]
    TaskFailed {
        operation: String,
        #[source]
        source: Box<AppError>,
    },
}

/// LLM 提供方错误
#[derive(Debug, Error)]
pub enum ProviderError {
    /// API 调用失败（原始错误信息保留，用于瞬时错误判断）
    #[error("call to model {model} failed: {message}")]
    CallFailed { model: String, message: String },
    /// 请求构建失败
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// LLM 响应错误
#[derive(Debug, Error)]
pub enum ResponseError {
    /// 需要内容的地方返回了空内容
    #[error("{task} returned an empty response")]
    Empty { task: String },
    /// 结构化输出无法解析
    #[error("{task} returned malformed structured output: {source}")]
    Malformed {
        task: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 没有上传任何文档
    #[error("no source documents provided; upload at least one document first")]
    NoDocuments,
    /// 尚未进行分析
    #[error("no analysis available; run the novelty/gap analysis first")]
    AnalysisMissing,
    /// 不支持的文件格式
    #[error("unsupported file format for '{name}'; supported formats are PDF, plain text (.txt), Markdown (.md) and LaTeX (.tex)")]
    UnsupportedFormat { name: String },
    /// 未知章节
    #[error("unknown manuscript section: {0}")]
    UnknownSection(String),
    /// 未知改写类型
    #[error("unknown transform: {0}; expected expand, condense, fix_grammar or make_rigorous")]
    UnknownTransform(String),
    /// 读取文档失败
    #[error("failed to read document {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("failed to parse config file {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 判断为瞬时错误的标记（大小写不敏感的子串匹配）
const TRANSIENT_MARKERS: [&str; 5] = ["429", "503", "quota", "resource exhausted", "rate limit"];

impl AppError {
    /// 是否为瞬时错误（限流 / 配额 / 服务过载）
    ///
    /// 只有 API 调用失败才可能是瞬时错误，且只看提供方返回的原始信息
    /// （不含模型名）。`_` 视为空格，这样 `RESOURCE_EXHAUSTED`
    /// 和 `rate_limit_exceeded` 也能命中。
    pub fn is_transient(&self) -> bool {
        let AppError::Provider(ProviderError::CallFailed { message, .. }) = self else {
            return false;
        };
        let message = message.to_lowercase().replace('_', " ");
        TRANSIENT_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }

    // ========== 便捷构造函数 ==========

    /// 创建 LLM API 调用错误
    pub fn provider_call_failed(model: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Provider(ProviderError::CallFailed {
            model: model.into(),
            message: message.into(),
        })
    }

    /// 创建空响应错误
    pub fn empty_response(task: impl Into<String>) -> Self {
        AppError::Response(ResponseError::Empty { task: task.into() })
    }

    /// 创建结构化输出解析错误
    pub fn malformed_response(task: impl Into<String>, source: serde_json::Error) -> Self {
        AppError::Response(ResponseError::Malformed {
            task: task.into(),
            source,
        })
    }

    /// 包装为"重试后仍失败"的任务级错误
    pub fn task_failed(operation: impl Into<String>, source: AppError) -> Self {
        AppError::TaskFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
