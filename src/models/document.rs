//! 源文档与内容片段

use phf::phf_map;
use serde::Serialize;

use crate::error::{AppResult, InputError};

/// PDF 的媒体类型
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// 按文件后缀识别的格式
static SUFFIX_KINDS: phf::Map<&'static str, DocumentKind> = phf_map! {
    "pdf" => DocumentKind::Pdf,
    "txt" => DocumentKind::Text,
    "text" => DocumentKind::Text,
    "md" => DocumentKind::Text,
    "markdown" => DocumentKind::Text,
    "tex" => DocumentKind::Text,
    "latex" => DocumentKind::Text,
};

/// 按声明的媒体类型识别的格式
static MIME_KINDS: phf::Map<&'static str, DocumentKind> = phf_map! {
    "application/pdf" => DocumentKind::Pdf,
    "text/plain" => DocumentKind::Text,
    "text/markdown" => DocumentKind::Text,
    "text/x-markdown" => DocumentKind::Text,
    "text/x-tex" => DocumentKind::Text,
    "text/x-latex" => DocumentKind::Text,
    "application/x-tex" => DocumentKind::Text,
    "application/x-latex" => DocumentKind::Text,
};

/// 文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Text,
    Other,
}

impl DocumentKind {
    /// 根据声明的媒体类型或文件名后缀识别格式，媒体类型优先
    pub fn detect(name: &str, declared_mime: Option<&str>) -> Self {
        if let Some(kind) = declared_mime
            .map(|mime| mime.split(';').next().unwrap_or(mime).trim().to_lowercase())
            .and_then(|mime| MIME_KINDS.get(mime.as_str()).copied())
        {
            return kind;
        }

        name.rsplit_once('.')
            .map(|(_, suffix)| suffix.to_lowercase())
            .and_then(|suffix| SUFFIX_KINDS.get(suffix.as_str()).copied())
            .unwrap_or(DocumentKind::Other)
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, DocumentKind::Other)
    }
}

/// 上传的源文档（上传后不可变）
#[derive(Debug, Clone, Serialize)]
pub struct SourceDocument {
    pub name: String,
    pub kind: DocumentKind,
    #[serde(skip_serializing)]
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// 创建文档，不做格式校验
    pub fn new(name: impl Into<String>, declared_mime: Option<&str>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let kind = DocumentKind::detect(&name, declared_mime);
        Self { name, kind, bytes }
    }

    /// 上传入口：拒绝不支持的格式
    pub fn ingest(
        name: impl Into<String>,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> AppResult<Self> {
        let document = Self::new(name, declared_mime, bytes);
        if !document.kind.is_supported() {
            return Err(InputError::UnsupportedFormat {
                name: document.name,
            }
            .into());
        }
        Ok(document)
    }
}

/// 发给 LLM 的内容片段，每次调用时重新构建
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Binary { mime_type: String, bytes: Vec<u8> },
    Text(String),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            ContentPart::Binary { .. } => None,
        }
    }
}
