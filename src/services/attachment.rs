//! 附件准备 - 业务能力层
//!
//! 把源文档转换成 LLM 可消费的内容片段：
//! - PDF → 携带原始字节的二进制片段
//! - 文本 / Markdown / LaTeX → 解码后的文本片段，前后带文档定界行
//! - 其他格式 → 静默过滤

use tracing::warn;

use crate::models::{ContentPart, DocumentKind, SourceDocument, PDF_MIME_TYPE};

/// 文本片段的起始定界行
pub fn document_header(name: &str) -> String {
    format!("--- START OF DOCUMENT: {} ---", name)
}

/// 文本片段的结束分隔行
pub const DOCUMENT_FOOTER: &str = "--- END OF DOCUMENT ---";

/// 转换单个文档；不支持的格式返回 `None`
pub fn prepare(document: &SourceDocument) -> Option<ContentPart> {
    match document.kind {
        DocumentKind::Pdf => Some(ContentPart::Binary {
            mime_type: PDF_MIME_TYPE.to_string(),
            bytes: document.bytes.clone(),
        }),
        DocumentKind::Text => {
            let body = decode_text(document);
            Some(ContentPart::Text(format!(
                "{}\n{}\n{}\n",
                document_header(&document.name),
                body,
                DOCUMENT_FOOTER
            )))
        }
        DocumentKind::Other => None,
    }
}

/// 批量转换，结果可能比输入少
pub fn prepare_all<'a, I>(documents: I) -> Vec<ContentPart>
where
    I: IntoIterator<Item = &'a SourceDocument>,
{
    documents.into_iter().filter_map(prepare).collect()
}

/// 解码失败时记录警告并返回空串，不中断整批
fn decode_text(document: &SourceDocument) -> String {
    match std::str::from_utf8(&document.bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!("⚠️ 无法解码文档 {}: {}，以空文本代替", document.name, e);
            String::new()
        }
    }
}
