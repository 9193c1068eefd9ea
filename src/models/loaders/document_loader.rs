use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, InputError};
use crate::models::document::SourceDocument;

/// 读取单个文件并作为源文档上传（不支持的格式会被拒绝）
pub async fn load_document(path: &Path) -> AppResult<SourceDocument> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = fs::read(path).await.map_err(|e| {
        AppError::from(InputError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })
    })?;

    SourceDocument::ingest(name, None, bytes)
}

/// 从文件夹中加载所有支持格式的文档，按文件名排序
///
/// 不支持的文件记录警告后跳过，不中断整个加载。
pub async fn load_documents_from_folder(folder_path: &str) -> AppResult<Vec<SourceDocument>> {
    let folder = PathBuf::from(folder_path);

    let mut entries = fs::read_dir(&folder).await.map_err(|e| {
        AppError::from(InputError::ReadFailed {
            path: folder_path.to_string(),
            source: e,
        })
    })?;

    let mut paths = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        match load_document(&path).await {
            Ok(document) => {
                info!(
                    "📄 已加载: {} ({:?}, {} 字节)",
                    document.name,
                    document.kind,
                    document.bytes.len()
                );
                documents.push(document);
            }
            Err(e) => {
                warn!("跳过文件 {}: {}", path.display(), e);
            }
        }
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;

    #[tokio::test]
    async fn test_load_folder_skips_unsupported() {
        let dir = std::env::temp_dir().join(format!("manuscript_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b_notes.md"), "# Notes").unwrap();
        std::fs::write(dir.join("a_paper.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.join("c_sheet.xlsx"), b"PK").unwrap();

        let documents = load_documents_from_folder(dir.to_str().unwrap()).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].name, "a_paper.pdf");
        assert_eq!(documents[0].kind, DocumentKind::Pdf);
        assert_eq!(documents[1].kind, DocumentKind::Text);
    }

    #[tokio::test]
    async fn test_missing_folder_is_error() {
        assert!(load_documents_from_folder("/no/such/folder/anywhere")
            .await
            .is_err());
    }
}
