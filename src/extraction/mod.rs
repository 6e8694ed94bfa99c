//! 知识库文件的文本提取
//!
//! 按扩展名选择提取器：`.txt`/`.md` 按纯文本读取，`.pdf` 逐页提取文字，
//! `.doc`/`.docx` 转为保留段落结构的简化 HTML。其他扩展名标记为不支持。
//!
//! 提取失败只体现在该文件的状态上，不影响其他文件和批量生成。

pub mod pdf;
pub mod plain;
pub mod word;

use std::path::Path;
use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::models::{ContentKind, KnowledgeBase, KnowledgeId, KnowledgeStatus};

/// 文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    PlainText,
    Pdf,
    Word,
}

static FORMATS: phf::Map<&'static str, SourceFormat> = phf::phf_map! {
    "txt" => SourceFormat::PlainText,
    "md" => SourceFormat::PlainText,
    "pdf" => SourceFormat::Pdf,
    "doc" => SourceFormat::Word,
    "docx" => SourceFormat::Word,
};

/// 根据文件名判断格式，不支持时返回 None
pub fn detect_format(file_name: &str) -> Option<SourceFormat> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    FORMATS.get(extension.as_str()).copied()
}

/// 提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub content: String,
    pub kind: ContentKind,
}

/// 文本提取器
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

fn extractor_for(format: SourceFormat) -> &'static dyn TextExtractor {
    match format {
        SourceFormat::PlainText => &plain::PlainTextExtractor,
        SourceFormat::Pdf => &pdf::PdfTextExtractor,
        SourceFormat::Word => &word::WordExtractor,
    }
}

/// 提取文件内容，返回最终状态（不会返回 Pending）
pub fn extract_bytes(file_name: &str, bytes: &[u8]) -> KnowledgeStatus {
    let Some(format) = detect_format(file_name) else {
        return KnowledgeStatus::Unsupported;
    };

    match extractor_for(format).extract(bytes) {
        Ok(extracted) => KnowledgeStatus::Loaded {
            content: extracted.content,
            kind: extracted.kind,
        },
        Err(e) => KnowledgeStatus::Error {
            reason: e.to_string(),
        },
    }
}

/// 读取文件并登记到知识库
///
/// 文件先以 Pending 状态登记，提取在阻塞线程池中完成后再更新状态。
pub async fn load_knowledge_file(knowledge: &mut KnowledgeBase, path: &Path) -> KnowledgeId {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let id = knowledge.add_pending(file_name.clone());

    let status = match tokio::fs::read(path).await {
        Ok(bytes) => {
            let name = file_name.clone();
            tokio::task::spawn_blocking(move || extract_bytes(&name, &bytes))
                .await
                .unwrap_or_else(|e| KnowledgeStatus::Error {
                    reason: ExtractionError::TaskFailed(e.to_string()).to_string(),
                })
        }
        Err(e) => KnowledgeStatus::Error {
            reason: format!("读取文件失败: {}", e),
        },
    };

    match &status {
        KnowledgeStatus::Loaded { content, .. } => {
            info!("📄 已加载 {} ({} 字)", file_name, content.chars().count())
        }
        KnowledgeStatus::Error { reason } => warn!("⚠️ {} 提取失败: {}", file_name, reason),
        KnowledgeStatus::Unsupported => warn!("⚠️ {} 格式不支持，已跳过", file_name),
        KnowledgeStatus::Pending => {}
    }

    knowledge.resolve(id, status);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("notes.TXT"), Some(SourceFormat::PlainText));
        assert_eq!(detect_format("readme.md"), Some(SourceFormat::PlainText));
        assert_eq!(detect_format("paper.pdf"), Some(SourceFormat::Pdf));
        assert_eq!(detect_format("plan.docx"), Some(SourceFormat::Word));
        assert_eq!(detect_format("legacy.doc"), Some(SourceFormat::Word));
        assert_eq!(detect_format("sheet.xlsx"), None);
        assert_eq!(detect_format("noext"), None);
    }

    #[test]
    fn test_unsupported_extension_has_no_content() {
        assert_eq!(extract_bytes("image.png", b"\x89PNG"), KnowledgeStatus::Unsupported);
    }

    #[test]
    fn test_corrupt_pdf_is_error_status() {
        let status = extract_bytes("broken.pdf", b"not a pdf");
        assert!(matches!(status, KnowledgeStatus::Error { .. }));
    }

    #[tokio::test]
    async fn test_load_knowledge_file_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.md");
        let bad = dir.path().join("bad.txt");
        std::fs::File::create(&good)
            .unwrap()
            .write_all("# 情绪\n认识情绪".as_bytes())
            .unwrap();
        std::fs::File::create(&bad)
            .unwrap()
            .write_all(&[0xff, 0xfe, 0xfd])
            .unwrap();

        let mut kb = KnowledgeBase::new();
        let good_id = load_knowledge_file(&mut kb, &good).await;
        let bad_id = load_knowledge_file(&mut kb, &bad).await;
        let missing_id = load_knowledge_file(&mut kb, &dir.path().join("missing.txt")).await;

        assert!(matches!(
            kb.get(good_id).unwrap().status(),
            KnowledgeStatus::Loaded { .. }
        ));
        assert!(matches!(
            kb.get(bad_id).unwrap().status(),
            KnowledgeStatus::Error { .. }
        ));
        assert!(matches!(
            kb.get(missing_id).unwrap().status(),
            KnowledgeStatus::Error { .. }
        ));

        kb.select(good_id);
        kb.select(bad_id);
        assert_eq!(kb.context(), "--- 内容来源: good.md ---\n# 情绪\n认识情绪");
    }
}
