use super::{ExtractedText, TextExtractor};
use crate::error::ExtractionError;
use crate::models::ContentKind;

/// PDF 文本提取，使用 pdf-extract 逐页读取文字层
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        // pdf-extract 遇到个别畸形字体会 panic，这里转成普通错误
        let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|_| ExtractionError::Pdf("解析器异常退出".to_string()))?
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        tracing::debug!("PDF 共 {} 页", pages.len());

        Ok(ExtractedText {
            content: join_pages(&pages),
            kind: ContentKind::Plain,
        })
    }
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_with_newlines() {
        let pages = vec!["第一页 \n".to_string(), "第二页".to_string()];
        assert_eq!(join_pages(&pages), "第一页\n第二页");
    }

    #[test]
    fn test_garbage_is_pdf_error() {
        let err = PdfTextExtractor.extract(b"%PDF-garbage").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }
}
