use super::{ExtractedText, TextExtractor};
use crate::error::ExtractionError;
use crate::models::ContentKind;

/// 纯文本读取（.txt / .md），去掉 UTF-8 BOM
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let content = String::from_utf8(bytes.to_vec())?;
        Ok(ExtractedText {
            content,
            kind: ContentKind::Plain,
        })
    }
}
