use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

use super::{ExtractedText, TextExtractor};
use crate::error::ExtractionError;
use crate::models::ContentKind;

/// Word 文档提取，转为每段一个 `<p>` 的简化 HTML
///
/// 只支持 .docx（ZIP + XML）；旧版二进制 .doc 会解析失败并标记为错误。
pub struct WordExtractor;

impl TextExtractor for WordExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let docx = read_docx(bytes).map_err(|e| ExtractionError::Word(format!("{:?}", e)))?;

        let markup: String = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
                _ => None,
            })
            .filter(|text| !text.trim().is_empty())
            .map(|text| format!("<p>{}</p>", escape_text(&text)))
            .collect();

        Ok(ExtractedText {
            content: markup,
            kind: ContentKind::Markup,
        })
    }
}

/// 段落 → Run → Text，同一段落内的 run 直接拼接
///
/// 返回的是原始文字，放进标记前需要转义。
fn paragraph_text(para: &Paragraph) -> String {
    let mut parts = Vec::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => parts.push(t.text.clone()),
                    RunChild::Tab(_) => parts.push("\t".to_string()),
                    _ => {}
                }
            }
        }
    }
    parts.concat()
}

/// 转义 `&`、`<`、`>`，避免正文被当作标签
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
