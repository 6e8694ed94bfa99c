//! 课程文档导出
//!
//! 把课程文本渲染成 HTML，以 UTF-8 BOM 开头、`application/msword` 类型保存为 `.doc`，
//! Word 可以直接打开。

pub mod markup;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::FileError;
pub use markup::{classify, render_body, LineKind, PAGE_BREAK_MARKUP, PAGE_BREAK_SENTINEL};

/// 导出文件的 MIME 类型
pub const MIME_TYPE: &str = "application/msword";

const BOM: &str = "\u{feff}";
const FILE_PREFIX: &str = "SEL-课程-";
const COMBINED_FILE_NAME: &str = "SEL-课程-批量生成.doc";

const STYLE: &str = "\
body { font-family: 'Times New Roman', serif; line-height: 1.6; font-size: 12pt; }
h1, h2, h3 { font-family: 'Arial', sans-serif; color: #333; }
h1 { font-size: 22pt; text-align: center; margin-bottom: 1.5em; }
h2 { font-size: 16pt; margin-top: 1.5em; margin-bottom: 0.8em; border-bottom: 1px solid #ccc; padding-bottom: 0.3em; }
p { margin-bottom: 1em; }
ul { margin-left: 20px; padding-left: 20px; }
li { margin-bottom: 0.5em; }
strong { font-weight: bold; }";

/// 导出结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub title: String,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }
}

/// 导出单个课程文本
pub fn export(body: &str, title: &str) -> ExportedDocument {
    let html = wrap_document(&render_body(body), title);
    let mut bytes = Vec::with_capacity(BOM.len() + html.len());
    bytes.extend_from_slice(BOM.as_bytes());
    bytes.extend_from_slice(html.as_bytes());

    ExportedDocument {
        title: title.to_string(),
        bytes,
    }
}

/// 多个课程合并导出，课程之间分页
pub fn export_many(bodies: &[&str], title: &str) -> ExportedDocument {
    export(&join_with_page_breaks(bodies), title)
}

/// 用分页标记拼接多个课程文本
pub fn join_with_page_breaks(bodies: &[&str]) -> String {
    bodies.join(&format!("\n\n{}\n\n", PAGE_BREAK_SENTINEL))
}

fn wrap_document(body_html: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title, STYLE, body_html
    )
}

/// 单个课程的文件名：`SEL-课程-<技能>.doc`，空白和路径分隔符替换为 `_`
pub fn course_file_name(skill: &str) -> String {
    let sanitized: String = skill
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\') {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{}{}.doc", FILE_PREFIX, sanitized)
}

/// 为一批课程分配互不重复的文件名，顺序与输入一致
///
/// 技能点第一次出现时用 [`course_file_name`]；重名时追加年龄段，仍重名再追加序号。
/// 合并文档的文件名也视为已占用。
pub fn unique_course_file_names<'a, I>(courses: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut used: HashSet<String> = HashSet::from([COMBINED_FILE_NAME.to_string()]);
    let mut names = Vec::new();

    for (skill, age_group) in courses {
        let mut name = course_file_name(skill);
        if used.contains(&name) {
            let with_age = format!("{}-{}", skill.trim(), age_group.trim());
            name = course_file_name(&with_age);
            let mut counter = 2;
            while used.contains(&name) {
                name = course_file_name(&format!("{}-{}", with_age, counter));
                counter += 1;
            }
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

/// 合并导出的文件名
pub fn combined_file_name() -> &'static str {
    COMBINED_FILE_NAME
}

/// 写入输出目录，目录不存在时创建
pub async fn write_document(
    document: &ExportedDocument,
    output_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, FileError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| FileError::write_failed(output_dir.display().to_string(), e))?;

    let path = output_dir.join(file_name);
    tokio::fs::write(&path, &document.bytes)
        .await
        .map_err(|e| FileError::write_failed(path.display().to_string(), e))?;

    info!("💾 已导出: {}", path.display());
    Ok(path)
}
