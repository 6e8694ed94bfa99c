//! 课程文本 → HTML 片段
//!
//! 按行分类的单遍状态机，唯一的状态是"列表是否打开"。
//! 约定（与生成模版一致）：
//! - `1. 本堂课标题：XX` → 一级标题，取第一个全角冒号之后的文字
//! - `<数字>. <文字>` → 二级标题，取第一个空格之后的文字
//! - `* ` / `- ` 开头 → 列表项
//! - 其他非空行 → 段落
//! - 列表项和段落中的 `**文字**` → `<strong>文字</strong>`
//!
//! 不做转义，不支持嵌套列表、表格和链接；不成对的 `**` 原样保留。

use regex::Regex;
use std::sync::LazyLock;

/// 多个课程拼接时的分页标记
pub const PAGE_BREAK_SENTINEL: &str = "<--PAGE_BREAK-->";
/// 输出中的分页元素
pub const PAGE_BREAK_MARKUP: &str = r#"<br style="page-break-before: always">"#;

const TITLE_PREFIX: &str = "1. 本堂课标题：";

static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s(.+?)$").expect("valid section regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\*\-]\s(.*)$").expect("valid bullet regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));

/// 行的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Title(&'a str),
    Section(&'a str),
    Bullet(&'a str),
    Paragraph(&'a str),
}

/// 对单行分类，返回的文字已去掉标记前缀
pub fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if line.starts_with(TITLE_PREFIX) {
        let title = line
            .split_once('：')
            .map(|(_, rest)| rest)
            .unwrap_or_default();
        return LineKind::Title(title);
    }

    if SECTION.is_match(line) {
        let heading = line.split_once(' ').map(|(_, rest)| rest).unwrap_or(line);
        return LineKind::Section(heading);
    }

    if BULLET.is_match(line) {
        // 跳过标记符和其后的一个空白字符（可能是全角空格）
        let mut chars = line.char_indices().skip(2);
        let item = chars.next().map(|(i, _)| &line[i..]).unwrap_or("");
        return LineKind::Bullet(item);
    }

    LineKind::Paragraph(line)
}

/// `**文字**` → `<strong>文字</strong>`
pub fn emphasize(text: &str) -> String {
    BOLD.replace_all(text, "<strong>$1</strong>").into_owned()
}

/// 渲染一段课程文本（不含分页标记）
pub fn render_segment(text: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;

    for raw_line in text.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        match classify(line) {
            LineKind::Blank => close_list(&mut html, &mut in_list),
            LineKind::Title(title) => {
                close_list(&mut html, &mut in_list);
                html.push_str(&format!("<h1>{}</h1>", title));
            }
            LineKind::Section(heading) => {
                close_list(&mut html, &mut in_list);
                html.push_str(&format!("<h2>{}</h2>", heading));
            }
            LineKind::Bullet(item) => {
                if !in_list {
                    html.push_str("<ul>");
                    in_list = true;
                }
                html.push_str(&format!("<li>{}</li>", emphasize(item)));
            }
            LineKind::Paragraph(text) => {
                close_list(&mut html, &mut in_list);
                html.push_str(&format!("<p>{}</p>", emphasize(text)));
            }
        }
    }

    close_list(&mut html, &mut in_list);
    html
}

fn close_list(html: &mut String, in_list: &mut bool) {
    if *in_list {
        html.push_str("</ul>");
        *in_list = false;
    }
}

/// 渲染可能包含多个课程的文本
///
/// 按分页标记切分，每段去掉首尾空白后独立渲染，除第一段外都在前面插入分页元素。
pub fn render_body(text: &str) -> String {
    text.split(PAGE_BREAK_SENTINEL)
        .enumerate()
        .map(|(index, segment)| {
            let html = render_segment(segment.trim());
            if index > 0 {
                format!("{}{}", PAGE_BREAK_MARKUP, html)
            } else {
                html
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_title_uses_text_after_fullwidth_colon() {
        assert_eq!(
            classify("1. 本堂课标题：SEL家长同行课程 - 第1堂：认识情绪"),
            LineKind::Title("SEL家长同行课程 - 第1堂：认识情绪")
        );
    }

    #[test]
    fn test_classify_section_and_bullets() {
        assert_eq!(classify("2. 为什么重要：原因"), LineKind::Section("为什么重要：原因"));
        assert_eq!(classify("* 活动名称"), LineKind::Bullet("活动名称"));
        assert_eq!(classify("- 材料"), LineKind::Bullet("材料"));
        assert_eq!(classify("-\u{3000}全角空格"), LineKind::Bullet("全角空格"));
        assert_eq!(classify("   "), LineKind::Blank);
        // 没有空格的编号、`**` 开头都按段落处理
        assert_eq!(classify("2.没有空格"), LineKind::Paragraph("2.没有空格"));
        assert_eq!(classify("**加粗段落**"), LineKind::Paragraph("**加粗段落**"));
    }

    #[test]
    fn test_title_then_bullet_with_bold() {
        let html = render_segment("1. 本堂课标题：Foo\n* bar **baz**");
        assert_eq!(html, "<h1>Foo</h1><ul><li>bar <strong>baz</strong></li></ul>");
    }

    #[test]
    fn test_list_closed_by_blank_heading_and_paragraph() {
        let html = render_segment("* a\n\n* b\n3. 核心知识：x\n* c\n正文");
        assert_eq!(
            html,
            "<ul><li>a</li></ul><ul><li>b</li></ul><h2>核心知识：x</h2><ul><li>c</li></ul><p>正文</p>"
        );
    }

    #[test]
    fn test_unmatched_bold_left_as_is() {
        assert_eq!(render_segment("说明 **未闭合"), "<p>说明 **未闭合</p>");
        assert_eq!(emphasize("**a** 和 **b**"), "<strong>a</strong> 和 <strong>b</strong>");
    }

    #[test]
    fn test_crlf_lines() {
        assert_eq!(render_segment("2. 标题\r\n正文\r\n"), "<h2>标题</h2><p>正文</p>");
    }

    #[test]
    fn test_page_break_only_between_segments() {
        let html = render_body("第一课\n\n<--PAGE_BREAK-->\n\n第二课");
        assert_eq!(
            html,
            format!("<p>第一课</p>{}<p>第二课</p>", PAGE_BREAK_MARKUP)
        );
    }
}
