//! 文本处理辅助函数

use regex::Regex;
use std::sync::LazyLock;

static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|h[1-6]|li|div|tr)\s*>").expect("valid block regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// 去掉 HTML 标记，只保留文字
///
/// 段落、标题、列表项结束处换行，常见实体还原为字符。
pub fn strip_markup(markup: &str) -> String {
    let with_breaks = BLOCK_END.replace_all(markup, "\n");
    let text = TAG.replace_all(&with_breaks, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
