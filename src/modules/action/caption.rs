use regex::Regex;
use std::sync::OnceLock;

pub const TELEGRAM_CAPTION_LIMIT: usize = 1024;
pub const FACEBOOK_CAPTION_LIMIT: usize = 4000;
pub const ELLIPSIS: &str = "...";

/// 已翻译 (或回退为原文) 的帖子内容
#[derive(Debug, Clone)]
pub struct PostContent {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source_name: String,
}

fn truncation_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\[\+\d+\s*chars?\]\s*$").expect("static regex"))
}

fn html_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 截断可能留下半个标签，例如 "<a href='https://..."
    RE.get_or_init(|| Regex::new(r"<[^>]*(?:>|$)").expect("static regex"))
}

/// NewsAPI 的 content 尾部带有 "[+1234 chars]"
pub fn strip_truncation_marker(text: &str) -> String {
    truncation_marker_re().replace(text, "").trim().to_string()
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 去掉 HTML 标记，用于 Telegram 解析失败后的纯文本重发
pub fn strip_markup(text: &str) -> String {
    html_tag_re()
        .replace_all(text, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// 按字符 (不是字节) 截断，返回 (结果, 是否截断)
/// 截断后总长度不超过 limit，marker 计入长度
pub fn truncate_chars(text: &str, limit: usize, marker: &str) -> (String, bool) {
    if text.chars().count() <= limit {
        return (text.to_string(), false);
    }
    let keep = limit.saturating_sub(marker.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(marker);
    (out, true)
}

pub fn compose_telegram(post: &PostContent) -> String {
    let mut text = String::new();
    if !post.title.is_empty() {
        text.push_str(&format!("<b>{}</b>\n\n", escape_html(&post.title)));
    }
    if !post.description.is_empty() {
        text.push_str(&format!("{}\n\n", escape_html(&post.description)));
    }
    text.push_str(&format!(
        "Источник: <a href='{}'>{}</a>",
        post.url.replace('\'', "%27"),
        escape_html(&post.source_name)
    ));
    text
}

pub fn compose_facebook(post: &PostContent) -> String {
    let mut text = String::new();
    if !post.title.is_empty() {
        text.push_str(&format!("{}\n\n", post.title));
    }
    if !post.description.is_empty() {
        text.push_str(&format!("{}\n\n", post.description));
    }
    text.push_str(&format!("Источник: {} - {}", post.source_name, post.url));
    text
}
