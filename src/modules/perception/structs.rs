use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[allow(dead_code)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// NewsAPI `/v2/everything` 返回的单条新闻，字段基本都可能是 null
#[allow(dead_code)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub source: ArticleSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: Option<String>,
    /// NewsAPI 实际上不返回语言，保留字段以兼容其他来源
    #[serde(default)]
    pub language: Option<String>,
}

impl Article {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("").trim()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// description 为空时退回 content
    pub fn description_or_content(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => self.content.as_deref().unwrap_or(""),
        }
    }

    pub fn source_name(&self) -> &str {
        match self.source.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => "Неизвестный источник",
        }
    }

    pub fn word_count(&self) -> usize {
        format!("{} {}", self.title(), self.description_or_content())
            .split_whitespace()
            .count()
    }
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_newsapi_payload_with_nulls() {
        let raw = r#"{
            "status": "ok",
            "totalResults": 1,
            "articles": [{
                "source": {"id": null, "name": "CoinDesk"},
                "author": null,
                "title": "Bitcoin rallies",
                "description": null,
                "url": "https://example.com/btc",
                "urlToImage": null,
                "publishedAt": "2024-05-01T10:00:00Z",
                "content": "Bitcoin rallied today... [+2310 chars]"
            }]
        }"#;

        let resp: NewsApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.status, "ok");
        let a = &resp.articles[0];
        assert_eq!(a.source_name(), "CoinDesk");
        assert_eq!(a.url(), "https://example.com/btc");
        assert_eq!(a.description_or_content(), "Bitcoin rallied today... [+2310 chars]");
        assert!(a.published_at.is_some());
        assert!(a.language.is_none());
    }

    #[test]
    fn word_count_spans_title_and_body() {
        let a = Article {
            title: Some("one two three".into()),
            description: Some("  four\nfive   six ".into()),
            ..Default::default()
        };
        assert_eq!(a.word_count(), 6);
    }

    #[test]
    fn blank_source_name_gets_placeholder() {
        let a = Article::default();
        assert_eq!(a.source_name(), "Неизвестный источник");
    }
}
