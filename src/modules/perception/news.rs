// 文件名: news.rs

use reqwest::Client;
use anyhow::{Result, anyhow, Context};
use chrono::Utc;
use tracing::{info, error};

use super::structs::{Article, NewsApiResponse};
use crate::config::{Credentials, PosterProfile};

pub struct NewsSentinel {
    client: Client,
    api_key: String,
    base_url: String,
    topic: String,
    language: String,
    lookback: chrono::Duration,
}

impl NewsSentinel {
    pub fn new(client: Client, creds: &Credentials, profile: &PosterProfile) -> Self {
        Self {
            client,
            api_key: creds.news_api_key.clone(),
            base_url: profile.endpoints.news_api_url.clone(),
            topic: profile.topic.clone(),
            language: profile.query_language.clone(),
            lookback: profile.lookback(),
        }
    }

    /// 拉取最近 N 天的候选新闻 (按发布时间排序)
    /// 任何网络/接口错误都只记日志，返回空列表，当作"本轮没有新闻"
    pub async fn fetch_candidates(&self) -> Vec<Article> {
        match self.fetch().await {
            Ok(articles) => {
                info!("📰 NewsAPI returned {} articles for '{}'", articles.len(), self.topic);
                articles
            }
            Err(e) => {
                error!("❌ NewsAPI fetch failed: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        let url = format!("{}/everything", self.base_url.trim_end_matches('/'));
        let from_date = (Utc::now() - self.lookback).format("%Y-%m-%dT%H:%M:%S").to_string();

        // apiKey 不进日志
        info!("🔎 Querying NewsAPI: q={} language={} from={}", self.topic, self.language, from_date);

        let params = [
            ("q", self.topic.as_str()),
            ("sortBy", "publishedAt"),
            ("language", self.language.as_str()),
            ("from", from_date.as_str()),
            ("apiKey", self.api_key.as_str()),
        ];

        let resp = self.client.get(&url)
            .query(&params)
            .send()
            .await
            .context("NewsAPI network error")?;

        let status = resp.status();
        let body = resp.text().await.context("Failed to read NewsAPI body")?;

        // 错误时 NewsAPI 同样返回 {status:"error", code, message}，先尝试解析
        let parsed: NewsApiResponse = serde_json::from_str(&body)
            .with_context(|| format!("Undecodable NewsAPI response (HTTP {})", status))?;

        if parsed.status != "ok" {
            return Err(anyhow!(
                "NewsAPI error [{}]: {}",
                parsed.code.as_deref().unwrap_or("unknown"),
                parsed.message.as_deref().unwrap_or("no message")
            ));
        }

        Ok(parsed.articles)
    }
}
