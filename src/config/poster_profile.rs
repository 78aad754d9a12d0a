use serde::Deserialize;
use config::{Config, File};
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// 没有可用图片时，文章是否记为已处理
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoImagePolicy {
    /// 沿用旧行为：没图也记为已处理 (实际上丢弃了这条新闻)
    #[default]
    MarkProcessed,
    /// 不记录，下次运行在时间窗口内还会重试
    LeaveUnprocessed,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EndpointConfig {
    pub news_api_url: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub telegram_api_url: String,
    pub facebook_graph_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            news_api_url: "https://newsapi.org/v2".to_string(),
            gemini_api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            telegram_api_url: "https://api.telegram.org".to_string(),
            facebook_graph_url: "https://graph.facebook.com/v19.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PosterProfile {
    pub topic: String,
    pub query_language: String,
    pub target_language: String,
    pub lookback_days: i64,
    pub min_word_count: usize,
    pub processed_news_file: PathBuf,
    pub channel_gap_secs: u64,
    pub article_gap_secs: u64,
    pub no_image_policy: NoImagePolicy,
    pub endpoints: EndpointConfig,
}

impl Default for PosterProfile {
    fn default() -> Self {
        Self {
            topic: "cryptocurrency".to_string(),
            query_language: "en".to_string(),
            target_language: "ru".to_string(),
            lookback_days: 2,
            min_word_count: 300,
            processed_news_file: PathBuf::from("processed_news.json"),
            channel_gap_secs: 2,
            article_gap_secs: 10,
            no_image_policy: NoImagePolicy::MarkProcessed,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl PosterProfile {
    /// poster_config.{toml,json,yaml} 可选，不存在就全部用默认值
    pub fn load() -> Result<Self> {
        Self::load_from("poster_config")
    }

    pub fn load_from(name: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(name).required(false))
            .build()?;

        let profile: PosterProfile = settings.try_deserialize()?;
        Ok(profile)
    }

    pub fn channel_gap(&self) -> Duration {
        Duration::from_secs(self.channel_gap_secs)
    }

    pub fn article_gap(&self) -> Duration {
        Duration::from_secs(self.article_gap_secs)
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::days(self.lookback_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("nope");
        let profile = PosterProfile::load_from(name.to_str().unwrap()).unwrap();

        assert_eq!(profile.topic, "cryptocurrency");
        assert_eq!(profile.min_word_count, 300);
        assert_eq!(profile.lookback_days, 2);
        assert_eq!(profile.no_image_policy, NoImagePolicy::MarkProcessed);
        assert_eq!(profile.endpoints.gemini_model, "gemini-1.5-flash");
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster_config.toml");
        std::fs::write(
            &path,
            "min_word_count = 50\nno_image_policy = \"leave_unprocessed\"\n\n[endpoints]\ngemini_model = \"gemini-2.0-flash\"\n",
        )
        .unwrap();

        let profile = PosterProfile::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(profile.min_word_count, 50);
        assert_eq!(profile.no_image_policy, NoImagePolicy::LeaveUnprocessed);
        assert_eq!(profile.endpoints.gemini_model, "gemini-2.0-flash");
        assert_eq!(profile.endpoints.news_api_url, "https://newsapi.org/v2");
        assert_eq!(profile.article_gap(), Duration::from_secs(10));
    }
}
