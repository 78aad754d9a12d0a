use anyhow::Result;
use reqwest::Client;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::time::sleep;
use tracing::{info, warn, error};

use crate::config::{Credentials, NoImagePolicy, PosterProfile};
use crate::modules::action::caption::{compose_facebook, compose_telegram, strip_truncation_marker};
use crate::modules::action::{FacebookPublisher, PostContent, TelegramPublisher};
use crate::modules::brain::GeminiTranslator;
use crate::modules::ledger::{PhotoLedger, ProcessedLedger};
use crate::modules::perception::{Article, NewsSentinel};

/// 单篇文章的投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    NoImage,
    Attempted { telegram: bool, facebook: bool },
}

pub struct NewsPipeline {
    profile: PosterProfile,
    sentinel: NewsSentinel,
    translator: GeminiTranslator,
    telegram: TelegramPublisher,
    facebook: FacebookPublisher,
    photos: PhotoLedger,
    processed: ProcessedLedger,
}

/// 倒序 (最旧的先发)，去掉无 URL / 已发布 / 字数不足的文章
pub fn eligible_articles(
    candidates: Vec<Article>,
    processed: &BTreeSet<String>,
    min_word_count: usize,
) -> Vec<Article> {
    candidates
        .into_iter()
        .rev()
        .filter(|a| !a.url().is_empty() && !processed.contains(a.url()))
        .filter(|a| a.word_count() >= min_word_count)
        .collect()
}

impl NewsPipeline {
    pub fn new(client: Client, creds: &Credentials, profile: PosterProfile) -> Self {
        Self {
            sentinel: NewsSentinel::new(client.clone(), creds, &profile),
            translator: GeminiTranslator::new(client.clone(), creds, &profile),
            telegram: TelegramPublisher::new(client.clone(), creds, &profile),
            facebook: FacebookPublisher::new(client, creds, &profile),
            photos: PhotoLedger::new(&creds.photo_folder_path, &creds.used_photos_file),
            processed: ProcessedLedger::new(&profile.processed_news_file),
            profile,
        }
    }

    /// 一次完整运行，返回本轮新发布 (记为已处理) 的文章数
    pub async fn process_news(&self) -> Result<usize> {
        info!("🚀 News cycle starting...");
        let mut processed_urls = self.processed.load();
        info!("📚 Loaded {} processed URLs", processed_urls.len());

        let candidates = self.sentinel.fetch_candidates().await;
        if candidates.is_empty() {
            info!("📭 No articles fetched. Nothing to do.");
            return Ok(0);
        }

        let eligible = eligible_articles(candidates, &processed_urls, self.profile.min_word_count);
        if eligible.is_empty() {
            info!("📭 No new articles with at least {} words.", self.profile.min_word_count);
            return Ok(0);
        }
        info!("🗞️ {} eligible articles", eligible.len());

        let mut new_posts = 0usize;
        for article in &eligible {
            let url = article.url().to_string();
            // 同一批次里可能出现重复 URL
            if processed_urls.contains(&url) {
                continue;
            }

            let post = self.prepare_post(article).await;
            let tg_caption = compose_telegram(&post);
            let fb_caption = compose_facebook(&post);

            info!("📣 Publishing: {}", article.title());
            let delivery = match self.photos.select_unique_photo() {
                Some(photo) => self.publish_both(&tg_caption, &fb_caption, &photo).await,
                None => {
                    warn!("⚠️ No photo available. Nothing will be published for this article.");
                    Delivery::NoImage
                }
            };

            if self.should_mark_processed(delivery) {
                processed_urls.insert(url.clone());
                self.processed.save(&processed_urls);
                new_posts += 1;
                match delivery {
                    Delivery::NoImage => info!("🗂️ {} marked processed without delivery (no photo)", url),
                    Delivery::Attempted { .. } => info!("✅ {} published", url),
                }
            } else {
                error!("❌ {} was not published to any channel", url);
            }

            sleep(self.profile.article_gap()).await;
        }

        info!("🏁 News cycle finished. Published {} new articles.", new_posts);
        Ok(new_posts)
    }

    fn should_mark_processed(&self, delivery: Delivery) -> bool {
        match delivery {
            Delivery::Attempted { telegram, facebook } => telegram || facebook,
            Delivery::NoImage => self.profile.no_image_policy == NoImagePolicy::MarkProcessed,
        }
    }

    async fn prepare_post(&self, article: &Article) -> PostContent {
        let title = article.title().trim().to_string();
        let description = strip_truncation_marker(article.description_or_content());

        let language = article
            .language
            .as_deref()
            .unwrap_or(&self.profile.query_language);

        let (title, description) = if language == self.profile.target_language {
            info!("🈚 '{}' is already in '{}', skipping translation", title, language);
            (title, description)
        } else {
            (
                self.translate_or_original("title", title).await,
                self.translate_or_original("description", description).await,
            )
        };

        PostContent {
            title,
            description,
            url: article.url().to_string(),
            source_name: article.source_name().to_string(),
        }
    }

    /// 翻译失败或返回空串时退回原文
    async fn translate_or_original(&self, field: &str, original: String) -> String {
        if original.is_empty() {
            return original;
        }
        match self.translator.translate(&original).await {
            Ok(translated) if !translated.is_empty() => translated,
            Ok(_) => {
                warn!("⚠️ Empty {} translation, using the original", field);
                original
            }
            Err(e) => {
                warn!("⚠️ Could not translate {} ({:#}), using the original", field, e);
                original
            }
        }
    }

    async fn publish_both(&self, tg_caption: &str, fb_caption: &str, photo: &Path) -> Delivery {
        info!("🖼️ Selected photo: {}", photo.display());

        let telegram = match self.telegram.publish(tg_caption, photo).await {
            Ok(_) => true,
            Err(e) => {
                error!("❌ Telegram publish failed: {}", e);
                false
            }
        };

        sleep(self.profile.channel_gap()).await;

        let facebook = match self.facebook.publish(fb_caption, photo).await {
            Ok(_) => true,
            Err(e) => {
                error!("❌ Facebook publish failed: {:#}", e);
                false
            }
        };

        if telegram || facebook {
            self.photos.mark_photo_as_used(photo);
        }

        Delivery::Attempted { telegram, facebook }
    }
}
