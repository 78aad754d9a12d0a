use reqwest::{multipart, Client};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use super::caption::{strip_markup, truncate_chars, TELEGRAM_CAPTION_LIMIT};
use crate::config::{Credentials, PosterProfile};

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("photo unavailable: {0}")]
    Image(#[from] std::io::Error),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("api error {code}: {description}")]
    Api { code: i64, description: String },
}

impl TelegramError {
    /// HTML 解析失败 ("Bad Request: can't parse entities: ...")
    pub fn is_markup_error(&self) -> bool {
        match self {
            TelegramError::Api { description, .. } => {
                description.to_lowercase().contains("can't parse entities")
            }
            _ => false,
        }
    }
}

/// Telegram 频道发布：sendPhoto + caption (HTML)
pub struct TelegramPublisher {
    client: Client,
    bot_token: String,
    chat_id: String,
    api_url: String,
}

impl TelegramPublisher {
    pub fn new(client: Client, creds: &Credentials, profile: &PosterProfile) -> Self {
        Self {
            client,
            bot_token: creds.telegram_bot_token.clone(),
            chat_id: creds.telegram_chat_id.clone(),
            api_url: profile.endpoints.telegram_api_url.clone(),
        }
    }

    /// 成功返回 message_id
    /// HTML 解析失败时去掉标记、不带 parse_mode 重发一次
    pub async fn publish(&self, caption: &str, image_path: &Path) -> Result<i64, TelegramError> {
        info!("✈️ Publishing to Telegram (chat {})...", self.chat_id);

        let photo = tokio::fs::read(image_path).await?;
        let file_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo.jpg")
            .to_string();

        let (caption, truncated) = truncate_chars(caption, TELEGRAM_CAPTION_LIMIT, "");
        if truncated {
            warn!("✂️ Telegram caption truncated to {} characters", TELEGRAM_CAPTION_LIMIT);
        }

        match self.send_photo(photo.clone(), &file_name, &caption, Some("HTML")).await {
            Ok(message_id) => {
                info!("✅ Telegram: published, message_id={}", message_id);
                Ok(message_id)
            }
            Err(e) if e.is_markup_error() => {
                warn!("⚠️ Telegram rejected HTML ({}). Retrying as plain text...", e);
                let plain = strip_markup(&caption);
                let message_id = self.send_photo(photo, &file_name, &plain, None).await?;
                info!("✅ Telegram: published as plain text, message_id={}", message_id);
                Ok(message_id)
            }
            Err(e) => Err(e),
        }
    }

    async fn send_photo(
        &self,
        photo: Vec<u8>,
        file_name: &str,
        caption: &str,
        parse_mode: Option<&str>,
    ) -> Result<i64, TelegramError> {
        let url = format!(
            "{}/bot{}/sendPhoto",
            self.api_url.trim_end_matches('/'),
            self.bot_token
        );

        let mut form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part("photo", multipart::Part::bytes(photo).file_name(file_name.to_string()));
        if let Some(mode) = parse_mode {
            form = form.text("parse_mode", mode.to_string());
        }

        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        // Bot API 出错时也返回 JSON: {ok:false, error_code, description}
        let json_resp: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if json_resp["ok"].as_bool() == Some(true) {
            if let Some(message_id) = json_resp["result"]["message_id"].as_i64() {
                return Ok(message_id);
            }
        }

        Err(TelegramError::Api {
            code: json_resp["error_code"].as_i64().unwrap_or(status.as_u16() as i64),
            description: json_resp["description"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("unexpected response: {}", text)),
        })
    }
}
