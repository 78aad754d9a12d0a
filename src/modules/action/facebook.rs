use reqwest::{multipart, Client};
use anyhow::{Result, anyhow, Context};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::caption::{truncate_chars, ELLIPSIS, FACEBOOK_CAPTION_LIMIT};
use crate::config::{Credentials, PosterProfile};

/// 唯一带显式超时的投递调用
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

pub struct FacebookPublisher {
    client: Client,
    page_id: String,
    access_token: String,
    graph_url: String,
}

impl FacebookPublisher {
    pub fn new(client: Client, creds: &Credentials, profile: &PosterProfile) -> Self {
        Self {
            client,
            page_id: creds.facebook_page_id.clone(),
            access_token: creds.facebook_page_access_token.clone(),
            graph_url: profile.endpoints.facebook_graph_url.clone(),
        }
    }

    /// 上传本地图片 + 纯文本 caption 到主页，成功返回 post_id
    pub async fn publish(&self, caption: &str, image_path: &Path) -> Result<String> {
        info!("📘 Publishing to Facebook (page {})...", self.page_id);

        let photo = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("Photo not found: {}", image_path.display()))?;
        let file_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo.jpg")
            .to_string();

        let (caption, truncated) = truncate_chars(caption, FACEBOOK_CAPTION_LIMIT, ELLIPSIS);
        if truncated {
            warn!("✂️ Facebook caption truncated to {} characters", FACEBOOK_CAPTION_LIMIT);
        }

        let url = format!("{}/{}/photos", self.graph_url.trim_end_matches('/'), self.page_id);
        let form = multipart::Form::new()
            .text("access_token", self.access_token.clone())
            .text("caption", caption)
            .part("source", multipart::Part::bytes(photo).file_name(file_name));

        let resp = self.client.post(&url)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .context("Facebook network error")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Facebook API error ({}): {}", status, err));
        }

        let json_resp: Value = resp.json().await.context("Undecodable Facebook response")?;
        let post_id = json_resp["post_id"]
            .as_str()
            .or_else(|| json_resp["id"].as_str())
            .unwrap_or("N/A")
            .to_string();

        info!("✅ Facebook: published, post_id={}", post_id);
        Ok(post_id)
    }
}
