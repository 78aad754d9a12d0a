use reqwest::Client;
use anyhow::{Result, anyhow, Context};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::{Credentials, PosterProfile};

const TRANSLATE_PROMPT: &str = "Переведи следующий текст на русский язык. Выведи только перевод, без лишних фраз типа 'Вот перевод:'.\n\nТекст:\n";

pub struct GeminiTranslator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiTranslator {
    pub fn new(client: Client, creds: &Credentials, profile: &PosterProfile) -> Self {
        Self {
            client,
            api_key: creds.gemini_api_key.clone(),
            base_url: profile.endpoints.gemini_api_url.clone(),
            model: profile.endpoints.gemini_model.clone(),
        }
    }

    /// 返回去掉首尾空白的译文；空输入直接返回空串，不调用接口
    /// 失败时返回 Err，由调用方决定是否退回原文
    pub async fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let prompt = format!("{}{}", TRANSLATE_PROMPT, text);
        let raw = self.generate(&prompt).await
            .with_context(|| format!("Gemini ({}) translation failed", self.model))?;

        info!("🈯 Translated {} chars via Gemini", text.chars().count());
        Ok(raw.trim().to_string())
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "contents": [
                {"role": "user", "parts": [{"text": prompt}]}
            ]
        });

        let resp = self.client.post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            warn!("⚠️ Gemini API Error ({}): {}", status, err);
            return Err(anyhow!("Gemini returned HTTP {}", status));
        }

        let json_res: Value = resp.json().await?;
        Self::extract_text(&json_res)
    }

    // candidates[0].content.parts[*].text，被安全策略拦截时没有 parts
    fn extract_text(json_res: &Value) -> Result<String> {
        let parts = json_res["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                let reason = json_res["candidates"][0]["finishReason"]
                    .as_str()
                    .or_else(|| json_res["promptFeedback"]["blockReason"].as_str())
                    .unwrap_or("no candidates");
                anyhow!("Gemini returned no text ({})", reason)
            })?;

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(anyhow!("Gemini returned an empty translation"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn translator(base_url: String) -> GeminiTranslator {
        GeminiTranslator {
            client: Client::new(),
            api_key: "gem-key".to_string(),
            base_url,
            model: "gemini-1.5-flash".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_trimmed_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "gem-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "  Биткоин растёт \n"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = translator(server.uri()).translate("Bitcoin rises").await.unwrap();
        assert_eq!(out, "Биткоин растёт");
    }

    #[tokio::test]
    async fn empty_input_skips_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let out = translator(server.uri()).translate("   ").await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn http_error_is_a_failure_signal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        assert!(translator(server.uri()).translate("hello").await.is_err());
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let blocked = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = GeminiTranslator::extract_text(&blocked).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
