use reqwest::Client;
use std::time::Duration;
use anyhow::Result;
use tracing::info;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// 创建通用 HTTP Client，NewsAPI / Gemini / Telegram / Facebook 共用
    /// 不设置整体超时：只有 Facebook 上传在请求级别单独限时
    pub fn create() -> Result<Client> {
        let builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            // NewsAPI 会拒绝没有 User-Agent 的请求
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        info!("🌐 [Http Client] Ready (connect timeout 10s)");

        let client = builder.build()?;
        Ok(client)
    }
}
