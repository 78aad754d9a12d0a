mod config;
mod utils;
mod modules;

use anyhow::anyhow;
use dotenvy::dotenv;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Credentials, PosterProfile};
use crate::utils::http_client::HttpClientFactory;
use crate::modules::NewsPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("--- Crypto News Poster starting ---");

    // 1. 配置：缺任何一个环境变量都直接退出 (exit 1)
    let creds = Credentials::from_env().map_err(|e| {
        error!("🔥 CRITICAL: configuration error: {}", e);
        e
    })?;
    let profile = PosterProfile::load().map_err(|e| {
        error!("🔥 CRITICAL: cannot load poster_config: {:#}", e);
        e
    })?;

    // 2. 模块初始化
    let client = HttpClientFactory::create()?;
    let pipeline = NewsPipeline::new(client, &creds, profile);

    // 3. 单次运行，由外部 cron 定时触发
    let result = tokio::select! {
        res = pipeline.process_news() => res,
        _ = tokio::signal::ctrl_c() => {
            warn!("🛑 Interrupted by user");
            Err(anyhow!("interrupted by user"))
        }
    };

    match result {
        Ok(count) => {
            info!("✅ Done. {} new articles published.", count);
            Ok(())
        }
        Err(e) => {
            error!("🔥 CRITICAL: unexpected top-level failure: {:?}", e);
            Err(e)
        }
    }
}
