use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVars(Vec<&'static str>),
}

/// 运行所需的全部密钥与路径，全部来自环境变量 (.env)，缺一不可
#[derive(Clone)]
pub struct Credentials {
    pub facebook_page_id: String,
    pub facebook_page_access_token: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub photo_folder_path: PathBuf,
    pub used_photos_file: PathBuf,
    pub news_api_key: String,
    pub gemini_api_key: String,
}

// token 不能出现在日志里
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("facebook_page_id", &self.facebook_page_id)
            .field("facebook_page_access_token", &"<redacted>")
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("photo_folder_path", &self.photo_folder_path)
            .field("used_photos_file", &self.used_photos_file)
            .field("news_api_key", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub const REQUIRED_VARS: [&'static str; 8] = [
        "FACEBOOK_PAGE_ID",
        "FACEBOOK_PAGE_ACCESS_TOKEN",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
        "PHOTO_FOLDER_PATH",
        "USED_PHOTOS_FILE",
        "NEWS_API_KEY",
        "GEMINI_API_KEY",
    ];

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 统一收集所有缺失项后再报错，而不是遇到第一个就退出
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(Self::REQUIRED_VARS.len());
        let mut missing = Vec::new();

        for key in Self::REQUIRED_VARS {
            match lookup(key).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => values.push(v),
                _ => {
                    missing.push(key);
                    values.push(String::new());
                }
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }

        let mut it = values.into_iter();
        let mut next = || it.next().unwrap_or_default();

        Ok(Self {
            facebook_page_id: next(),
            facebook_page_access_token: next(),
            telegram_bot_token: next(),
            telegram_chat_id: next(),
            photo_folder_path: PathBuf::from(next()),
            used_photos_file: PathBuf::from(next()),
            news_api_key: next(),
            gemini_api_key: next(),
        })
    }
}
