use anyhow::{Result, Context};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::error;

/// 已发布新闻的 URL 列表 (processed_news.json)
pub struct ProcessedLedger {
    path: PathBuf,
}

impl ProcessedLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 文件不存在或损坏都返回空集合，损坏时记录错误
    pub fn load(&self) -> BTreeSet<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return BTreeSet::new(),
            Err(e) => {
                error!("❌ Cannot read {}: {}. Starting with an empty ledger.", self.path.display(), e);
                return BTreeSet::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(urls) => urls.into_iter().collect(),
            Err(e) => {
                error!("❌ Malformed {}: {}. Starting with an empty ledger.", self.path.display(), e);
                BTreeSet::new()
            }
        }
    }

    /// 整个文件覆盖写入；失败只记日志，本轮继续使用内存中的集合
    pub fn save(&self, processed: &BTreeSet<String>) {
        if let Err(e) = self.write(processed) {
            error!("❌ {:#}", e);
        }
    }

    fn write(&self, processed: &BTreeSet<String>) -> Result<()> {
        let urls: Vec<&String> = processed.iter().collect();
        let body = serde_json::to_string_pretty(&urls)?;
        fs::write(&self.path, body)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProcessedLedger::new(dir.path().join("processed_news.json"));

        let set: BTreeSet<String> = [
            "https://example.com/a",
            "https://example.com/b?x=1&y=\"2\"",
            "https://пример.рф/новость",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        ledger.save(&set);
        assert_eq!(ledger.load(), set);

        // 再存一次结果不变
        ledger.save(&ledger.load());
        assert_eq!(ledger.load(), set);
    }

    #[test]
    fn absent_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProcessedLedger::new(dir.path().join("missing.json"));
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_news.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ProcessedLedger::new(&path).load().is_empty());
    }

    #[test]
    fn unwritable_path_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProcessedLedger::new(dir.path().join("no-such-dir").join("p.json"));
        let set: BTreeSet<String> = ["u".to_string()].into_iter().collect();
        ledger.save(&set);
        assert!(ledger.load().is_empty());
    }
}
