use anyhow::{Result, Context};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn, error};

const PHOTO_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// 本地图片轮换：用过的文件名逐行追加到 ledger，全部用完后清空重来
pub struct PhotoLedger {
    photo_dir: PathBuf,
    ledger_path: PathBuf,
}

impl PhotoLedger {
    pub fn new(photo_dir: impl Into<PathBuf>, ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            photo_dir: photo_dir.into(),
            ledger_path: ledger_path.into(),
        }
    }

    /// 随机选一张未用过的图片；目录不存在或没有图片时返回 None
    pub fn select_unique_photo(&self) -> Option<PathBuf> {
        match self.try_select() {
            Ok(choice) => choice,
            Err(e) => {
                error!("❌ Photo selection failed: {:#}", e);
                None
            }
        }
    }

    pub fn mark_photo_as_used(&self, photo_path: &Path) {
        let name = match photo_path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => {
                error!("❌ Cannot mark photo without a file name: {}", photo_path.display());
                return;
            }
        };

        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.ledger_path)
            .and_then(|mut f| writeln!(f, "{}", name));

        match appended {
            Ok(()) => info!("🖼️ Photo {} marked as used", name),
            Err(e) => error!("❌ Failed to mark photo {} as used: {}", name, e),
        }
    }

    fn try_select(&self) -> Result<Option<PathBuf>> {
        if !self.photo_dir.is_dir() {
            error!("❌ Photo folder not found: {}", self.photo_dir.display());
            return Ok(None);
        }

        let all = self.list_photos()?;
        if all.is_empty() {
            error!("❌ Photo folder {} has no png/jpg/jpeg/webp files", self.photo_dir.display());
            return Ok(None);
        }

        let used = self.load_used()?;
        let available: Vec<&String> = all.iter().filter(|n| !used.contains(*n)).collect();

        if available.is_empty() {
            warn!("♻️ All {} photos have been used. Resetting the ledger.", all.len());
            fs::write(&self.ledger_path, "")
                .with_context(|| format!("Failed to reset {}", self.ledger_path.display()))?;

            // 重新扫描：两次检查之间目录可能被清空
            let all = self.list_photos()?;
            if all.is_empty() {
                error!("❌ Photo folder {} is empty after reset", self.photo_dir.display());
                return Ok(None);
            }
            return Ok(all
                .choose(&mut rand::thread_rng())
                .map(|name| self.photo_dir.join(name)));
        }

        Ok(available
            .choose(&mut rand::thread_rng())
            .map(|name| self.photo_dir.join(name)))
    }

    fn list_photos(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.photo_dir)
            .with_context(|| format!("Cannot read {}", self.photo_dir.display()))?;

        let mut photos = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let eligible = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| PHOTO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false);
            if !eligible {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                photos.push(name.to_string());
            }
        }
        Ok(photos)
    }

    fn load_used(&self) -> Result<HashSet<String>> {
        if !self.ledger_path.exists() {
            fs::write(&self.ledger_path, "")
                .with_context(|| format!("Failed to create {}", self.ledger_path.display()))?;
            info!("🗒️ Created used-photo ledger: {}", self.ledger_path.display());
        }

        let raw = fs::read_to_string(&self.ledger_path)
            .with_context(|| format!("Failed to read {}", self.ledger_path.display()))?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(names: &[&str]) -> (tempfile::TempDir, PhotoLedger) {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("photos");
        fs::create_dir(&photos).unwrap();
        for n in names {
            fs::write(photos.join(n), b"img").unwrap();
        }
        let ledger = PhotoLedger::new(&photos, dir.path().join("used_photos.txt"));
        (dir, ledger)
    }

    fn name_of(p: &Path) -> String {
        p.file_name().unwrap().to_str().unwrap().to_string()
    }

    #[test]
    fn rotates_through_every_photo_before_repeating() {
        let (_dir, ledger) = setup(&["a.png", "b.JPG", "c.jpeg", "d.webp"]);

        let mut seen = HashSet::new();
        for _ in 0..4 {
            let p = ledger.select_unique_photo().unwrap();
            assert!(seen.insert(name_of(&p)), "photo repeated before exhaustion");
            ledger.mark_photo_as_used(&p);
        }
        assert_eq!(seen.len(), 4);

        // 第 N+1 次：ledger 重置，可以是任意一张
        let again = ledger.select_unique_photo().unwrap();
        assert!(seen.contains(&name_of(&again)));
        let raw = fs::read_to_string(&ledger.ledger_path).unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn ignores_non_images_and_directories() {
        let (dir, ledger) = setup(&["notes.txt", "only.PNG"]);
        fs::create_dir(dir.path().join("photos").join("nested.jpg")).unwrap();

        for _ in 0..3 {
            let p = ledger.select_unique_photo().unwrap();
            assert_eq!(name_of(&p), "only.PNG");
        }
    }

    #[test]
    fn creates_ledger_on_first_access() {
        let (_dir, ledger) = setup(&["a.png"]);
        assert!(!ledger.ledger_path.exists());
        ledger.select_unique_photo().unwrap();
        assert!(ledger.ledger_path.exists());
    }

    #[test]
    fn missing_or_empty_folder_gives_none() {
        let (dir, _) = setup(&[]);
        let empty = PhotoLedger::new(dir.path().join("photos"), dir.path().join("used.txt"));
        assert!(empty.select_unique_photo().is_none());

        let missing = PhotoLedger::new(dir.path().join("nope"), dir.path().join("used.txt"));
        assert!(missing.select_unique_photo().is_none());
    }

    #[test]
    fn repeated_marks_are_harmless() {
        let (_dir, ledger) = setup(&["a.png", "b.png"]);
        let a = ledger.photo_dir.join("a.png");
        ledger.mark_photo_as_used(&a);
        ledger.mark_photo_as_used(&a);

        let p = ledger.select_unique_photo().unwrap();
        assert_eq!(name_of(&p), "b.png");
    }
}
