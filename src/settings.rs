// ============================================
// src/settings.rs
// 設定の構造と読み書きロジック
// ============================================

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

pub const TIMER_RANGE: (u32, u32) = (3, 60);
pub const REPEAT_RANGE: (u32, u32) = (1, 5);

/// ユーザー設定。足りない項目は既定値で埋める
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// 出題ごとの制限時間 (秒)
    pub timer_duration: u32,
    /// 時間切れで答えを出し、自動で読み上げる
    pub auto_play: bool,
    /// 読み上げの回数
    pub repeat_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer_duration: 10,
            auto_play: true,
            repeat_count: 2,
        }
    }
}

impl Settings {
    /// 範囲外の値を丸める
    pub fn normalized(self) -> Self {
        Self {
            timer_duration: self.timer_duration.clamp(TIMER_RANGE.0, TIMER_RANGE.1),
            repeat_count: self.repeat_count.clamp(REPEAT_RANGE.0, REPEAT_RANGE.1),
            ..self
        }
    }
}

/// アプリ用ディレクトリ ("jp", "Fukumoto0141", "INTERVIEW_WIZ")
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("jp", "Fukumoto0141", "INTERVIEW_WIZ")
}

/// 設定ファイルとその保存先
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// OSごとの設定ディレクトリ。取れなければカレントディレクトリ
    pub fn default_path() -> PathBuf {
        match project_dirs() {
            Some(dirs) => dirs.config_dir().join(SETTINGS_FILE),
            None => PathBuf::from(SETTINGS_FILE),
        }
    }

    /// 読み込み。ファイルがない・壊れている場合は既定値
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match Self::read(&path) {
            Ok(Some(settings)) => {
                log::info!("settings loaded from {}", path.display());
                settings.normalized()
            }
            Ok(None) => Settings::default(),
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Settings::default()
            }
        };
        Self { path, settings }
    }

    fn read(path: &Path) -> Result<Option<Settings>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings in {}", path.display()))?;
        Ok(Some(settings))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// 変更して即保存する。保存に失敗しても変更はメモリ上に残る
    pub fn update(&mut self, change: impl FnOnce(&mut Settings)) -> Result<()> {
        change(&mut self.settings);
        self.settings = self.settings.normalized();
        self.save()
    }

    /// ファイル全体を書き直す
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write settings to {}", self.path.display()))?;
        log::debug!("settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json"));
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"autoPlay": false}"#).unwrap();

        let store = SettingsStore::open(&path);
        assert_eq!(
            store.settings(),
            Settings {
                timer_duration: 10,
                auto_play: false,
                repeat_count: 2,
            }
        );
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(SettingsStore::open(&path).settings(), Settings::default());
    }

    #[test]
    fn update_writes_the_whole_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut store = SettingsStore::open(&path);

        store.update(|s| s.timer_duration = 15).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!({"timerDuration": 15, "autoPlay": true, "repeatCount": 2})
        );
        assert_eq!(SettingsStore::open(&path).settings().timer_duration, 15);
    }

    #[test]
    fn values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SettingsStore::open(dir.path().join("settings.json"));
        store
            .update(|s| {
                s.timer_duration = 0;
                s.repeat_count = 99;
            })
            .unwrap();
        assert_eq!(store.settings().timer_duration, TIMER_RANGE.0);
        assert_eq!(store.settings().repeat_count, REPEAT_RANGE.1);
    }
}
