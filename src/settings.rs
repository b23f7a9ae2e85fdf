use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

pub const DEFAULT_SOUND_VOLUME: u8 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    /// Cue loudness slider, 0-100. 50 is unity gain, 100 doubles it.
    sound_volume: u8,
    theme: Theme,
    notifications_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            sound_volume: DEFAULT_SOUND_VOLUME,
            theme: Theme::default(),
            notifications_enabled: false,
        }
    }
}

/// JSON-file-backed preference store. Loads tolerantly (a broken or missing
/// file falls back to defaults) and persists on every change.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };
        if data.sound_volume > 100 {
            // An out-of-range value in the file means someone edited it by
            // hand; fall back to the default rather than clamping to max.
            data.sound_volume = DEFAULT_SOUND_VOLUME;
        }

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn sound_volume(&self) -> u8 {
        self.data.read().unwrap().sound_volume
    }

    pub fn set_sound_volume(&self, volume: u8) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.sound_volume = volume.min(100);
        self.persist(&guard)
    }

    /// Playback gain for audio cues: 0 → silent, 50 → 1.0, 100 → 2.0.
    pub fn cue_gain(&self) -> f32 {
        f32::from(self.sound_volume()) / 50.0
    }

    pub fn theme(&self) -> Theme {
        self.data.read().unwrap().theme
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.theme = theme;
        self.persist(&guard)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.data.read().unwrap().notifications_enabled
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.notifications_enabled = enabled;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.sound_volume(), 50);
        assert_eq!(store.theme(), Theme::Dark);
        assert!(!store.notifications_enabled());
        assert!((store.cue_gain() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn changes_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        {
            let store = SettingsStore::new(path.clone()).unwrap();
            store.set_sound_volume(0).unwrap();
            store.set_theme(Theme::Light).unwrap();
        }
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.sound_volume(), 0);
        assert_eq!(store.theme(), Theme::Light);
        assert_eq!(store.cue_gain(), 0.0);
    }

    #[test]
    fn volume_gain_scale() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        store.set_sound_volume(100).unwrap();
        assert!((store.cue_gain() - 2.0).abs() < f32::EPSILON);
        // Out-of-range input clamps to the slider maximum.
        store.set_sound_volume(255).unwrap();
        assert_eq!(store.sound_volume(), 100);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.sound_volume(), 50);

        fs::write(&path, r#"{"sound_volume": 180}"#).unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.sound_volume(), 50);
    }
}
