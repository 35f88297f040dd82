//! Local-only presentation preferences
//!
//! Theme, terminal font size, notification toggles and sound settings. The
//! record lives in client storage under [`PREFERENCES_KEY`] and is never sent
//! to the backend.

use crate::storage::{LocalStorage, PREFERENCES_KEY};
use serde::{Deserialize, Serialize};

/// Allowed terminal font sizes, inclusive
pub const FONT_SIZE_RANGE: (u32, u32) = (10, 24);
pub const MAX_VOLUME: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(format!("Unknown theme '{}'. Use light, dark or system", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoundMode {
    Off,
    #[default]
    System,
    /// Ralph's own sound set
    Ralph,
}

impl std::str::FromStr for SoundMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(SoundMode::Off),
            "system" => Ok(SoundMode::System),
            "ralph" => Ok(SoundMode::Ralph),
            _ => Err(format!("Unknown sound mode '{}'. Use off, system or ralph", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    /// Master toggle
    pub enabled: bool,
    pub loop_complete: bool,
    pub story_complete: bool,
    pub agent_error: bool,
    pub rate_limited: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            loop_complete: true,
            story_complete: true,
            agent_error: true,
            rate_limited: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundPreferences {
    pub mode: SoundMode,
    pub volume: u8,
}

impl Default for SoundPreferences {
    fn default() -> Self {
        Self {
            mode: SoundMode::default(),
            volume: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalPreferences {
    pub theme: Theme,
    pub terminal_font_size: u32,
    pub notifications: NotificationPreferences,
    pub sound: SoundPreferences,
}

impl Default for LocalPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            terminal_font_size: 14,
            notifications: NotificationPreferences::default(),
            sound: SoundPreferences::default(),
        }
    }
}

impl LocalPreferences {
    /// Copy with numeric fields pulled into their allowed ranges
    pub fn clamped(mut self) -> Self {
        let (min, max) = FONT_SIZE_RANGE;
        self.terminal_font_size = self.terminal_font_size.clamp(min, max);
        self.sound.volume = self.sound.volume.min(MAX_VOLUME);
        self
    }
}

/// Partial update for the notification toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialNotificationPreferences {
    pub enabled: Option<bool>,
    pub loop_complete: Option<bool>,
    pub story_complete: Option<bool>,
    pub agent_error: Option<bool>,
    pub rate_limited: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSoundPreferences {
    pub mode: Option<SoundMode>,
    pub volume: Option<u8>,
}

/// Partial update for [`LocalPreferences`]; nested groups merge field by field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialLocalPreferences {
    pub theme: Option<Theme>,
    pub terminal_font_size: Option<u32>,
    pub notifications: Option<PartialNotificationPreferences>,
    pub sound: Option<PartialSoundPreferences>,
}

impl PartialLocalPreferences {
    pub fn apply_to(&self, base: &LocalPreferences) -> LocalPreferences {
        let notifications = match self.notifications {
            Some(n) => NotificationPreferences {
                enabled: n.enabled.unwrap_or(base.notifications.enabled),
                loop_complete: n.loop_complete.unwrap_or(base.notifications.loop_complete),
                story_complete: n.story_complete.unwrap_or(base.notifications.story_complete),
                agent_error: n.agent_error.unwrap_or(base.notifications.agent_error),
                rate_limited: n.rate_limited.unwrap_or(base.notifications.rate_limited),
            },
            None => base.notifications,
        };
        let sound = match self.sound {
            Some(s) => SoundPreferences {
                mode: s.mode.unwrap_or(base.sound.mode),
                volume: s.volume.unwrap_or(base.sound.volume),
            },
            None => base.sound,
        };

        LocalPreferences {
            theme: self.theme.unwrap_or(base.theme),
            terminal_font_size: self.terminal_font_size.unwrap_or(base.terminal_font_size),
            notifications,
            sound,
        }
        .clamped()
    }
}

/// Owner of the local preference record
pub struct PreferenceStore {
    storage: LocalStorage,
    preferences: LocalPreferences,
    dirty: bool,
    recovered_from: Option<String>,
}

impl PreferenceStore {
    /// Read the record from `storage`, using defaults when it is missing or
    /// unreadable
    pub fn load(storage: LocalStorage) -> Self {
        let (preferences, recovered_from) = storage
            .load::<LocalPreferences>(PREFERENCES_KEY)
            .or_recover(PREFERENCES_KEY, LocalPreferences::default);

        Self {
            storage,
            preferences: preferences.clamped(),
            dirty: false,
            recovered_from,
        }
    }

    pub fn preferences(&self) -> &LocalPreferences {
        &self.preferences
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Parse error of the stored record if it was replaced by defaults on load
    pub fn recovered_from(&self) -> Option<&str> {
        self.recovered_from.as_deref()
    }

    pub fn update_local(&mut self, partial: &PartialLocalPreferences) {
        self.preferences = partial.apply_to(&self.preferences);
        self.dirty = true;
    }

    pub fn reset_to_defaults(&mut self) {
        self.preferences = LocalPreferences::default();
        self.dirty = true;
    }

    /// Write the record to client storage
    pub fn persist(&mut self) -> Result<(), String> {
        self.storage.save(PREFERENCES_KEY, &self.preferences)?;
        self.dirty = false;
        self.recovered_from = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_storage_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = PreferenceStore::load(LocalStorage::new(temp_dir.path()));

        assert_eq!(store.preferences(), &LocalPreferences::default());
        assert_eq!(store.preferences().terminal_font_size, 14);
        assert_eq!(store.preferences().sound.volume, 50);
        assert!(store.recovered_from().is_none());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_corrupt_storage_recovers_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(format!("{}.json", PREFERENCES_KEY)),
            "{ not json",
        )
        .unwrap();

        let store = PreferenceStore::load(LocalStorage::new(temp_dir.path()));
        assert_eq!(store.preferences(), &LocalPreferences::default());
        assert!(store.recovered_from().is_some());
    }

    #[test]
    fn test_update_merges_nested_groups() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::load(LocalStorage::new(temp_dir.path()));

        store.update_local(&PartialLocalPreferences {
            notifications: Some(PartialNotificationPreferences {
                agent_error: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        });

        let notifications = store.preferences().notifications;
        assert!(!notifications.agent_error);
        assert!(notifications.enabled);
        assert!(notifications.rate_limited);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_update_clamps_values() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::load(LocalStorage::new(temp_dir.path()));

        store.update_local(&PartialLocalPreferences {
            terminal_font_size: Some(40),
            sound: Some(PartialSoundPreferences {
                volume: Some(250),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(store.preferences().terminal_font_size, 24);
        assert_eq!(store.preferences().sound.volume, 100);

        store.update_local(&PartialLocalPreferences {
            terminal_font_size: Some(2),
            ..Default::default()
        });
        assert_eq!(store.preferences().terminal_font_size, 10);
    }

    #[test]
    fn test_persist_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::load(LocalStorage::new(temp_dir.path()));
        store.update_local(&PartialLocalPreferences {
            theme: Some(Theme::Dark),
            sound: Some(PartialSoundPreferences {
                mode: Some(SoundMode::Ralph),
                volume: None,
            }),
            ..Default::default()
        });
        store.persist().unwrap();
        assert!(!store.is_dirty());

        let reopened = PreferenceStore::load(LocalStorage::new(temp_dir.path()));
        assert_eq!(reopened.preferences().theme, Theme::Dark);
        assert_eq!(reopened.preferences().sound.mode, SoundMode::Ralph);
        assert_eq!(reopened.preferences().sound.volume, 50);
    }

    #[test]
    fn test_missing_fields_in_stored_record_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        storage
            .save(PREFERENCES_KEY, &serde_json::json!({ "theme": "light" }))
            .unwrap();

        let store = PreferenceStore::load(storage);
        assert_eq!(store.preferences().theme, Theme::Light);
        assert_eq!(store.preferences().terminal_font_size, 14);
    }

    #[test]
    fn test_reset_to_defaults_marks_dirty() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = PreferenceStore::load(LocalStorage::new(temp_dir.path()));
        store.update_local(&PartialLocalPreferences {
            theme: Some(Theme::Light),
            ..Default::default()
        });
        store.persist().unwrap();

        store.reset_to_defaults();
        assert_eq!(store.preferences().theme, Theme::System);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
