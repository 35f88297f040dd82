//! Terminal key bar layout and presets
//!
//! The layout is an ordered subset of [`key_catalog`], at least six keys and
//! at most the whole catalog, unique by label. Presets are named snapshots of
//! a layout; applying one makes it active until the layout is edited again.
//! Every change is written through to client storage.

use crate::reorder::{self, ReorderPolicy};
use crate::storage::{LocalStorage, KEY_BAR_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_LAYOUT_KEYS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDefinition {
    pub label: String,
    /// Bytes sent to the terminal
    pub sequence: String,
}

impl KeyDefinition {
    fn new(label: &str, sequence: &str) -> Self {
        Self {
            label: label.to_string(),
            sequence: sequence.to_string(),
        }
    }
}

/// Every key that can be placed on the bar
pub fn key_catalog() -> Vec<KeyDefinition> {
    vec![
        KeyDefinition::new("Esc", "\x1b"),
        KeyDefinition::new("Tab", "\t"),
        KeyDefinition::new("Ctrl+C", "\x03"),
        KeyDefinition::new("Ctrl+D", "\x04"),
        KeyDefinition::new("Ctrl+Z", "\x1a"),
        KeyDefinition::new("Ctrl+L", "\x0c"),
        KeyDefinition::new("Ctrl+R", "\x12"),
        KeyDefinition::new("Up", "\x1b[A"),
        KeyDefinition::new("Down", "\x1b[B"),
        KeyDefinition::new("Right", "\x1b[C"),
        KeyDefinition::new("Left", "\x1b[D"),
        KeyDefinition::new("Home", "\x1b[H"),
        KeyDefinition::new("End", "\x1b[F"),
        KeyDefinition::new("PgUp", "\x1b[5~"),
        KeyDefinition::new("PgDn", "\x1b[6~"),
        KeyDefinition::new("Enter", "\r"),
        KeyDefinition::new("|", "|"),
        KeyDefinition::new("/", "/"),
        KeyDefinition::new("~", "~"),
        KeyDefinition::new("-", "-"),
    ]
}

const DEFAULT_LAYOUT: &[&str] = &["Esc", "Tab", "Ctrl+C", "Up", "Down", "Left", "Right", "Enter"];

pub fn default_layout() -> Vec<KeyDefinition> {
    let catalog = key_catalog();
    DEFAULT_LAYOUT
        .iter()
        .filter_map(|label| catalog.iter().find(|k| k.label == *label).cloned())
        .collect()
}

fn label_of(key: &KeyDefinition) -> String {
    key.label.clone()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBarPreset {
    pub id: Uuid,
    pub name: String,
    pub keys: Vec<KeyDefinition>,
    pub created_at: DateTime<Utc>,
}

/// Stored key bar state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyBarState {
    pub layout: Vec<KeyDefinition>,
    pub presets: Vec<KeyBarPreset>,
    pub active_preset: Option<Uuid>,
}

impl Default for KeyBarState {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            presets: Vec::new(),
            active_preset: None,
        }
    }
}

/// Drop unknown and repeated keys; fall back to the default layout when
/// fewer than the minimum remain
fn sanitize_layout(keys: Vec<KeyDefinition>) -> Vec<KeyDefinition> {
    let catalog = key_catalog();
    let mut result: Vec<KeyDefinition> = Vec::new();
    for key in keys {
        if catalog.iter().any(|k| k.label == key.label)
            && !result.iter().any(|k| k.label == key.label)
        {
            result.push(key);
        }
    }

    if result.len() < MIN_LAYOUT_KEYS {
        log::warn!(
            "[KeyBarStore] Stored layout has {} valid keys, using default layout",
            result.len()
        );
        return default_layout();
    }
    result
}

pub struct KeyBarStore {
    storage: LocalStorage,
    state: KeyBarState,
    policy: ReorderPolicy,
    recovered_from: Option<String>,
}

impl KeyBarStore {
    pub fn load(storage: LocalStorage) -> Self {
        let (mut state, recovered_from) = storage
            .load::<KeyBarState>(KEY_BAR_KEY)
            .or_recover(KEY_BAR_KEY, KeyBarState::default);

        state.layout = sanitize_layout(state.layout);
        for preset in &mut state.presets {
            preset.keys = sanitize_layout(std::mem::take(&mut preset.keys));
        }
        if let Some(active) = state.active_preset {
            if !state.presets.iter().any(|p| p.id == active) {
                state.active_preset = None;
            }
        }

        Self {
            storage,
            state,
            policy: ReorderPolicy::key_bar(key_catalog().len()),
            recovered_from,
        }
    }

    pub fn layout(&self) -> &[KeyDefinition] {
        &self.state.layout
    }

    pub fn presets(&self) -> &[KeyBarPreset] {
        &self.state.presets
    }

    pub fn active_preset(&self) -> Option<&KeyBarPreset> {
        let active = self.state.active_preset?;
        self.state.presets.iter().find(|p| p.id == active)
    }

    pub fn recovered_from(&self) -> Option<&str> {
        self.recovered_from.as_deref()
    }

    pub fn can_move_up(&self, index: usize) -> bool {
        reorder::can_move_up(self.state.layout.len(), index)
    }

    pub fn can_move_down(&self, index: usize) -> bool {
        reorder::can_move_down(self.state.layout.len(), index)
    }

    pub fn can_remove(&self, index: usize) -> bool {
        self.policy.can_remove(self.state.layout.len(), index)
    }

    pub fn is_full(&self) -> bool {
        self.policy.is_full(self.state.layout.len())
    }

    /// Catalog keys not on the bar
    pub fn addable(&self) -> Vec<KeyDefinition> {
        reorder::addable(&self.state.layout, &key_catalog(), label_of)
    }

    pub fn move_up(&mut self, index: usize) -> Result<(), String> {
        let layout = reorder::move_up(&self.state.layout, index);
        self.set_layout(layout)
    }

    pub fn move_down(&mut self, index: usize) -> Result<(), String> {
        let layout = reorder::move_down(&self.state.layout, index);
        self.set_layout(layout)
    }

    pub fn remove(&mut self, index: usize) -> Result<(), String> {
        let layout = self.policy.remove(&self.state.layout, index);
        self.set_layout(layout)
    }

    /// Append the catalog key with `label`
    pub fn append(&mut self, label: &str) -> Result<(), String> {
        let key = key_catalog()
            .into_iter()
            .find(|k| k.label == label)
            .ok_or_else(|| format!("Unknown key '{}'", label))?;
        let layout = self.policy.append(&self.state.layout, key, label_of);
        self.set_layout(layout)
    }

    fn set_layout(&mut self, layout: Vec<KeyDefinition>) -> Result<(), String> {
        if layout == self.state.layout {
            return Ok(());
        }
        self.state.layout = layout;
        self.state.active_preset = None;
        self.persist()
    }

    /// Store the current layout as a new active preset. Names are unique,
    /// compared case-insensitively.
    pub fn save_preset(&mut self, name: &str) -> Result<Uuid, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Preset name cannot be empty".to_string());
        }
        if self
            .state
            .presets
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
        {
            return Err(format!("A preset named '{}' already exists", name));
        }

        let preset = KeyBarPreset {
            id: Uuid::new_v4(),
            name: name.to_string(),
            keys: self.state.layout.clone(),
            created_at: Utc::now(),
        };
        let id = preset.id;
        self.state.presets.push(preset);
        self.state.active_preset = Some(id);
        self.persist()?;
        Ok(id)
    }

    pub fn find_preset(&self, name: &str) -> Option<&KeyBarPreset> {
        self.state
            .presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn apply_preset(&mut self, id: Uuid) -> Result<(), String> {
        let preset = self
            .state
            .presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| format!("Preset {} not found", id))?;
        self.state.layout = preset.keys.clone();
        self.state.active_preset = Some(id);
        self.persist()
    }

    pub fn delete_preset(&mut self, id: Uuid) -> Result<(), String> {
        let before = self.state.presets.len();
        self.state.presets.retain(|p| p.id != id);
        if self.state.presets.len() == before {
            return Err(format!("Preset {} not found", id));
        }
        if self.state.active_preset == Some(id) {
            self.state.active_preset = None;
        }
        self.persist()
    }

    /// Default layout; presets are kept
    pub fn reset_layout(&mut self) -> Result<(), String> {
        self.set_layout(default_layout())
    }

    fn persist(&mut self) -> Result<(), String> {
        self.storage.save(KEY_BAR_KEY, &self.state)?;
        self.recovered_from = None;
        Ok(())
    }
}
