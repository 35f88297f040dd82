// Touch gesture thresholds, stored in client storage

use crate::storage::{LocalStorage, GESTURES_KEY};
use serde::{Deserialize, Serialize};

pub const SWIPE_THRESHOLD_RANGE: (u32, u32) = (20, 200);
pub const LONG_PRESS_RANGE: (u32, u32) = (300, 1500);
pub const EDGE_SWIPE_WIDTH_RANGE: (u32, u32) = (10, 80);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GestureSettings {
    pub enabled: bool,
    /// Minimum travel before a drag counts as a swipe
    pub swipe_threshold_px: u32,
    pub long_press_ms: u32,
    /// Width of the screen edge zone that starts an edge swipe
    pub edge_swipe_width_px: u32,
    pub haptic_feedback: bool,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            swipe_threshold_px: 50,
            long_press_ms: 500,
            edge_swipe_width_px: 24,
            haptic_feedback: true,
        }
    }
}

impl GestureSettings {
    pub fn clamped(mut self) -> Self {
        self.swipe_threshold_px = clamp_to(self.swipe_threshold_px, SWIPE_THRESHOLD_RANGE);
        self.long_press_ms = clamp_to(self.long_press_ms, LONG_PRESS_RANGE);
        self.edge_swipe_width_px = clamp_to(self.edge_swipe_width_px, EDGE_SWIPE_WIDTH_RANGE);
        self
    }
}

fn clamp_to(value: u32, (min, max): (u32, u32)) -> u32 {
    value.clamp(min, max)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialGestureSettings {
    pub enabled: Option<bool>,
    pub swipe_threshold_px: Option<u32>,
    pub long_press_ms: Option<u32>,
    pub edge_swipe_width_px: Option<u32>,
    pub haptic_feedback: Option<bool>,
}

impl PartialGestureSettings {
    pub fn apply_to(&self, base: &GestureSettings) -> GestureSettings {
        GestureSettings {
            enabled: self.enabled.unwrap_or(base.enabled),
            swipe_threshold_px: self.swipe_threshold_px.unwrap_or(base.swipe_threshold_px),
            long_press_ms: self.long_press_ms.unwrap_or(base.long_press_ms),
            edge_swipe_width_px: self.edge_swipe_width_px.unwrap_or(base.edge_swipe_width_px),
            haptic_feedback: self.haptic_feedback.unwrap_or(base.haptic_feedback),
        }
        .clamped()
    }
}

/// Gesture settings with write-through persistence
pub struct GestureStore {
    storage: LocalStorage,
    settings: GestureSettings,
    recovered_from: Option<String>,
}

impl GestureStore {
    pub fn load(storage: LocalStorage) -> Self {
        let (settings, recovered_from) = storage
            .load::<GestureSettings>(GESTURES_KEY)
            .or_recover(GESTURES_KEY, GestureSettings::default);

        Self {
            storage,
            settings: settings.clamped(),
            recovered_from,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn recovered_from(&self) -> Option<&str> {
        self.recovered_from.as_deref()
    }

    /// Merge and persist immediately
    pub fn update(&mut self, partial: &PartialGestureSettings) -> Result<(), String> {
        self.settings = partial.apply_to(&self.settings);
        self.storage.save(GESTURES_KEY, &self.settings)
    }

    pub fn reset(&mut self) -> Result<(), String> {
        self.settings = GestureSettings::default();
        self.recovered_from = None;
        self.storage.remove(GESTURES_KEY)
    }
}
