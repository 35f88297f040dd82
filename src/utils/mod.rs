// Paths, error context and JSON file helpers

use std::path::{Path, PathBuf};

// =============================================================================
// Paths
// =============================================================================

/// `<project>/.ralph-ui`
#[inline]
pub fn ralph_ui_dir(project_path: &str) -> PathBuf {
    Path::new(project_path).join(".ralph-ui")
}

/// `<project>/.ralph-ui/templates`
#[inline]
pub fn templates_dir(project_path: &str) -> PathBuf {
    ralph_ui_dir(project_path).join("templates")
}

/// `~/.ralph-ui`, or `./.ralph-ui` without a home directory
pub fn global_ralph_ui_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ralph-ui")
}

/// Client-side storage for UI-only preferences
pub fn default_storage_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(global_ralph_ui_dir)
        .join("ralph-ui")
        .join("settings")
}

// =============================================================================
// Errors and files
// =============================================================================

/// Stringify an error behind a message prefix, for the `Result<_, String>`
/// file and storage helpers.
///
/// ```ignore
/// let raw = std::fs::read_to_string(&path).with_context("Failed to read preferences")?;
/// ```
pub trait ResultExt<T> {
    fn with_context(self, msg: &str) -> Result<T, String>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn with_context(self, msg: &str) -> Result<T, String> {
        self.map_err(|e| format!("{}: {}", msg, e))
    }
}

pub fn ensure_dir(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(path).with_context(&format!("Cannot create {}", path.display()))
}

/// Replace `path` through a sibling `.tmp` file so readers never see a
/// partial write
pub fn atomic_write(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let staged = path.with_extension("tmp");
    std::fs::write(&staged, content).with_context(&format!("Cannot write {}", staged.display()))?;
    std::fs::rename(&staged, path).with_context(&format!("Cannot replace {}", path.display()))
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path).with_context(&format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(&format!("Invalid JSON in {}", path.display()))
}

/// Pretty-printed, written with [`atomic_write`]
pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(data).with_context("Cannot serialize JSON")?;
    atomic_write(path, &raw)
}
