//! Chat command configuration models
//!
//! Slash commands offered in the PRD Chat input. Builtin commands ship with
//! the app and can only be overridden; project and global commands are
//! created, edited and deleted by the user.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Maximum length of a command identifier
pub const MAX_COMMAND_ID_LEN: usize = 50;

/// Where a command is defined
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatCommandScope {
    /// Ships with the app; only preference overrides are stored
    Builtin,
    /// `<project>/.ralph-ui/chat-commands.json`
    Project,
    /// `~/.ralph-ui/chat-commands.json`
    Global,
}

impl Default for ChatCommandScope {
    fn default() -> Self {
        ChatCommandScope::Builtin
    }
}

impl std::fmt::Display for ChatCommandScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatCommandScope::Builtin => f.pad("builtin"),
            ChatCommandScope::Project => f.pad("project"),
            ChatCommandScope::Global => f.pad("global"),
        }
    }
}

impl std::str::FromStr for ChatCommandScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "builtin" => Ok(ChatCommandScope::Builtin),
            "project" => Ok(ChatCommandScope::Project),
            "global" => Ok(ChatCommandScope::Global),
            _ => Err(format!(
                "Invalid scope '{}'. Use 'project' or 'global'",
                s
            )),
        }
    }
}

/// A slash command as listed in the chat input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCommandConfig {
    /// Lowercase slug typed after the slash
    pub id: String,

    pub label: String,

    pub description: String,

    /// Text inserted into the input when the command is picked
    pub template: String,

    /// Disabled commands are hidden from the menu
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub favorite: bool,

    #[serde(default)]
    pub scope: ChatCommandScope,
}

fn default_true() -> bool {
    true
}

impl ChatCommandConfig {
    /// User command in global scope
    pub fn new(id: String, label: String, description: String, template: String) -> Self {
        Self {
            id,
            label,
            description,
            template,
            enabled: true,
            favorite: false,
            scope: ChatCommandScope::Global,
        }
    }

    pub fn builtin(id: &str, label: &str, description: &str, template: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            template: template.to_string(),
            enabled: true,
            favorite: false,
            scope: ChatCommandScope::Builtin,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.scope == ChatCommandScope::Builtin
    }

    /// Apply a preference override on top of this command
    pub fn apply_preference(&mut self, pref: &ChatCommandPreference) {
        if let Some(enabled) = pref.enabled {
            self.enabled = enabled;
        }
        if let Some(favorite) = pref.favorite {
            self.favorite = favorite;
        }
        if let Some(ref template) = pref.template {
            self.template = template.clone();
        }
        if let Some(ref label) = pref.label {
            self.label = label.clone();
        }
        if let Some(ref description) = pref.description {
            self.description = description.clone();
        }
    }
}

/// Override of a builtin command's fields. Unset fields keep the builtin value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatCommandPreference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChatCommandPreference {
    /// Overlay the set fields of `other` onto this preference
    pub fn merge(&mut self, other: ChatCommandPreference) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.favorite.is_some() {
            self.favorite = other.favorite;
        }
        if other.template.is_some() {
            self.template = other.template;
        }
        if other.label.is_some() {
            self.label = other.label;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.favorite.is_none()
            && self.template.is_none()
            && self.label.is_none()
            && self.description.is_none()
    }
}

/// Contents of one `chat-commands.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatCommandsFile {
    #[serde(default)]
    pub custom_commands: Vec<ChatCommandConfig>,

    /// Keyed by builtin id
    #[serde(default)]
    pub builtin_preferences: std::collections::HashMap<String, ChatCommandPreference>,
}

impl ChatCommandsFile {
    /// Nothing worth keeping on disk
    pub fn is_empty(&self) -> bool {
        self.custom_commands.is_empty() && self.builtin_preferences.is_empty()
    }
}

/// Payload of `list_chat_commands`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCommandsResponse {
    /// Builtins first, then global, then project commands
    pub commands: Vec<ChatCommandConfig>,
}

/// Arguments for update_chat_command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChatCommandRequest {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Where a builtin override is written; defaults to global
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_scope: Option<ChatCommandScope>,
}

impl UpdateChatCommandRequest {
    pub fn preference(&self) -> ChatCommandPreference {
        ChatCommandPreference {
            enabled: self.enabled,
            favorite: self.favorite,
            template: self.template.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
        }
    }
}

/// Arguments for create_chat_command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatCommandRequest {
    pub id: String,
    pub label: String,
    pub description: String,
    pub template: String,
    #[serde(default = "default_global_scope")]
    pub scope: ChatCommandScope,
}

fn default_global_scope() -> ChatCommandScope {
    ChatCommandScope::Global
}

/// `[a-z0-9_-]{1,50}`
pub fn is_valid_command_id(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_COMMAND_ID_LEN {
        return false;
    }

    id.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Normalize user input into a command identifier: lowercase, whitespace
/// runs become a single hyphen, anything else outside `[a-z0-9_-]` is dropped.
pub fn slugify_command_id(input: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let lowered = input.trim().to_lowercase();
    whitespace
        .replace_all(&lowered, "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_command_config_new() {
        let cmd = ChatCommandConfig::new(
            "standup".to_string(),
            "Standup".to_string(),
            "Summarize progress".to_string(),
            "What changed since yesterday?".to_string(),
        );

        assert_eq!(cmd.id, "standup");
        assert!(cmd.enabled);
        assert!(!cmd.favorite);
        assert_eq!(cmd.scope, ChatCommandScope::Global);
        assert!(!cmd.is_builtin());
    }

    #[test]
    fn test_apply_preference_overrides_only_set_fields() {
        let mut cmd = ChatCommandConfig::builtin("ideas", "Ideas", "Generate ideas", "Analyze...");
        cmd.apply_preference(&ChatCommandPreference {
            enabled: Some(false),
            template: Some("Custom".to_string()),
            ..Default::default()
        });

        assert!(!cmd.enabled);
        assert_eq!(cmd.template, "Custom");
        assert_eq!(cmd.label, "Ideas");
        assert_eq!(cmd.scope, ChatCommandScope::Builtin);
    }

    #[test]
    fn test_preference_merge() {
        let mut pref = ChatCommandPreference {
            favorite: Some(true),
            ..Default::default()
        };
        pref.merge(ChatCommandPreference {
            enabled: Some(false),
            ..Default::default()
        });

        assert_eq!(pref.favorite, Some(true));
        assert_eq!(pref.enabled, Some(false));
        assert!(!pref.is_empty());
        assert!(ChatCommandPreference::default().is_empty());
    }

    #[test]
    fn test_preference_serialization_skips_none() {
        let pref = ChatCommandPreference {
            enabled: Some(false),
            favorite: Some(true),
            ..Default::default()
        };

        let json = serde_json::to_string(&pref).unwrap();
        assert!(!json.contains("template"));
        assert!(json.contains("enabled"));
        assert!(json.contains("favorite"));
    }

    #[test]
    fn test_is_valid_command_id() {
        assert!(is_valid_command_id("my-command"));
        assert!(is_valid_command_id("my_command"));
        assert!(is_valid_command_id("cmd123"));

        assert!(!is_valid_command_id(""));
        assert!(!is_valid_command_id("My-Command"));
        assert!(!is_valid_command_id("my command"));
        assert!(!is_valid_command_id(&"a".repeat(51)));
    }

    #[test]
    fn test_slugify_command_id() {
        assert_eq!(slugify_command_id("my-command"), "my-command");
        assert_eq!(slugify_command_id("My Command"), "my-command");
        assert_eq!(slugify_command_id("  Review   PR  "), "review-pr");
        assert_eq!(slugify_command_id("Fix bug #42!"), "fix-bug-42");
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!(
            "Project".parse::<ChatCommandScope>().unwrap(),
            ChatCommandScope::Project
        );
        assert!("team".parse::<ChatCommandScope>().is_err());
    }
}
