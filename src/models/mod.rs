// Data models matching the frontend TypeScript types

pub mod chat_commands;
pub mod templates;

pub use chat_commands::{
    ChatCommandConfig, ChatCommandPreference, ChatCommandScope, ChatCommandsFile,
    ChatCommandsResponse, CreateChatCommandRequest, UpdateChatCommandRequest,
};
pub use templates::{TemplateInfo, TemplatePreviewResult, TemplateScope};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Claude,
    Opencode,
    Cursor,
    Codex,
    Qwen,
    Droid,
    Gemini,
}

impl AgentType {
    /// Returns all available agent types
    pub fn all() -> &'static [AgentType] {
        &[
            AgentType::Claude,
            AgentType::Opencode,
            AgentType::Cursor,
            AgentType::Codex,
            AgentType::Qwen,
            AgentType::Droid,
            AgentType::Gemini,
        ]
    }

    /// Returns the string representation of this agent type
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Claude => "claude",
            AgentType::Opencode => "opencode",
            AgentType::Cursor => "cursor",
            AgentType::Codex => "codex",
            AgentType::Qwen => "qwen",
            AgentType::Droid => "droid",
            AgentType::Gemini => "gemini",
        }
    }

    /// Human-readable name shown in agent pickers
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentType::Claude => "Claude Code",
            AgentType::Opencode => "OpenCode",
            AgentType::Cursor => "Cursor Agent",
            AgentType::Codex => "Codex CLI",
            AgentType::Qwen => "Qwen Code",
            AgentType::Droid => "Droid",
            AgentType::Gemini => "Gemini CLI",
        }
    }

    /// Name of the CLI binary the agent is launched with
    pub fn cli_command(&self) -> &'static str {
        match self {
            AgentType::Cursor => "cursor-agent",
            other => other.as_str(),
        }
    }

    /// Install instructions shown when the CLI is not found
    pub fn install_hint(&self) -> &'static str {
        match self {
            AgentType::Claude => "npm install -g @anthropic-ai/claude-code",
            AgentType::Opencode => "curl -fsSL https://opencode.ai/install | bash",
            AgentType::Cursor => "curl https://cursor.com/install -fsS | bash",
            AgentType::Codex => "npm install -g @openai/codex",
            AgentType::Qwen => "npm install -g @qwen-code/qwen-code",
            AgentType::Droid => "curl -fsSL https://app.factory.ai/cli | sh",
            AgentType::Gemini => "npm install -g @google/gemini-cli",
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(AgentType::Claude),
            "opencode" => Ok(AgentType::Opencode),
            "cursor" => Ok(AgentType::Cursor),
            "codex" => Ok(AgentType::Codex),
            "qwen" => Ok(AgentType::Qwen),
            "droid" => Ok(AgentType::Droid),
            "gemini" => Ok(AgentType::Gemini),
            _ => Err(format!(
                "Unknown agent type: '{}'. Expected one of: claude, opencode, cursor, codex, qwen, droid, gemini",
                s
            )),
        }
    }
}

impl Default for AgentType {
    fn default() -> Self {
        AgentType::Claude
    }
}

/// Detection result for one agent CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatusInfo {
    pub agent_type: AgentType,
    pub display_name: String,
    pub cli_command: String,
    pub available: bool,
    pub install_hint: String,
}

/// Information about an available model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Unique model identifier (e.g., "anthropic/claude-sonnet-4-5")
    pub id: String,
    /// Human-readable display name (e.g., "Claude Sonnet 4.5")
    pub name: String,
    /// Provider name (e.g., "anthropic", "openai")
    pub provider: String,
    /// Whether this is the default model for the agent
    #[serde(default)]
    pub is_default: bool,
}

impl ModelInfo {
    pub fn new(id: &str, name: &str, provider: &str, is_default: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
            is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_type_from_str_is_case_insensitive() {
        assert_eq!("Claude".parse::<AgentType>().unwrap(), AgentType::Claude);
        assert_eq!("GEMINI".parse::<AgentType>().unwrap(), AgentType::Gemini);
        assert!("unknown".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_agent_type_roundtrips_through_as_str() {
        for agent in AgentType::all() {
            assert_eq!(agent.as_str().parse::<AgentType>().unwrap(), *agent);
        }
    }

    #[test]
    fn test_cursor_cli_command() {
        assert_eq!(AgentType::Cursor.cli_command(), "cursor-agent");
        assert_eq!(AgentType::Claude.cli_command(), "claude");
    }

    #[test]
    fn test_agent_status_serializes_camel_case() {
        let status = AgentStatusInfo {
            agent_type: AgentType::Codex,
            display_name: "Codex CLI".to_string(),
            cli_command: "codex".to_string(),
            available: false,
            install_hint: AgentType::Codex.install_hint().to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"agentType\":\"codex\""));
        assert!(json.contains("\"installHint\""));
    }

    #[test]
    fn test_model_info_serialization() {
        let model = ModelInfo::new("test-model", "Test Model", "test-provider", true);
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"id\":\"test-model\""));
        assert!(json.contains("\"isDefault\":true"));
    }
}
