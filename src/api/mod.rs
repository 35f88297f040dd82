//! Backend collaborators used by the settings stores
//!
//! Each concern is a trait so stores can run against the Ralph server
//! (`invoke::InvokeClient`), against files on disk (`local::LocalBackend`) or
//! against a test double. `Backend` picks one of the first two at runtime.

pub mod backend;
pub mod invoke;
pub mod local;

#[cfg(test)]
pub mod testing;

use crate::config::{
    PartialExecutionConfig, PartialFallbackSettings, PartialGitConfig, PartialTemplateConfig,
    PartialValidationConfig, RalphConfig,
};
use crate::models::{
    AgentStatusInfo, AgentType, ChatCommandConfig, ChatCommandScope, CreateChatCommandRequest,
    ModelInfo, TemplateInfo, TemplatePreviewResult, TemplateScope, UpdateChatCommandRequest,
};
use thiserror::Error;

pub use backend::Backend;
pub use invoke::InvokeClient;
pub use local::LocalBackend;

/// Errors raised by backend calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend ran the command and reported a failure
    #[error("{0}")]
    Command(String),

    #[error("Failed to decode response for '{cmd}': {message}")]
    Decode { cmd: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Configuration store
#[allow(async_fn_in_trait)]
pub trait ConfigApi {
    async fn get_config(&self) -> ApiResult<RalphConfig>;
    async fn update_execution(&self, partial: &PartialExecutionConfig) -> ApiResult<()>;
    async fn update_git(&self, partial: &PartialGitConfig) -> ApiResult<()>;
    async fn update_validation(&self, partial: &PartialValidationConfig) -> ApiResult<()>;
    async fn update_fallback(&self, partial: &PartialFallbackSettings) -> ApiResult<()>;
    async fn update_templates(&self, partial: &PartialTemplateConfig) -> ApiResult<()>;
    /// Flush pushed sections to durable storage
    async fn save_config(&self) -> ApiResult<()>;
    /// Discard unsaved backend state and re-read from durable storage
    async fn reload_config(&self) -> ApiResult<RalphConfig>;
}

/// Prompt template storage and rendering
#[allow(async_fn_in_trait)]
pub trait TemplateApi {
    async fn list_templates(&self, project_path: Option<&str>) -> ApiResult<Vec<TemplateInfo>>;
    async fn get_template_content(
        &self,
        name: &str,
        project_path: Option<&str>,
    ) -> ApiResult<String>;
    async fn save_template(
        &self,
        name: &str,
        content: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()>;
    async fn delete_template(
        &self,
        name: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()>;
    async fn preview_template(
        &self,
        content: &str,
        project_path: Option<&str>,
    ) -> ApiResult<TemplatePreviewResult>;
}

/// Agent CLI detection
#[allow(async_fn_in_trait)]
pub trait AgentApi {
    async fn get_all_agents_status(&self) -> ApiResult<Vec<AgentStatusInfo>>;
}

/// Model discovery
#[allow(async_fn_in_trait)]
pub trait ModelApi {
    async fn get_available_models(
        &self,
        agent_type: AgentType,
        provider_id: Option<&str>,
    ) -> ApiResult<Vec<ModelInfo>>;
    /// Invalidate cached model lists (all agents when `None`)
    async fn refresh_models(&self, agent_type: Option<AgentType>) -> ApiResult<()>;
}

/// Slash commands offered in PRD chat
#[allow(async_fn_in_trait)]
pub trait ChatCommandApi {
    async fn list_chat_commands(
        &self,
        project_path: Option<&str>,
    ) -> ApiResult<Vec<ChatCommandConfig>>;
    async fn create_chat_command(
        &self,
        request: &CreateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()>;
    async fn update_chat_command(
        &self,
        request: &UpdateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()>;
    async fn delete_chat_command(
        &self,
        id: &str,
        scope: ChatCommandScope,
        project_path: Option<&str>,
    ) -> ApiResult<()>;
    /// Drop preference overrides for a builtin command
    async fn reset_chat_command(
        &self,
        id: &str,
        scope: Option<ChatCommandScope>,
        project_path: Option<&str>,
    ) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_displays_backend_message() {
        let err = ApiError::Command("Config not found".to_string());
        assert_eq!(err.to_string(), "Config not found");
    }

    #[test]
    fn test_decode_error_names_command() {
        let err = ApiError::Decode {
            cmd: "get_config".to_string(),
            message: "missing field".to_string(),
        };
        assert!(err.to_string().contains("get_config"));
    }
}
