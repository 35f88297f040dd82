// Runtime choice between the Ralph server and local files

use super::{
    AgentApi, ApiResult, ChatCommandApi, ConfigApi, InvokeClient, LocalBackend, ModelApi,
    TemplateApi,
};
use crate::config::{
    PartialExecutionConfig, PartialFallbackSettings, PartialGitConfig, PartialTemplateConfig,
    PartialValidationConfig, RalphConfig,
};
use crate::models::{
    AgentStatusInfo, AgentType, ChatCommandConfig, ChatCommandScope, CreateChatCommandRequest,
    ModelInfo, TemplateInfo, TemplatePreviewResult, TemplateScope, UpdateChatCommandRequest,
};

/// Either backend behind one type
pub enum Backend {
    Remote(InvokeClient),
    Local(LocalBackend),
}

impl Backend {
    pub fn describe(&self) -> String {
        match self {
            Backend::Remote(client) => format!("server {}", client.endpoint()),
            Backend::Local(local) => format!("local files in {:?}", local.global_dir()),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            Backend::Remote(client) => client.$method($($arg),*).await,
            Backend::Local(local) => local.$method($($arg),*).await,
        }
    };
}

impl ConfigApi for Backend {
    async fn get_config(&self) -> ApiResult<RalphConfig> {
        dispatch!(self, get_config())
    }

    async fn update_execution(&self, partial: &PartialExecutionConfig) -> ApiResult<()> {
        dispatch!(self, update_execution(partial))
    }

    async fn update_git(&self, partial: &PartialGitConfig) -> ApiResult<()> {
        dispatch!(self, update_git(partial))
    }

    async fn update_validation(&self, partial: &PartialValidationConfig) -> ApiResult<()> {
        dispatch!(self, update_validation(partial))
    }

    async fn update_fallback(&self, partial: &PartialFallbackSettings) -> ApiResult<()> {
        dispatch!(self, update_fallback(partial))
    }

    async fn update_templates(&self, partial: &PartialTemplateConfig) -> ApiResult<()> {
        dispatch!(self, update_templates(partial))
    }

    async fn save_config(&self) -> ApiResult<()> {
        dispatch!(self, save_config())
    }

    async fn reload_config(&self) -> ApiResult<RalphConfig> {
        dispatch!(self, reload_config())
    }
}

impl TemplateApi for Backend {
    async fn list_templates(&self, project_path: Option<&str>) -> ApiResult<Vec<TemplateInfo>> {
        dispatch!(self, list_templates(project_path))
    }

    async fn get_template_content(
        &self,
        name: &str,
        project_path: Option<&str>,
    ) -> ApiResult<String> {
        dispatch!(self, get_template_content(name, project_path))
    }

    async fn save_template(
        &self,
        name: &str,
        content: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        dispatch!(self, save_template(name, content, scope, project_path))
    }

    async fn delete_template(
        &self,
        name: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        dispatch!(self, delete_template(name, scope, project_path))
    }

    async fn preview_template(
        &self,
        content: &str,
        project_path: Option<&str>,
    ) -> ApiResult<TemplatePreviewResult> {
        dispatch!(self, preview_template(content, project_path))
    }
}

impl AgentApi for Backend {
    async fn get_all_agents_status(&self) -> ApiResult<Vec<AgentStatusInfo>> {
        dispatch!(self, get_all_agents_status())
    }
}

impl ModelApi for Backend {
    async fn get_available_models(
        &self,
        agent_type: AgentType,
        provider_id: Option<&str>,
    ) -> ApiResult<Vec<ModelInfo>> {
        dispatch!(self, get_available_models(agent_type, provider_id))
    }

    async fn refresh_models(&self, agent_type: Option<AgentType>) -> ApiResult<()> {
        dispatch!(self, refresh_models(agent_type))
    }
}

impl ChatCommandApi for Backend {
    async fn list_chat_commands(
        &self,
        project_path: Option<&str>,
    ) -> ApiResult<Vec<ChatCommandConfig>> {
        dispatch!(self, list_chat_commands(project_path))
    }

    async fn create_chat_command(
        &self,
        request: &CreateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        dispatch!(self, create_chat_command(request, project_path))
    }

    async fn update_chat_command(
        &self,
        request: &UpdateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        dispatch!(self, update_chat_command(request, project_path))
    }

    async fn delete_chat_command(
        &self,
        id: &str,
        scope: ChatCommandScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        dispatch!(self, delete_chat_command(id, scope, project_path))
    }

    async fn reset_chat_command(
        &self,
        id: &str,
        scope: Option<ChatCommandScope>,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        dispatch!(self, reset_chat_command(id, scope, project_path))
    }
}
