//! Client for the Ralph server command proxy (`POST /api/invoke`)

use super::{
    AgentApi, ApiError, ApiResult, ChatCommandApi, ConfigApi, ModelApi, TemplateApi,
};
use crate::config::{
    PartialExecutionConfig, PartialFallbackSettings, PartialGitConfig, PartialTemplateConfig,
    PartialValidationConfig, RalphConfig,
};
use crate::models::{
    AgentStatusInfo, AgentType, ChatCommandConfig, ChatCommandScope, ChatCommandsResponse,
    CreateChatCommandRequest, ModelInfo, TemplateInfo, TemplatePreviewResult, TemplateScope,
    UpdateChatCommandRequest,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Request body for /api/invoke
#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    cmd: &'a str,
    args: Value,
}

/// Response envelope returned by /api/invoke
#[derive(Debug, Deserialize)]
struct InvokeResponse {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Remote backend reached over HTTP
#[derive(Debug, Clone)]
pub struct InvokeClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    project_path: Option<String>,
}

impl InvokeClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            project_path: None,
        }
    }

    /// Project used for chat-command calls that take no explicit path
    pub fn with_project_path(mut self, project_path: Option<String>) -> Self {
        self.project_path = project_path;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/invoke", self.base_url)
    }

    /// Run one command and return its raw `data` payload
    pub async fn invoke(&self, cmd: &str, args: Value) -> ApiResult<Value> {
        log::debug!("[InvokeClient::invoke] {} {}", cmd, args);

        let mut request = self
            .http
            .post(self.endpoint())
            .json(&InvokeRequest { cmd, args });
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_envelope(cmd, status.as_u16(), &body)
    }

    async fn call<T: DeserializeOwned>(&self, cmd: &str, args: Value) -> ApiResult<T> {
        let data = self.invoke(cmd, args).await?;
        serde_json::from_value(data).map_err(|e| ApiError::Decode {
            cmd: cmd.to_string(),
            message: e.to_string(),
        })
    }

    async fn call_unit(&self, cmd: &str, args: Value) -> ApiResult<()> {
        self.invoke(cmd, args).await.map(|_| ())
    }

    fn project_arg<'a>(&'a self, project_path: Option<&'a str>) -> Option<&'a str> {
        project_path.or(self.project_path.as_deref())
    }
}

/// Turn a raw HTTP response into the command payload
fn decode_envelope(cmd: &str, status: u16, body: &str) -> ApiResult<Value> {
    let envelope: InvokeResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => {
            return Err(ApiError::Decode {
                cmd: cmd.to_string(),
                message: e.to_string(),
            })
        }
        Err(_) => {
            return Err(ApiError::Transport(format!(
                "Server returned HTTP {}: {}",
                status,
                body.trim()
            )))
        }
    };

    if !envelope.success || !(200..300).contains(&status) {
        let message = envelope
            .error
            .unwrap_or_else(|| format!("Command '{}' failed with HTTP {}", cmd, status));
        log::warn!("[InvokeClient::invoke] {} failed: {}", cmd, message);
        return Err(ApiError::Command(message));
    }

    Ok(envelope.data.unwrap_or(Value::Null))
}

/// Serialize a partial update into an args object
fn to_args<T: Serialize>(cmd: &str, value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode {
        cmd: cmd.to_string(),
        message: e.to_string(),
    })
}

/// Add `projectPath` to an args object when a project is set
fn with_project(mut args: Value, project_path: Option<&str>) -> Value {
    if let (Some(path), Some(map)) = (project_path, args.as_object_mut()) {
        map.insert("projectPath".to_string(), Value::String(path.to_string()));
    }
    args
}

impl ConfigApi for InvokeClient {
    async fn get_config(&self) -> ApiResult<RalphConfig> {
        self.call("get_config", json!({})).await
    }

    async fn update_execution(&self, partial: &PartialExecutionConfig) -> ApiResult<()> {
        let mut args = to_args("update_execution_config", partial)?;
        // The provider has its own command on the server
        if let Some(map) = args.as_object_mut() {
            map.remove("apiProvider");
        }
        self.call_unit("update_execution_config", args).await?;

        if let Some(ref provider) = partial.api_provider {
            self.call_unit("update_api_provider", json!({ "apiProvider": provider }))
                .await?;
        }
        Ok(())
    }

    async fn update_git(&self, partial: &PartialGitConfig) -> ApiResult<()> {
        let args = to_args("update_git_config", partial)?;
        self.call_unit("update_git_config", args).await
    }

    async fn update_validation(&self, partial: &PartialValidationConfig) -> ApiResult<()> {
        let args = to_args("update_validation_config", partial)?;
        self.call_unit("update_validation_config", args).await
    }

    async fn update_fallback(&self, partial: &PartialFallbackSettings) -> ApiResult<()> {
        let args = to_args("update_fallback_config", partial)?;
        self.call_unit("update_fallback_config", args).await
    }

    /// The server keeps template settings read-only, so an edit is reported
    /// instead of being dropped on save
    async fn update_templates(&self, _partial: &PartialTemplateConfig) -> ApiResult<()> {
        log::warn!("[InvokeClient::update_templates] Not supported by the Ralph server");
        Err(ApiError::Command(
            "Template settings cannot be changed through the Ralph server".to_string(),
        ))
    }

    async fn save_config(&self) -> ApiResult<()> {
        self.call_unit("save_config", json!({})).await
    }

    async fn reload_config(&self) -> ApiResult<RalphConfig> {
        self.call("reload_config", json!({})).await
    }
}

impl TemplateApi for InvokeClient {
    async fn list_templates(&self, project_path: Option<&str>) -> ApiResult<Vec<TemplateInfo>> {
        self.call(
            "list_templates",
            with_project(json!({}), self.project_arg(project_path)),
        )
        .await
    }

    async fn get_template_content(
        &self,
        name: &str,
        project_path: Option<&str>,
    ) -> ApiResult<String> {
        self.call(
            "get_template_content",
            with_project(json!({ "name": name }), self.project_arg(project_path)),
        )
        .await
    }

    async fn save_template(
        &self,
        name: &str,
        content: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        let args = json!({ "name": name, "content": content, "scope": scope.as_str() });
        self.call_unit(
            "save_template",
            with_project(args, self.project_arg(project_path)),
        )
        .await
    }

    async fn delete_template(
        &self,
        name: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        let args = json!({ "name": name, "scope": scope.as_str() });
        self.call_unit(
            "delete_template",
            with_project(args, self.project_arg(project_path)),
        )
        .await
    }

    async fn preview_template(
        &self,
        content: &str,
        project_path: Option<&str>,
    ) -> ApiResult<TemplatePreviewResult> {
        self.call(
            "preview_template",
            with_project(json!({ "content": content }), self.project_arg(project_path)),
        )
        .await
    }
}

impl AgentApi for InvokeClient {
    async fn get_all_agents_status(&self) -> ApiResult<Vec<AgentStatusInfo>> {
        self.call("get_all_agents_status", json!({})).await
    }
}

impl ModelApi for InvokeClient {
    async fn get_available_models(
        &self,
        agent_type: AgentType,
        provider_id: Option<&str>,
    ) -> ApiResult<Vec<ModelInfo>> {
        let mut args = Map::new();
        args.insert("agentType".to_string(), json!(agent_type));
        if let Some(provider) = provider_id {
            args.insert("providerId".to_string(), json!(provider));
        }
        self.call("get_available_models", Value::Object(args)).await
    }

    async fn refresh_models(&self, agent_type: Option<AgentType>) -> ApiResult<()> {
        let args = match agent_type {
            Some(agent) => json!({ "agentType": agent }),
            None => json!({}),
        };
        self.call_unit("refresh_models", args).await
    }
}

impl ChatCommandApi for InvokeClient {
    async fn list_chat_commands(
        &self,
        project_path: Option<&str>,
    ) -> ApiResult<Vec<ChatCommandConfig>> {
        let response: ChatCommandsResponse = self
            .call(
                "list_chat_commands",
                with_project(json!({}), self.project_arg(project_path)),
            )
            .await?;
        Ok(response.commands)
    }

    async fn create_chat_command(
        &self,
        request: &CreateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        let args = to_args("create_chat_command", request)?;
        self.call_unit(
            "create_chat_command",
            with_project(args, self.project_arg(project_path)),
        )
        .await
    }

    async fn update_chat_command(
        &self,
        request: &UpdateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        let args = to_args("update_chat_command", request)?;
        self.call_unit(
            "update_chat_command",
            with_project(args, self.project_arg(project_path)),
        )
        .await
    }

    async fn delete_chat_command(
        &self,
        id: &str,
        scope: ChatCommandScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        self.call_unit(
            "delete_chat_command",
            with_project(
                json!({ "id": id, "scope": scope }),
                self.project_arg(project_path),
            ),
        )
        .await
    }

    async fn reset_chat_command(
        &self,
        id: &str,
        scope: Option<ChatCommandScope>,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        let mut args = json!({ "id": id });
        if let (Some(scope), Some(map)) = (scope, args.as_object_mut()) {
            map.insert("scope".to_string(), json!(scope));
        }
        self.call_unit(
            "reset_chat_command",
            with_project(args, self.project_arg(project_path)),
        )
        .await
    }
}
