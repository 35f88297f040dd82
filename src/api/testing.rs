//! Recording in-memory backend for store tests
//!
//! Clones share state, so a test can hand one clone to a store and inspect
//! calls through another.

use super::{AgentApi, ApiError, ApiResult, ChatCommandApi, ConfigApi, ModelApi, TemplateApi};
use crate::api::local::builtin_models;
use crate::config::{
    PartialExecutionConfig, PartialFallbackSettings, PartialGitConfig, PartialTemplateConfig,
    PartialValidationConfig, RalphConfig,
};
use crate::models::{
    AgentStatusInfo, AgentType, ChatCommandConfig, ChatCommandScope, CreateChatCommandRequest,
    ModelInfo, TemplateInfo, TemplatePreviewResult, TemplateScope, UpdateChatCommandRequest,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
pub struct MockState {
    /// Backend working copy, changed by update calls
    pub config: RalphConfig,
    /// Durable copy, written by save and returned by reload
    pub persisted: RalphConfig,
    pub calls: Vec<String>,
    pub failing: HashSet<String>,
    pub templates: HashMap<(String, TemplateScope), String>,
    pub preview: Option<TemplatePreviewResult>,
    pub agents: Vec<AgentStatusInfo>,
    pub models: HashMap<AgentType, Vec<ModelInfo>>,
    pub commands: Vec<ChatCommandConfig>,
    pub created: Vec<CreateChatCommandRequest>,
    pub updated: Vec<UpdateChatCommandRequest>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RalphConfig) -> Self {
        let mock = Self::new();
        {
            let mut state = mock.state();
            state.config = config.clone();
            state.persisted = config;
        }
        mock
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every later call to `cmd` fail
    pub fn fail_on(&self, cmd: &str) {
        self.state().failing.insert(cmd.to_string());
    }

    pub fn recover(&self, cmd: &str) {
        self.state().failing.remove(cmd);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, cmd: &str) -> usize {
        self.state().calls.iter().filter(|c| *c == cmd).count()
    }

    fn record(&self, cmd: &str) -> ApiResult<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.calls.push(cmd.to_string());
        if state.failing.contains(cmd) {
            return Err(ApiError::Command(format!("{} failed", cmd)));
        }
        Ok(state)
    }
}

impl ConfigApi for MockBackend {
    async fn get_config(&self) -> ApiResult<RalphConfig> {
        Ok(self.record("get_config")?.config.clone())
    }

    async fn update_execution(&self, partial: &PartialExecutionConfig) -> ApiResult<()> {
        let mut state = self.record("update_execution_config")?;
        state.config.execution = partial.apply_to(&state.config.execution);
        Ok(())
    }

    async fn update_git(&self, partial: &PartialGitConfig) -> ApiResult<()> {
        let mut state = self.record("update_git_config")?;
        state.config.git = partial.apply_to(&state.config.git);
        Ok(())
    }

    async fn update_validation(&self, partial: &PartialValidationConfig) -> ApiResult<()> {
        let mut state = self.record("update_validation_config")?;
        state.config.validation = partial.apply_to(&state.config.validation);
        Ok(())
    }

    async fn update_fallback(&self, partial: &PartialFallbackSettings) -> ApiResult<()> {
        let mut state = self.record("update_fallback_config")?;
        state.config.fallback = partial.apply_to(&state.config.fallback);
        Ok(())
    }

    async fn update_templates(&self, partial: &PartialTemplateConfig) -> ApiResult<()> {
        let mut state = self.record("update_templates_config")?;
        state.config.templates = partial.apply_to(&state.config.templates);
        Ok(())
    }

    async fn save_config(&self) -> ApiResult<()> {
        let mut state = self.record("save_config")?;
        state.persisted = state.config.clone();
        Ok(())
    }

    async fn reload_config(&self) -> ApiResult<RalphConfig> {
        let mut state = self.record("reload_config")?;
        state.config = state.persisted.clone();
        Ok(state.config.clone())
    }
}

impl TemplateApi for MockBackend {
    async fn list_templates(&self, _project_path: Option<&str>) -> ApiResult<Vec<TemplateInfo>> {
        let state = self.record("list_templates")?;
        // One entry per name: project over global over builtin
        let rank = |scope: TemplateScope| match scope {
            TemplateScope::Project => 0,
            TemplateScope::Global => 1,
            TemplateScope::Builtin => 2,
        };
        let mut winners: HashMap<&str, TemplateScope> = HashMap::new();
        for (name, source) in state.templates.keys() {
            let entry = winners.entry(name.as_str()).or_insert(*source);
            if rank(*source) < rank(*entry) {
                *entry = *source;
            }
        }

        let mut list: Vec<TemplateInfo> = winners
            .into_iter()
            .map(|(name, source)| TemplateInfo {
                name: name.to_string(),
                source,
                description: String::new(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn get_template_content(
        &self,
        name: &str,
        _project_path: Option<&str>,
    ) -> ApiResult<String> {
        let state = self.record("get_template_content")?;
        [TemplateScope::Project, TemplateScope::Global, TemplateScope::Builtin]
            .iter()
            .find_map(|scope| state.templates.get(&(name.to_string(), *scope)).cloned())
            .ok_or_else(|| ApiError::Command(format!("Template '{}' not found", name)))
    }

    async fn save_template(
        &self,
        name: &str,
        content: &str,
        scope: TemplateScope,
        _project_path: Option<&str>,
    ) -> ApiResult<()> {
        let mut state = self.record("save_template")?;
        state
            .templates
            .insert((name.to_string(), scope), content.to_string());
        Ok(())
    }

    async fn delete_template(
        &self,
        name: &str,
        scope: TemplateScope,
        _project_path: Option<&str>,
    ) -> ApiResult<()> {
        let mut state = self.record("delete_template")?;
        state
            .templates
            .remove(&(name.to_string(), scope))
            .map(|_| ())
            .ok_or_else(|| ApiError::Command(format!("Template '{}' not found", name)))
    }

    async fn preview_template(
        &self,
        content: &str,
        _project_path: Option<&str>,
    ) -> ApiResult<TemplatePreviewResult> {
        let state = self.record("preview_template")?;
        Ok(state
            .preview
            .clone()
            .unwrap_or_else(|| crate::templates::preview(content)))
    }
}

impl AgentApi for MockBackend {
    async fn get_all_agents_status(&self) -> ApiResult<Vec<AgentStatusInfo>> {
        Ok(self.record("get_all_agents_status")?.agents.clone())
    }
}

impl ModelApi for MockBackend {
    async fn get_available_models(
        &self,
        agent_type: AgentType,
        _provider_id: Option<&str>,
    ) -> ApiResult<Vec<ModelInfo>> {
        let state = self.record("get_available_models")?;
        Ok(state
            .models
            .get(&agent_type)
            .cloned()
            .unwrap_or_else(|| builtin_models(agent_type)))
    }

    async fn refresh_models(&self, _agent_type: Option<AgentType>) -> ApiResult<()> {
        self.record("refresh_models").map(|_| ())
    }
}

impl ChatCommandApi for MockBackend {
    async fn list_chat_commands(
        &self,
        _project_path: Option<&str>,
    ) -> ApiResult<Vec<ChatCommandConfig>> {
        Ok(self.record("list_chat_commands")?.commands.clone())
    }

    async fn create_chat_command(
        &self,
        request: &CreateChatCommandRequest,
        _project_path: Option<&str>,
    ) -> ApiResult<()> {
        let mut state = self.record("create_chat_command")?;
        let mut command = ChatCommandConfig::new(
            request.id.clone(),
            request.label.clone(),
            request.description.clone(),
            request.template.clone(),
        );
        command.scope = request.scope;
        state.commands.push(command);
        state.created.push(request.clone());
        Ok(())
    }

    async fn update_chat_command(
        &self,
        request: &UpdateChatCommandRequest,
        _project_path: Option<&str>,
    ) -> ApiResult<()> {
        let mut state = self.record("update_chat_command")?;
        let pref = request.preference();
        if let Some(cmd) = state.commands.iter_mut().find(|c| c.id == request.id) {
            cmd.apply_preference(&pref);
        }
        state.updated.push(request.clone());
        Ok(())
    }

    async fn delete_chat_command(
        &self,
        id: &str,
        _scope: ChatCommandScope,
        _project_path: Option<&str>,
    ) -> ApiResult<()> {
        let mut state = self.record("delete_chat_command")?;
        state.commands.retain(|c| c.id != id);
        Ok(())
    }

    async fn reset_chat_command(
        &self,
        id: &str,
        _scope: Option<ChatCommandScope>,
        _project_path: Option<&str>,
    ) -> ApiResult<()> {
        let mut state = self.record("reset_chat_command")?;
        if let Some(cmd) = state.commands.iter_mut().find(|c| c.id == id) {
            cmd.enabled = true;
            cmd.favorite = false;
        }
        Ok(())
    }
}
