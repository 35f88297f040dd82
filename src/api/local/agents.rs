// Agent CLI detection and model lists

use super::LocalBackend;
use crate::api::{AgentApi, ApiResult, ModelApi};
use crate::models::{AgentStatusInfo, AgentType, ModelInfo};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Provider presets with a fixed model list: (provider id, [(model, is_default)])
const PROVIDER_MODELS: &[(&str, &[(&str, bool)])] = &[
    ("zai", &[("GLM-4.7", true), ("GLM-4.5-Air", false)]),
    ("minimax", &[("MiniMax-M2.1", true)]),
    ("minimax-cn", &[("MiniMax-M2.1", true)]),
];

/// Models known for each agent when nothing better is available
pub fn builtin_models(agent_type: AgentType) -> Vec<ModelInfo> {
    match agent_type {
        AgentType::Claude => vec![
            ModelInfo::new("claude-sonnet-4-5", "Claude Sonnet 4.5", "anthropic", true),
            ModelInfo::new("claude-opus-4-5", "Claude Opus 4.5", "anthropic", false),
            ModelInfo::new("claude-haiku-4-5", "Claude Haiku 4.5", "anthropic", false),
        ],
        AgentType::Opencode => vec![
            ModelInfo::new(
                "anthropic/claude-sonnet-4-5",
                "Claude Sonnet 4.5",
                "anthropic",
                true,
            ),
            ModelInfo::new("anthropic/claude-opus-4-5", "Claude Opus 4.5", "anthropic", false),
            ModelInfo::new("openai/gpt-4o", "GPT-4o", "openai", false),
        ],
        AgentType::Cursor | AgentType::Droid => vec![
            ModelInfo::new("claude-sonnet-4-5", "Claude Sonnet 4.5", "anthropic", true),
            ModelInfo::new("gpt-4o", "GPT-4o", "openai", false),
        ],
        AgentType::Codex => vec![
            ModelInfo::new("gpt-5.2-codex", "GPT-5.2 Codex", "openai", true),
            ModelInfo::new("gpt-5.1-codex-mini", "GPT-5.1 Codex Mini", "openai", false),
        ],
        AgentType::Qwen => vec![
            ModelInfo::new("qwen-2.5-coder", "Qwen 2.5 Coder", "qwen", true),
            ModelInfo::new("qwen-2.5", "Qwen 2.5", "qwen", false),
        ],
        AgentType::Gemini => vec![
            ModelInfo::new("gemini-2.5-pro", "Gemini 2.5 Pro", "google", true),
            ModelInfo::new("gemini-2.5-flash", "Gemini 2.5 Flash", "google", false),
        ],
    }
}

/// Fixed model list for an alternative API provider, `None` when the
/// provider has no preset (including "anthropic")
pub fn provider_models(provider_id: &str) -> Option<Vec<ModelInfo>> {
    let (_, models) = PROVIDER_MODELS.iter().find(|(id, _)| *id == provider_id)?;
    Some(
        models
            .iter()
            .map(|(name, is_default)| ModelInfo::new(name, name, provider_id, *is_default))
            .collect(),
    )
}

/// Per-agent model lists, filled on first request
pub struct ModelCache {
    entries: RwLock<HashMap<AgentType, Vec<ModelInfo>>>,
    fetches: AtomicUsize,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Cached list for `agent_type`, computing it on a miss
    pub fn get_or_fetch(&self, agent_type: AgentType) -> Vec<ModelInfo> {
        if let Ok(entries) = self.entries.read() {
            if let Some(models) = entries.get(&agent_type) {
                return models.clone();
            }
        }

        let models = builtin_models(agent_type);
        self.fetches.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "[ModelCache::get_or_fetch] Cached {} models for {}",
            models.len(),
            agent_type
        );

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(agent_type, models.clone());
        }
        models
    }

    /// Drop one agent's entry, or all of them
    pub fn invalidate(&self, agent_type: Option<AgentType>) {
        if let Ok(mut entries) = self.entries.write() {
            match agent_type {
                Some(agent) => {
                    entries.remove(&agent);
                }
                None => entries.clear(),
            }
        }
    }

    /// Number of cache misses so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    fn is_agent_installed(&self, agent_type: AgentType) -> bool {
        let program = agent_type.cli_command();
        let cwd = std::env::current_dir().unwrap_or_default();
        let found = match &self.agent_search_path {
            Some(paths) => which::which_in(program, Some(paths), cwd),
            None => which::which(program),
        };
        match found {
            Ok(path) => {
                log::debug!("[LocalBackend] Found {} at {:?}", program, path);
                true
            }
            Err(_) => false,
        }
    }
}

impl AgentApi for LocalBackend {
    async fn get_all_agents_status(&self) -> ApiResult<Vec<AgentStatusInfo>> {
        Ok(AgentType::all()
            .iter()
            .map(|agent| AgentStatusInfo {
                agent_type: *agent,
                display_name: agent.display_name().to_string(),
                cli_command: agent.cli_command().to_string(),
                available: self.is_agent_installed(*agent),
                install_hint: agent.install_hint().to_string(),
            })
            .collect())
    }
}

impl ModelApi for LocalBackend {
    async fn get_available_models(
        &self,
        agent_type: AgentType,
        provider_id: Option<&str>,
    ) -> ApiResult<Vec<ModelInfo>> {
        log::info!(
            "[get_available_models] Getting models for {}, provider: {:?}",
            agent_type,
            provider_id
        );

        if agent_type == AgentType::Claude {
            if let Some(models) = provider_id.and_then(provider_models) {
                return Ok(models);
            }
        }
        Ok(self.model_cache.get_or_fetch(agent_type))
    }

    async fn refresh_models(&self, agent_type: Option<AgentType>) -> ApiResult<()> {
        log::info!("[refresh_models] Refreshing models for {:?}", agent_type);
        self.model_cache.invalidate(agent_type);
        Ok(())
    }
}
