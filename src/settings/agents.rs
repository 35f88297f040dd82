//! Agent availability and model list state
//!
//! [`ModelListLoader`] hands out a ticket for every fetch it starts. A result
//! is only applied when its ticket is still the newest and the loader was not
//! cancelled, so a slow answer for a previously selected agent never
//! overwrites the current list.

use crate::api::{AgentApi, ApiResult, ModelApi};
use crate::models::{AgentStatusInfo, AgentType, ModelInfo};

pub struct AgentStatusStore<B> {
    backend: B,
    statuses: Vec<AgentStatusInfo>,
    loading: bool,
    error: Option<String>,
}

impl<B: AgentApi> AgentStatusStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            statuses: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn statuses(&self) -> &[AgentStatusInfo] {
        &self.statuses
    }

    pub fn available(&self) -> impl Iterator<Item = &AgentStatusInfo> {
        self.statuses.iter().filter(|s| s.available)
    }

    pub fn find(&self, agent_type: AgentType) -> Option<&AgentStatusInfo> {
        self.statuses.iter().find(|s| s.agent_type == agent_type)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;
        match self.backend.get_all_agents_status().await {
            Ok(statuses) => self.statuses = statuses,
            Err(e) => {
                log::warn!("[AgentStatusStore::load] {}", e);
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }
}

/// Identifies one model list fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    pub agent_type: AgentType,
}

#[derive(Debug, Default)]
pub struct ModelListLoader {
    models: Vec<ModelInfo>,
    agent_type: Option<AgentType>,
    generation: u64,
    pending: Option<u64>,
    cancelled: bool,
    error: Option<String>,
}

impl ModelListLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Agent the current list belongs to
    pub fn agent_type(&self) -> Option<AgentType> {
        self.agent_type
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a fetch, superseding any in flight
    pub fn begin(&mut self, agent_type: AgentType) -> LoadTicket {
        self.generation += 1;
        self.pending = Some(self.generation);
        self.cancelled = false;
        LoadTicket {
            generation: self.generation,
            agent_type,
        }
    }

    /// Apply the result of `ticket`'s fetch. Returns `false` when the result
    /// was stale or the loader was cancelled and nothing changed.
    pub fn finish(&mut self, ticket: LoadTicket, result: ApiResult<Vec<ModelInfo>>) -> bool {
        if self.cancelled || self.pending != Some(ticket.generation) {
            log::debug!(
                "[ModelListLoader::finish] Dropping stale models for {}",
                ticket.agent_type
            );
            return false;
        }

        self.pending = None;
        match result {
            Ok(models) => {
                self.models = models;
                self.agent_type = Some(ticket.agent_type);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    /// Ignore every outstanding result
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.pending = None;
    }

    pub async fn load<B: ModelApi>(
        &mut self,
        backend: &B,
        agent_type: AgentType,
        provider_id: Option<&str>,
    ) -> bool {
        let ticket = self.begin(agent_type);
        let result = backend.get_available_models(agent_type, provider_id).await;
        self.finish(ticket, result)
    }

    /// Invalidate the backend cache for `agent_type`, then fetch again
    pub async fn refresh<B: ModelApi>(
        &mut self,
        backend: &B,
        agent_type: AgentType,
        provider_id: Option<&str>,
    ) -> bool {
        if let Err(e) = backend.refresh_models(Some(agent_type)).await {
            self.error = Some(e.to_string());
            return false;
        }
        self.load(backend, agent_type, provider_id).await
    }

    /// Model to show as selected: `current` when listed, else the default,
    /// else the first model
    pub fn resolve_selection(&self, current: Option<&str>) -> Option<String> {
        current
            .and_then(|id| self.models.iter().find(|m| m.id == id))
            .or_else(|| self.models.iter().find(|m| m.is_default))
            .or_else(|| self.models.first())
            .map(|m| m.id.clone())
    }
}
