//! Fallback agent chain editing
//!
//! Index 0 is the primary agent. Edits produce a new chain; callers write
//! it back with [`FallbackChain::to_partial`] through `ConfigStore::update_fallback`.

use crate::config::{FallbackSettings, PartialFallbackSettings};
use crate::models::AgentType;
use crate::reorder::{self, ReorderPolicy};

const POLICY: ReorderPolicy = ReorderPolicy::FALLBACK_CHAIN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    agents: Vec<String>,
}

impl FallbackChain {
    /// Effective chain of `settings`, falling back to the primary agent
    pub fn from_settings(settings: &FallbackSettings, primary_agent: &str) -> Self {
        Self {
            agents: settings.effective_chain(primary_agent),
        }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn primary(&self) -> Option<&str> {
        self.agents.first().map(String::as_str)
    }

    pub fn can_move_up(&self, index: usize) -> bool {
        reorder::can_move_up(self.agents.len(), index)
    }

    pub fn can_move_down(&self, index: usize) -> bool {
        reorder::can_move_down(self.agents.len(), index)
    }

    pub fn can_remove(&self, index: usize) -> bool {
        POLICY.can_remove(self.agents.len(), index)
    }

    pub fn move_up(&self, index: usize) -> Self {
        Self {
            agents: reorder::move_up(&self.agents, index),
        }
    }

    pub fn move_down(&self, index: usize) -> Self {
        Self {
            agents: reorder::move_down(&self.agents, index),
        }
    }

    pub fn remove(&self, index: usize) -> Self {
        Self {
            agents: POLICY.remove(&self.agents, index),
        }
    }

    pub fn append(&self, agent: &str) -> Self {
        Self {
            agents: POLICY.append(&self.agents, agent.to_string(), String::clone),
        }
    }

    /// Known agents not yet in the chain
    pub fn addable(&self) -> Vec<String> {
        let catalog: Vec<String> = AgentType::all()
            .iter()
            .map(|agent| agent.as_str().to_string())
            .collect();
        reorder::addable(&self.agents, &catalog, String::clone)
    }

    pub fn to_partial(&self) -> PartialFallbackSettings {
        PartialFallbackSettings {
            fallback_chain: Some(self.agents.clone()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_chain(chain: &[&str]) -> FallbackSettings {
        FallbackSettings {
            fallback_chain: Some(chain.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_chain_defaults_to_primary_and_legacy_agent() {
        let settings = FallbackSettings {
            fallback_agent: Some("opencode".to_string()),
            ..Default::default()
        };
        let chain = FallbackChain::from_settings(&settings, "claude");
        assert_eq!(chain.agents(), ["claude", "opencode"]);
        assert_eq!(chain.primary(), Some("claude"));
    }

    #[test]
    fn test_empty_stored_chain_is_replaced() {
        let chain = FallbackChain::from_settings(&settings_with_chain(&[]), "codex");
        assert_eq!(chain.agents(), ["codex"]);
    }

    #[test]
    fn test_primary_cannot_be_removed_from_single_chain() {
        let chain = FallbackChain::from_settings(&settings_with_chain(&["claude"]), "claude");
        assert!(!chain.can_remove(0));
        assert_eq!(chain.remove(0), chain);
    }

    #[test]
    fn test_append_and_addable() {
        let chain = FallbackChain::from_settings(&settings_with_chain(&["claude", "codex"]), "claude");
        assert!(!chain.addable().contains(&"codex".to_string()));
        assert!(chain.addable().contains(&"gemini".to_string()));

        let grown = chain.append("gemini");
        assert_eq!(grown.agents(), ["claude", "codex", "gemini"]);
        assert_eq!(grown.append("codex"), grown);
    }

    #[test]
    fn test_reordering_changes_primary() {
        let chain = FallbackChain::from_settings(&settings_with_chain(&["claude", "codex"]), "claude");
        let swapped = chain.move_down(0);
        assert_eq!(swapped.primary(), Some("codex"));
        assert_eq!(swapped.move_up(1), chain);
    }

    #[test]
    fn test_to_partial_only_sets_chain() {
        let chain = FallbackChain::from_settings(&settings_with_chain(&["claude", "qwen"]), "claude");
        let partial = chain.to_partial();
        assert_eq!(
            partial.fallback_chain,
            Some(vec!["claude".to_string(), "qwen".to_string()])
        );
        assert!(partial.enabled.is_none());
        assert!(partial.error_strategy.is_none());
    }
}
