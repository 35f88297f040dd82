//! Configuration state container and persistence bridge
//!
//! Holds the in-memory configuration record, merges section-level partial
//! updates into it and tracks unsaved changes. `save` pushes every backend
//! section, commits, then writes local preferences to client storage.
//!
//! Failures never propagate out of `load`, `save`, `reload` or `reset`; the
//! message lands in [`ConfigStore::error`] and the store stays usable.

use super::error_strategy::{ErrorStrategyEditor, ErrorStrategyKind};
use super::fallback_chain::FallbackChain;
use super::preferences::{PartialLocalPreferences, PreferenceStore};
use crate::api::ConfigApi;
use crate::config::{
    PartialExecutionConfig, PartialFallbackSettings, PartialGitConfig, PartialTemplateConfig,
    PartialValidationConfig, RalphConfig, SliderControl,
};

pub struct ConfigStore<B> {
    backend: B,
    config: Option<RalphConfig>,
    preferences: PreferenceStore,
    error_strategy: ErrorStrategyEditor,
    has_changes: bool,
    templates_changed: bool,
    loading: bool,
    saving: bool,
    error: Option<String>,
}

impl<B: ConfigApi> ConfigStore<B> {
    pub fn new(backend: B, preferences: PreferenceStore) -> Self {
        Self {
            backend,
            config: None,
            preferences,
            error_strategy: ErrorStrategyEditor::new(),
            has_changes: false,
            templates_changed: false,
            loading: false,
            saving: false,
            error: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> Option<&RalphConfig> {
        self.config.as_ref()
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Apply `f` to the loaded record and mark it dirty. No-op before the
    /// first successful load.
    fn edit(&mut self, f: impl FnOnce(&mut RalphConfig)) {
        if let Some(config) = self.config.as_mut() {
            f(config);
            self.has_changes = true;
        }
    }

    pub fn update_execution(&mut self, partial: &PartialExecutionConfig) {
        self.edit(|config| config.execution = partial.apply_to(&config.execution));
    }

    pub fn update_git(&mut self, partial: &PartialGitConfig) {
        self.edit(|config| config.git = partial.apply_to(&config.git));
    }

    pub fn update_validation(&mut self, partial: &PartialValidationConfig) {
        self.edit(|config| config.validation = partial.apply_to(&config.validation));
    }

    pub fn update_fallback(&mut self, partial: &PartialFallbackSettings) {
        self.edit(|config| config.fallback = partial.apply_to(&config.fallback));
    }

    /// Template settings are only pushed by `save` once edited here
    pub fn update_templates(&mut self, partial: &PartialTemplateConfig) {
        self.edit(|config| config.templates = partial.apply_to(&config.templates));
        if self.config.is_some() {
            self.templates_changed = true;
        }
    }

    pub fn update_local(&mut self, partial: &PartialLocalPreferences) {
        self.preferences.update_local(partial);
        self.has_changes = true;
    }

    pub fn max_parallel_control(&self) -> Option<SliderControl> {
        self.config
            .as_ref()
            .map(|config| config.execution.max_parallel_control())
    }

    /// Effective fallback chain of the loaded record
    pub fn fallback_chain(&self) -> Option<FallbackChain> {
        self.config.as_ref().map(|config| {
            FallbackChain::from_settings(&config.fallback, &config.execution.agent_type)
        })
    }

    pub fn select_error_strategy(&mut self, kind: ErrorStrategyKind) {
        let strategy = self.error_strategy.select(kind);
        self.set_error_strategy(strategy);
    }

    /// Remembered for the retry option; the stored strategy only changes
    /// while retry is selected
    pub fn set_retry_attempts(&mut self, max_attempts: u32) {
        self.error_strategy.set_max_attempts(max_attempts);
        self.sync_retry_values();
    }

    pub fn set_retry_backoff_ms(&mut self, backoff_ms: u64) {
        self.error_strategy.set_backoff_ms(backoff_ms);
        self.sync_retry_values();
    }

    fn sync_retry_values(&mut self) {
        let current = match self.config.as_ref() {
            Some(config) => config.fallback.effective_error_strategy(),
            None => return,
        };
        if let Some(strategy) = self.error_strategy.apply_to(&current) {
            self.set_error_strategy(strategy);
        }
    }

    fn set_error_strategy(&mut self, strategy: crate::config::ErrorStrategyConfig) {
        self.update_fallback(&PartialFallbackSettings {
            error_strategy: Some(strategy),
            ..Default::default()
        });
    }

    /// Fetch the record. On failure the previous record is kept.
    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;

        match self.backend.get_config().await {
            Ok(config) => {
                log::info!("[ConfigStore::load] Loaded configuration");
                self.accept(config);
            }
            Err(e) => {
                log::warn!("[ConfigStore::load] {}", e);
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    fn accept(&mut self, config: RalphConfig) {
        if let Some(strategy) = config.fallback.error_strategy {
            self.error_strategy.observe(&strategy);
        }
        self.config = Some(config);
        self.has_changes = false;
        self.templates_changed = false;
    }

    /// Push every backend section, commit, then persist local preferences
    pub async fn save(&mut self) {
        let Some(config) = self.config.clone() else {
            self.error = Some("No configuration loaded".to_string());
            return;
        };

        self.saving = true;
        self.error = None;

        match self.push(&config).await {
            Ok(()) => {
                log::info!("[ConfigStore::save] Configuration saved");
                self.has_changes = false;
                self.templates_changed = false;
            }
            Err(e) => {
                log::warn!("[ConfigStore::save] {}", e);
                self.error = Some(e);
            }
        }

        self.saving = false;
    }

    async fn push(&mut self, config: &RalphConfig) -> Result<(), String> {
        let stringify = |e: crate::api::ApiError| e.to_string();

        self.backend
            .update_execution(&PartialExecutionConfig::from_section(&config.execution))
            .await
            .map_err(stringify)?;
        self.backend
            .update_git(&PartialGitConfig::from_section(&config.git))
            .await
            .map_err(stringify)?;
        self.backend
            .update_validation(&PartialValidationConfig::from_section(&config.validation))
            .await
            .map_err(stringify)?;
        self.backend
            .update_fallback(&PartialFallbackSettings::from_section(&config.fallback))
            .await
            .map_err(stringify)?;
        if self.templates_changed {
            self.backend
                .update_templates(&PartialTemplateConfig::from_section(&config.templates))
                .await
                .map_err(stringify)?;
        }
        self.backend.save_config().await.map_err(stringify)?;

        self.preferences
            .persist()
            .map_err(|e| format!("Failed to save local preferences: {}", e))
    }

    /// Discard local edits and take the backend's durable record
    pub async fn reload(&mut self) {
        self.loading = true;
        self.error = None;

        match self.backend.reload_config().await {
            Ok(config) => {
                log::info!("[ConfigStore::reload] Reloaded configuration");
                self.accept(config);
            }
            Err(e) => {
                log::warn!("[ConfigStore::reload] {}", e);
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    /// Local preferences back to defaults, record fetched again
    pub async fn reset(&mut self) {
        self.preferences.reset_to_defaults();
        self.load().await;
        self.has_changes = true;
    }
}
