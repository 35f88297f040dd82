// Configuration commands against config.toml

use super::LocalBackend;
use crate::api::{ApiError, ApiResult, ConfigApi};
use crate::config::{
    load_merged_config, PartialExecutionConfig, PartialFallbackSettings, PartialGitConfig,
    PartialTemplateConfig, PartialValidationConfig, RalphConfig,
};

/// Provider id that means "no alternative provider"
const DEFAULT_API_PROVIDER: &str = "anthropic";

impl LocalBackend {
    fn load_from_disk(&self) -> ApiResult<RalphConfig> {
        load_merged_config(&self.loader).map_err(|e| {
            log::warn!("[LocalBackend::load_from_disk] {:#}", e);
            ApiError::Storage(format!("{:#}", e))
        })
    }

    /// Run `f` on the in-memory config, loading it from disk on first use
    fn with_config<T>(&self, f: impl FnOnce(&mut RalphConfig) -> T) -> ApiResult<T> {
        let mut guard = self
            .config
            .write()
            .map_err(|e| ApiError::Storage(format!("Failed to acquire lock: {}", e)))?;

        if guard.is_none() {
            *guard = Some(self.load_from_disk()?);
        }

        match guard.as_mut() {
            Some(config) => Ok(f(config)),
            None => Err(ApiError::Storage("Configuration not loaded".to_string())),
        }
    }
}

impl ConfigApi for LocalBackend {
    async fn get_config(&self) -> ApiResult<RalphConfig> {
        self.with_config(|config| config.clone())
    }

    async fn update_execution(&self, partial: &PartialExecutionConfig) -> ApiResult<()> {
        self.with_config(|config| {
            let mut execution = partial.apply_to(&config.execution);
            if partial.api_provider.is_some() {
                execution.api_provider = partial
                    .api_provider
                    .clone()
                    .filter(|p| p != DEFAULT_API_PROVIDER);
            }
            config.execution = execution;
        })
    }

    async fn update_git(&self, partial: &PartialGitConfig) -> ApiResult<()> {
        self.with_config(|config| config.git = partial.apply_to(&config.git))
    }

    async fn update_validation(&self, partial: &PartialValidationConfig) -> ApiResult<()> {
        self.with_config(|config| config.validation = partial.apply_to(&config.validation))
    }

    async fn update_fallback(&self, partial: &PartialFallbackSettings) -> ApiResult<()> {
        self.with_config(|config| config.fallback = partial.apply_to(&config.fallback))
    }

    async fn update_templates(&self, partial: &PartialTemplateConfig) -> ApiResult<()> {
        self.with_config(|config| config.templates = partial.apply_to(&config.templates))
    }

    async fn save_config(&self) -> ApiResult<()> {
        let config = self.with_config(|config| config.clone())?;

        log::info!(
            "[save_config] Saving to {:?}: max_parallel={}, agent_type={}, strategy={}",
            self.loader.global_config_path(),
            config.execution.max_parallel,
            config.execution.agent_type,
            config.execution.strategy
        );

        self.loader.save_global(&config).map_err(|e| {
            log::error!("[save_config] Failed to save global config: {:#}", e);
            ApiError::Storage(format!("Failed to save global config: {:#}", e))
        })
    }

    async fn reload_config(&self) -> ApiResult<RalphConfig> {
        let fresh = self.load_from_disk()?;
        let mut guard = self
            .config
            .write()
            .map_err(|e| ApiError::Storage(format!("Failed to acquire lock: {}", e)))?;
        *guard = Some(fresh.clone());

        log::info!("[reload_config] Reloaded configuration from disk");
        Ok(fresh)
    }
}
