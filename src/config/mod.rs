// Configuration record, file loading and partial merging

pub mod loader;
pub mod merger;

pub use loader::{
    validate_config, ConfigLoader, ErrorStrategyConfig, ExecutionConfig, FallbackSettings,
    GitConfig, RalphConfig, SchedulingStrategy, SliderControl, TemplateConfig, ValidationConfig,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS, MAX_ITERATIONS_RANGE, MAX_PARALLEL_RANGE,
    MAX_RETRIES_RANGE,
};
pub use merger::{
    ConfigMerger, PartialExecutionConfig, PartialFallbackSettings, PartialGitConfig,
    PartialTemplateConfig, PartialValidationConfig,
};

/// Load global and project layers and merge them over the defaults
pub fn load_merged_config(loader: &ConfigLoader) -> anyhow::Result<RalphConfig> {
    let global = loader.load_global()?;
    let project = loader.load_project()?;

    Ok(ConfigMerger::new()
        .with_global(global)
        .with_project(project)
        .merge())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_merged_config_layers_project_over_global() {
        let temp_dir = TempDir::new().unwrap();
        let global_path = temp_dir.path().join("global.toml");
        fs::write(&global_path, "[execution]\nmax_parallel = 6\nmax_iterations = 20\n").unwrap();

        let project = temp_dir.path().join("project");
        fs::create_dir_all(project.join(".ralph-ui")).unwrap();
        fs::write(
            project.join(".ralph-ui").join("config.toml"),
            "[execution]\nmax_parallel = 2\n",
        )
        .unwrap();

        let loader = ConfigLoader::new()
            .with_global_path(&global_path)
            .with_project_path(&project);
        let config = load_merged_config(&loader).unwrap();

        assert_eq!(config.execution.max_parallel, 2);
        // Project file omits max_iterations, so its default wins over global
        assert_eq!(config.execution.max_iterations, 10);
    }

    #[test]
    fn test_load_merged_config_propagates_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let global_path = temp_dir.path().join("global.toml");
        fs::write(&global_path, "[execution\n").unwrap();

        let loader = ConfigLoader::new().with_global_path(&global_path);
        assert!(load_merged_config(&loader).is_err());
    }
}
