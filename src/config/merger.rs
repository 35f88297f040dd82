// Section-scoped partial updates and layered merging

use crate::config::loader::{
    ErrorStrategyConfig, ExecutionConfig, FallbackSettings, GitConfig, RalphConfig,
    SchedulingStrategy, TemplateConfig, ValidationConfig,
};
use serde::{Deserialize, Serialize};

/// Partial execution update. Unset fields leave the section untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialExecutionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<SchedulingStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialGitConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_create_prs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_prs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialValidationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_tests: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_lint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialTemplateConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialFallbackSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_backoff_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_backoff_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_api_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_strategy: Option<ErrorStrategyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_chain: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_primary_recovery: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_test_interval: Option<u32>,
}

impl PartialExecutionConfig {
    /// Full-section snapshot, used when the whole section is pushed
    pub fn from_section(section: &ExecutionConfig) -> Self {
        Self {
            max_parallel: Some(section.max_parallel),
            max_iterations: Some(section.max_iterations),
            max_retries: Some(section.max_retries),
            agent_type: Some(section.agent_type.clone()),
            strategy: Some(section.strategy),
            dry_run: Some(section.dry_run),
            model: section.model.clone(),
            api_provider: section.api_provider.clone(),
        }
    }

    pub fn apply_to(&self, base: &ExecutionConfig) -> ExecutionConfig {
        ExecutionConfig {
            max_parallel: self.max_parallel.unwrap_or(base.max_parallel),
            max_iterations: self.max_iterations.unwrap_or(base.max_iterations),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            agent_type: self
                .agent_type
                .clone()
                .unwrap_or_else(|| base.agent_type.clone()),
            strategy: self.strategy.unwrap_or(base.strategy),
            dry_run: self.dry_run.unwrap_or(base.dry_run),
            model: self.model.clone().or_else(|| base.model.clone()),
            api_provider: self
                .api_provider
                .clone()
                .or_else(|| base.api_provider.clone()),
        }
    }
}

impl PartialGitConfig {
    pub fn from_section(section: &GitConfig) -> Self {
        Self {
            auto_create_prs: Some(section.auto_create_prs),
            draft_prs: Some(section.draft_prs),
            branch_pattern: Some(section.branch_pattern.clone()),
        }
    }

    pub fn apply_to(&self, base: &GitConfig) -> GitConfig {
        GitConfig {
            auto_create_prs: self.auto_create_prs.unwrap_or(base.auto_create_prs),
            draft_prs: self.draft_prs.unwrap_or(base.draft_prs),
            branch_pattern: self
                .branch_pattern
                .clone()
                .unwrap_or_else(|| base.branch_pattern.clone()),
        }
    }
}

impl PartialValidationConfig {
    pub fn from_section(section: &ValidationConfig) -> Self {
        Self {
            run_tests: Some(section.run_tests),
            run_lint: Some(section.run_lint),
            test_command: section.test_command.clone(),
            lint_command: section.lint_command.clone(),
        }
    }

    pub fn apply_to(&self, base: &ValidationConfig) -> ValidationConfig {
        ValidationConfig {
            run_tests: self.run_tests.unwrap_or(base.run_tests),
            run_lint: self.run_lint.unwrap_or(base.run_lint),
            test_command: self
                .test_command
                .clone()
                .or_else(|| base.test_command.clone()),
            lint_command: self
                .lint_command
                .clone()
                .or_else(|| base.lint_command.clone()),
        }
    }
}

impl PartialTemplateConfig {
    pub fn from_section(section: &TemplateConfig) -> Self {
        Self {
            default_template: section.default_template.clone(),
            templates_dir: section.templates_dir.clone(),
        }
    }

    pub fn apply_to(&self, base: &TemplateConfig) -> TemplateConfig {
        TemplateConfig {
            default_template: self
                .default_template
                .clone()
                .or_else(|| base.default_template.clone()),
            templates_dir: self
                .templates_dir
                .clone()
                .or_else(|| base.templates_dir.clone()),
        }
    }
}

impl PartialFallbackSettings {
    pub fn from_section(section: &FallbackSettings) -> Self {
        Self {
            enabled: Some(section.enabled),
            base_backoff_ms: Some(section.base_backoff_ms),
            max_backoff_ms: Some(section.max_backoff_ms),
            fallback_agent: section.fallback_agent.clone(),
            fallback_model: section.fallback_model.clone(),
            fallback_api_provider: section.fallback_api_provider.clone(),
            error_strategy: section.error_strategy,
            fallback_chain: section.fallback_chain.clone(),
            test_primary_recovery: section.test_primary_recovery,
            recovery_test_interval: section.recovery_test_interval,
        }
    }

    pub fn apply_to(&self, base: &FallbackSettings) -> FallbackSettings {
        FallbackSettings {
            enabled: self.enabled.unwrap_or(base.enabled),
            base_backoff_ms: self.base_backoff_ms.unwrap_or(base.base_backoff_ms),
            max_backoff_ms: self.max_backoff_ms.unwrap_or(base.max_backoff_ms),
            fallback_agent: self
                .fallback_agent
                .clone()
                .or_else(|| base.fallback_agent.clone()),
            fallback_model: self
                .fallback_model
                .clone()
                .or_else(|| base.fallback_model.clone()),
            fallback_api_provider: self
                .fallback_api_provider
                .clone()
                .or_else(|| base.fallback_api_provider.clone()),
            error_strategy: self.error_strategy.or(base.error_strategy),
            fallback_chain: self
                .fallback_chain
                .clone()
                .or_else(|| base.fallback_chain.clone()),
            test_primary_recovery: self.test_primary_recovery.or(base.test_primary_recovery),
            recovery_test_interval: self.recovery_test_interval.or(base.recovery_test_interval),
        }
    }
}

/// Layered configuration merger
/// Priority order: Project -> Global -> Defaults
pub struct ConfigMerger {
    defaults: RalphConfig,
    global: Option<RalphConfig>,
    project: Option<RalphConfig>,
}

impl ConfigMerger {
    pub fn new() -> Self {
        Self {
            defaults: RalphConfig::default(),
            global: None,
            project: None,
        }
    }

    pub fn with_global(mut self, config: Option<RalphConfig>) -> Self {
        self.global = config;
        self
    }

    pub fn with_project(mut self, config: Option<RalphConfig>) -> Self {
        self.project = config;
        self
    }

    /// Merge all layers with priority
    pub fn merge(&self) -> RalphConfig {
        let mut result = self.defaults.clone();

        if let Some(ref global) = self.global {
            result = merge_full(&result, global);
        }

        if let Some(ref project) = self.project {
            result = merge_full(&result, project);
        }

        result
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Scalars come from the override layer; optional values fall through to the
/// base layer when the override leaves them unset.
fn merge_full(base: &RalphConfig, over: &RalphConfig) -> RalphConfig {
    RalphConfig {
        execution: PartialExecutionConfig::from_section(&over.execution).apply_to(&base.execution),
        git: PartialGitConfig::from_section(&over.git).apply_to(&base.git),
        validation: PartialValidationConfig::from_section(&over.validation)
            .apply_to(&base.validation),
        templates: PartialTemplateConfig {
            default_template: over.templates.default_template.clone(),
            templates_dir: over.templates.templates_dir.clone(),
        }
        .apply_to(&base.templates),
        fallback: PartialFallbackSettings::from_section(&over.fallback).apply_to(&base.fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_global_config() -> RalphConfig {
        RalphConfig {
            execution: ExecutionConfig {
                max_parallel: 5,
                strategy: SchedulingStrategy::Priority,
                ..Default::default()
            },
            validation: ValidationConfig {
                test_command: Some("npm test".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn create_project_config() -> RalphConfig {
        RalphConfig {
            execution: ExecutionConfig {
                max_parallel: 2,
                max_iterations: 15,
                agent_type: "opencode".to_string(),
                strategy: SchedulingStrategy::Fifo,
                model: Some("anthropic/claude-sonnet-4-5".to_string()),
                ..Default::default()
            },
            validation: ValidationConfig {
                lint_command: Some("npm run lint".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_project_overrides_global_config() {
        let result = ConfigMerger::new()
            .with_global(Some(create_global_config()))
            .with_project(Some(create_project_config()))
            .merge();

        assert_eq!(result.execution.max_parallel, 2);
        assert_eq!(result.execution.max_iterations, 15);
        assert_eq!(result.execution.agent_type, "opencode");
        assert_eq!(result.execution.strategy, SchedulingStrategy::Fifo);
    }

    #[test]
    fn test_option_fields_fall_through() {
        let result = ConfigMerger::new()
            .with_global(Some(create_global_config()))
            .with_project(Some(create_project_config()))
            .merge();

        assert_eq!(result.validation.test_command, Some("npm test".to_string()));
        assert_eq!(
            result.validation.lint_command,
            Some("npm run lint".to_string())
        );
    }

    #[test]
    fn test_returns_defaults_when_no_configs_exist() {
        let result = ConfigMerger::new().merge();
        assert_eq!(result, RalphConfig::default());
    }

    #[test]
    fn test_partial_preserves_unset_fields() {
        let base = ExecutionConfig {
            max_parallel: 4,
            model: Some("claude-opus-4-5".to_string()),
            ..Default::default()
        };
        let partial = PartialExecutionConfig {
            strategy: Some(SchedulingStrategy::CostFirst),
            ..Default::default()
        };

        let merged = partial.apply_to(&base);
        assert_eq!(merged.strategy, SchedulingStrategy::CostFirst);
        assert_eq!(merged.max_parallel, 4);
        assert_eq!(merged.model, Some("claude-opus-4-5".to_string()));
    }

    #[test]
    fn test_partial_apply_is_idempotent() {
        let base = FallbackSettings::default();
        let partial = PartialFallbackSettings {
            fallback_chain: Some(vec!["claude".to_string(), "codex".to_string()]),
            error_strategy: Some(ErrorStrategyConfig::Abort),
            ..Default::default()
        };

        let once = partial.apply_to(&base);
        let twice = partial.apply_to(&once);
        assert_eq!(once, twice);
        assert_eq!(once.base_backoff_ms, base.base_backoff_ms);
    }

    #[test]
    fn test_from_section_roundtrip() {
        let section = GitConfig {
            auto_create_prs: false,
            draft_prs: true,
            branch_pattern: "ralph/{task_id}".to_string(),
        };
        let rebuilt = PartialGitConfig::from_section(&section).apply_to(&GitConfig::default());
        assert_eq!(rebuilt, section);
    }

    #[test]
    fn test_partial_serializes_only_set_fields() {
        let partial = PartialExecutionConfig {
            max_parallel: Some(2),
            strategy: Some(SchedulingStrategy::Sequential),
            ..Default::default()
        };
        let json = serde_json::to_value(&partial).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"maxParallel": 2, "strategy": "sequential"})
        );
    }
}
