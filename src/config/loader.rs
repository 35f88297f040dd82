// Configuration record and file loading

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Bounds enforced by the settings controls
pub const MAX_PARALLEL_RANGE: (i32, i32) = (1, 10);
pub const MAX_ITERATIONS_RANGE: (i32, i32) = (1, 50);
pub const MAX_RETRIES_RANGE: (i32, i32) = (0, 5);

/// The shared configuration record edited on the settings page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RalphConfig {
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub fallback: FallbackSettings,
}

/// Order in which pending tasks are picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingStrategy {
    /// One task at a time, in declaration order
    Sequential,
    DependencyFirst,
    Priority,
    Fifo,
    CostFirst,
}

impl SchedulingStrategy {
    pub fn all() -> &'static [SchedulingStrategy] {
        &[
            SchedulingStrategy::Sequential,
            SchedulingStrategy::DependencyFirst,
            SchedulingStrategy::Priority,
            SchedulingStrategy::Fifo,
            SchedulingStrategy::CostFirst,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingStrategy::Sequential => "sequential",
            SchedulingStrategy::DependencyFirst => "dependency_first",
            SchedulingStrategy::Priority => "priority",
            SchedulingStrategy::Fifo => "fifo",
            SchedulingStrategy::CostFirst => "cost_first",
        }
    }

    /// Whether more than one agent may run at once under this strategy
    pub fn allows_parallel(&self) -> bool {
        !matches!(self, SchedulingStrategy::Sequential)
    }
}

impl Default for SchedulingStrategy {
    fn default() -> Self {
        SchedulingStrategy::DependencyFirst
    }
}

impl std::fmt::Display for SchedulingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SchedulingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchedulingStrategy::all()
            .iter()
            .copied()
            .find(|strategy| strategy.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Unknown strategy '{}'. Expected one of: sequential, dependency_first, priority, fifo, cost_first",
                    s
                )
            })
    }
}

/// State of a bounded numeric control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderControl {
    pub value: i32,
    pub min: i32,
    pub max: i32,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(rename = "maxParallel", alias = "max_parallel", default = "default_max_parallel")]
    pub max_parallel: i32,
    /// Iteration cap for a single agent run
    #[serde(rename = "maxIterations", alias = "max_iterations", default = "default_max_iterations")]
    pub max_iterations: i32,
    #[serde(rename = "maxRetries", alias = "max_retries", default = "default_max_retries")]
    pub max_retries: i32,
    /// Primary agent; also the head of the fallback chain
    #[serde(rename = "agentType", alias = "agent_type", default = "default_agent_type")]
    pub agent_type: String,
    #[serde(default)]
    pub strategy: SchedulingStrategy,
    /// Plan tasks without spawning agents
    #[serde(rename = "dryRun", alias = "dry_run", default)]
    pub dry_run: bool,
    /// Model id passed to the primary agent; `None` uses the agent's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Alternative API provider for Claude ("anthropic" is stored as None)
    #[serde(
        rename = "apiProvider",
        alias = "api_provider",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub api_provider: Option<String>,
}

fn default_max_parallel() -> i32 {
    3
}
fn default_max_iterations() -> i32 {
    10
}
fn default_max_retries() -> i32 {
    3
}
fn default_agent_type() -> String {
    "claude".to_string()
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            max_iterations: default_max_iterations(),
            max_retries: default_max_retries(),
            agent_type: default_agent_type(),
            strategy: SchedulingStrategy::default(),
            dry_run: false,
            model: None,
            api_provider: None,
        }
    }
}

impl ExecutionConfig {
    /// The max-parallel control. Sequential execution pins it to 1 and
    /// disables it, whatever value is stored.
    pub fn max_parallel_control(&self) -> SliderControl {
        let (min, max) = MAX_PARALLEL_RANGE;
        if self.strategy.allows_parallel() {
            SliderControl {
                value: self.max_parallel,
                min,
                max,
                disabled: false,
            }
        } else {
            SliderControl {
                value: min,
                min,
                max,
                disabled: true,
            }
        }
    }

    /// Number of agents that will actually run concurrently
    pub fn effective_max_parallel(&self) -> i32 {
        self.max_parallel_control().value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(rename = "autoCreatePrs", alias = "auto_create_prs", default = "default_true")]
    pub auto_create_prs: bool,
    #[serde(rename = "draftPrs", alias = "draft_prs", default)]
    pub draft_prs: bool,
    /// Supports `{task_id}`
    #[serde(rename = "branchPattern", alias = "branch_pattern", default = "default_branch_pattern")]
    pub branch_pattern: String,
}

fn default_true() -> bool {
    true
}
fn default_branch_pattern() -> String {
    "task/{task_id}".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            auto_create_prs: default_true(),
            draft_prs: false,
            branch_pattern: default_branch_pattern(),
        }
    }
}

/// Checks run after an agent reports completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(rename = "runTests", alias = "run_tests", default = "default_true")]
    pub run_tests: bool,
    #[serde(rename = "runLint", alias = "run_lint", default = "default_true")]
    pub run_lint: bool,
    #[serde(
        rename = "testCommand",
        alias = "test_command",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub test_command: Option<String>,
    #[serde(
        rename = "lintCommand",
        alias = "lint_command",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lint_command: Option<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            run_tests: default_true(),
            run_lint: default_true(),
            test_command: None,
            lint_command: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TemplateConfig {
    /// Template name used when a task names none
    #[serde(
        rename = "defaultTemplate",
        alias = "default_template",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_template: Option<String>,
    #[serde(
        rename = "templatesDir",
        alias = "templates_dir",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub templates_dir: Option<String>,
}

/// How the loop reacts to a failed iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ErrorStrategyConfig {
    /// Retry the iteration with backoff
    Retry { max_attempts: u32, backoff_ms: u64 },
    /// Skip the failed iteration and continue
    Skip,
    /// Abort the whole loop
    Abort,
}

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

impl Default for ErrorStrategyConfig {
    fn default() -> Self {
        ErrorStrategyConfig::Retry {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

/// What happens when the primary agent is rate limited or fails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(rename = "baseBackoffMs", alias = "base_backoff_ms", default = "default_backoff")]
    pub base_backoff_ms: u64,
    /// Upper bound for the doubling backoff
    #[serde(rename = "maxBackoffMs", alias = "max_backoff_ms", default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Legacy single fallback agent, superseded by `fallback_chain`
    #[serde(
        rename = "fallbackAgent",
        alias = "fallback_agent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fallback_agent: Option<String>,
    /// Legacy model for the single fallback agent
    #[serde(
        rename = "fallbackModel",
        alias = "fallback_model",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fallback_model: Option<String>,
    #[serde(
        rename = "fallbackApiProvider",
        alias = "fallback_api_provider",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fallback_api_provider: Option<String>,
    #[serde(
        rename = "errorStrategy",
        alias = "error_strategy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_strategy: Option<ErrorStrategyConfig>,
    /// Ordered agent chain; index 0 is the primary agent
    #[serde(
        rename = "fallbackChain",
        alias = "fallback_chain",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fallback_chain: Option<Vec<String>>,
    #[serde(
        rename = "testPrimaryRecovery",
        alias = "test_primary_recovery",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub test_primary_recovery: Option<bool>,
    /// Iterations between primary-agent recovery probes
    #[serde(
        rename = "recoveryTestInterval",
        alias = "recovery_test_interval",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recovery_test_interval: Option<u32>,
}

fn default_backoff() -> u64 {
    5000
}
fn default_max_backoff() -> u64 {
    300000
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_backoff_ms: default_backoff(),
            max_backoff_ms: default_max_backoff(),
            fallback_agent: None,
            fallback_model: None,
            fallback_api_provider: None,
            error_strategy: None,
            fallback_chain: None,
            test_primary_recovery: None,
            recovery_test_interval: None,
        }
    }
}

impl FallbackSettings {
    /// Stored error strategy, or retry(3, 1000ms) when none is stored
    pub fn effective_error_strategy(&self) -> ErrorStrategyConfig {
        self.error_strategy.unwrap_or_default()
    }

    /// Stored chain, or one derived from the primary agent and the legacy
    /// fallback agent. Never empty.
    pub fn effective_chain(&self, primary_agent: &str) -> Vec<String> {
        if let Some(ref chain) = self.fallback_chain {
            if !chain.is_empty() {
                return chain.clone();
            }
        }

        let mut chain = vec![primary_agent.to_string()];
        if let Some(ref legacy) = self.fallback_agent {
            if legacy != primary_agent {
                chain.push(legacy.clone());
            }
        }
        chain
    }
}

/// Reads and writes the TOML files behind [`RalphConfig`]
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Global file under the platform config dir, no project file
    pub fn new() -> Self {
        Self {
            global_path: dirs::config_dir().map(|dir| dir.join("ralph-ui").join("config.toml")),
            project_path: None,
        }
    }

    pub fn with_global_path(mut self, path: &Path) -> Self {
        self.global_path = Some(path.to_path_buf());
        self
    }

    /// Layer `<project>/.ralph-ui/config.toml` over the global file
    pub fn with_project_path(mut self, project: &Path) -> Self {
        self.project_path = Some(project.join(".ralph-ui").join("config.toml"));
        self
    }

    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    pub fn project_config_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn load_global(&self) -> Result<Option<RalphConfig>> {
        self.global_path
            .as_deref()
            .map_or(Ok(None), |path| self.load_from_path(path))
    }

    pub fn load_project(&self) -> Result<Option<RalphConfig>> {
        self.project_path
            .as_deref()
            .map_or(Ok(None), |path| self.load_from_path(path))
    }

    /// `Ok(None)` when the file does not exist
    pub fn load_from_path(&self, path: &Path) -> Result<Option<RalphConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: RalphConfig = toml::from_str(&raw)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?;
        validate_config(&config)?;

        log::debug!("[ConfigLoader::load_from_path] Loaded {}", path.display());
        Ok(Some(config))
    }

    pub fn save_global(&self, config: &RalphConfig) -> Result<()> {
        let path = self
            .global_path
            .as_deref()
            .ok_or_else(|| anyhow!("No global config location on this platform"))?;
        self.save_to_path(path, config)
    }

    /// Validate, then write `config` as pretty TOML
    pub fn save_to_path(&self, path: &Path, config: &RalphConfig) -> Result<()> {
        validate_config(config)?;
        let raw = toml::to_string_pretty(config).context("Cannot encode config as TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        fs::write(path, raw).with_context(|| format!("Cannot write {}", path.display()))?;

        log::info!("[ConfigLoader::save_to_path] Wrote {}", path.display());
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject values the agent loop cannot run with. Range limits of the UI
/// controls are not enforced here.
pub fn validate_config(config: &RalphConfig) -> Result<()> {
    if config.execution.max_parallel <= 0 {
        return Err(anyhow!("max_parallel must be greater than 0"));
    }

    if config.execution.max_iterations <= 0 {
        return Err(anyhow!("max_iterations must be greater than 0"));
    }

    if config.execution.max_retries < 0 {
        return Err(anyhow!("max_retries cannot be negative"));
    }

    if config.fallback.enabled {
        if let Some(ref chain) = config.fallback.fallback_chain {
            if chain.is_empty() {
                return Err(anyhow!("fallback_chain cannot be empty while fallback is enabled"));
            }
        }
    }

    Ok(())
}
