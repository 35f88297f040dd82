//! File-backed backend
//!
//! Implements every API trait against the same files the Ralph server uses:
//! `config.toml`, `templates/*.tera` and `chat-commands.json` under the
//! global directory (default `~/.ralph-ui`) and the project's `.ralph-ui/`.
//! Used by the CLI when no server is configured and by tests.

mod agents;
mod chat_commands;
mod config;
mod templates;

pub use agents::{builtin_models, provider_models, ModelCache};
pub use chat_commands::builtin_commands;

use crate::config::{ConfigLoader, RalphConfig};
use crate::utils::global_ralph_ui_dir;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Backend working directly on the local filesystem
pub struct LocalBackend {
    global_dir: PathBuf,
    project_path: Option<PathBuf>,
    loader: ConfigLoader,
    /// In-memory configuration; `None` until first read
    config: RwLock<Option<RalphConfig>>,
    model_cache: ModelCache,
    /// PATH override used for agent CLI detection
    agent_search_path: Option<OsString>,
}

impl LocalBackend {
    pub fn new(global_dir: &Path, project_path: Option<&Path>) -> Self {
        let mut loader = ConfigLoader::new().with_global_path(&global_dir.join("config.toml"));
        if let Some(project) = project_path {
            loader = loader.with_project_path(project);
        }

        log::info!(
            "[LocalBackend::new] Global dir: {:?}, project: {:?}",
            global_dir,
            project_path
        );

        Self {
            global_dir: global_dir.to_path_buf(),
            project_path: project_path.map(Path::to_path_buf),
            loader,
            config: RwLock::new(None),
            model_cache: ModelCache::new(),
            agent_search_path: None,
        }
    }

    /// Backend rooted at `~/.ralph-ui`
    pub fn with_default_dirs(project_path: Option<&Path>) -> Self {
        Self::new(&global_ralph_ui_dir(), project_path)
    }

    /// Look for agent CLIs in `paths` instead of `$PATH`
    pub fn with_agent_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.agent_search_path = Some(paths.into());
        self
    }

    pub fn global_dir(&self) -> &Path {
        &self.global_dir
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn model_cache(&self) -> &ModelCache {
        &self.model_cache
    }

    /// Explicit project argument wins over the backend's own project
    fn resolve_project<'a>(&'a self, project_path: Option<&'a str>) -> Option<&'a Path> {
        project_path.map(Path::new).or(self.project_path.as_deref())
    }
}
