//! Chat command storage
//!
//! Custom commands and builtin overrides live in `chat-commands.json`, one
//! file in the global directory and one in the project's `.ralph-ui/`. A file
//! that ends up empty is removed.

use super::LocalBackend;
use crate::api::{ApiError, ApiResult, ChatCommandApi};
use crate::models::{
    chat_commands::is_valid_command_id, ChatCommandConfig, ChatCommandPreference,
    ChatCommandScope, ChatCommandsFile, CreateChatCommandRequest, UpdateChatCommandRequest,
};
use crate::utils::{ralph_ui_dir, read_json, write_json};
use std::path::{Path, PathBuf};

const COMMANDS_FILE: &str = "chat-commands.json";

/// Commands shipped with the app
pub fn builtin_commands() -> Vec<ChatCommandConfig> {
    vec![
        ChatCommandConfig::builtin(
            "ideas",
            "Ideas",
            "Analyze codebase and suggest improvements",
            "Analyze the codebase and suggest improvements, grouped as quick wins, \
             refactoring opportunities and larger architecture changes. \
             Reference file paths where relevant.",
        ),
        ChatCommandConfig::builtin(
            "research",
            "Research",
            "Research and analyze requirements",
            "Research the requirements we've discussed. Cover architecture, \
             integration points, known risks and edge cases.",
        ),
        ChatCommandConfig::builtin(
            "agents",
            "AGENTS.md",
            "Generate AGENTS.md for AI coding agents",
            "Generate an AGENTS.md for this project with setup, build, test and lint \
             commands, code conventions and the layout of key directories.",
        ),
        ChatCommandConfig::builtin(
            "criteria",
            "Criteria",
            "Generate BDD acceptance criteria",
            "Write Given/When/Then acceptance criteria for the feature we're discussing, \
             including error handling and edge cases.",
        ),
        ChatCommandConfig::builtin(
            "critique",
            "Critique",
            "Ask for a critique of the current PRD",
            "Critique the current requirements for clarity, completeness and feasibility.",
        ),
        ChatCommandConfig::builtin(
            "story",
            "User Story",
            "Insert a User Story template",
            "#### US-X.X: [Title]\n**As a** [user],\n**I want** [action],\n**So that** [benefit].\n",
        ),
        ChatCommandConfig::builtin(
            "task",
            "Task",
            "Insert a Task template",
            "- [ ] Task: [Title]\n",
        ),
    ]
}

fn is_builtin_id(id: &str) -> bool {
    builtin_commands().iter().any(|b| b.id == id)
}

fn load_commands_file(path: &Path) -> ChatCommandsFile {
    if !path.exists() {
        return ChatCommandsFile::default();
    }
    read_json(path).unwrap_or_else(|e| {
        log::warn!("[load_commands_file] Ignoring unreadable {:?}: {}", path, e);
        ChatCommandsFile::default()
    })
}

fn save_commands_file(path: &Path, file: &ChatCommandsFile) -> Result<(), String> {
    if file.is_empty() {
        if path.exists() {
            std::fs::remove_file(path)
                .map_err(|e| format!("Failed to remove empty commands file: {}", e))?;
        }
        return Ok(());
    }
    write_json(path, file)
}

impl LocalBackend {
    /// Commands file for a writable scope
    fn commands_path(
        &self,
        scope: ChatCommandScope,
        project_path: Option<&str>,
    ) -> Result<PathBuf, String> {
        match scope {
            ChatCommandScope::Project => self
                .resolve_project(project_path)
                .map(|p| ralph_ui_dir(&p.to_string_lossy()).join(COMMANDS_FILE))
                .ok_or_else(|| "Project path required for project scope".to_string()),
            ChatCommandScope::Global => Ok(self.global_dir.join(COMMANDS_FILE)),
            ChatCommandScope::Builtin => Err("Builtin commands are read-only".to_string()),
        }
    }

    /// Load, edit and write back one commands file
    fn edit_commands_file(
        &self,
        scope: ChatCommandScope,
        project_path: Option<&str>,
        edit: impl FnOnce(&mut ChatCommandsFile) -> Result<(), String>,
    ) -> Result<(), String> {
        let path = self.commands_path(scope, project_path)?;
        let mut file = load_commands_file(&path);
        edit(&mut file)?;
        save_commands_file(&path, &file)
    }

    /// Builtins with overrides applied, then global and project custom
    /// commands. A project command replaces a global one with the same id.
    fn merge_commands(&self, project_path: Option<&str>) -> Vec<ChatCommandConfig> {
        let global_file = load_commands_file(&self.global_dir.join(COMMANDS_FILE));
        let project_file = self
            .commands_path(ChatCommandScope::Project, project_path)
            .map(|path| load_commands_file(&path))
            .unwrap_or_default();

        let mut result: Vec<ChatCommandConfig> = Vec::new();

        for mut builtin in builtin_commands() {
            if let Some(pref) = global_file.builtin_preferences.get(&builtin.id) {
                builtin.apply_preference(pref);
            }
            if let Some(pref) = project_file.builtin_preferences.get(&builtin.id) {
                builtin.apply_preference(pref);
            }
            result.push(builtin);
        }

        for mut cmd in global_file.custom_commands {
            cmd.scope = ChatCommandScope::Global;
            result.push(cmd);
        }

        for mut cmd in project_file.custom_commands {
            cmd.scope = ChatCommandScope::Project;
            result.retain(|c| c.id != cmd.id || c.is_builtin());
            result.push(cmd);
        }

        result
    }
}

impl ChatCommandApi for LocalBackend {
    async fn list_chat_commands(
        &self,
        project_path: Option<&str>,
    ) -> ApiResult<Vec<ChatCommandConfig>> {
        Ok(self.merge_commands(project_path))
    }

    async fn create_chat_command(
        &self,
        request: &CreateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        if !is_valid_command_id(&request.id) {
            return Err(ApiError::Command(format!(
                "Invalid command ID '{}'. Use lowercase letters, numbers, hyphens, and underscores only.",
                request.id
            )));
        }
        if is_builtin_id(&request.id) {
            return Err(ApiError::Command(format!(
                "Command ID '{}' conflicts with a builtin command",
                request.id
            )));
        }

        let mut command = ChatCommandConfig::new(
            request.id.clone(),
            request.label.clone(),
            request.description.clone(),
            request.template.clone(),
        );
        command.scope = request.scope;

        self.edit_commands_file(request.scope, project_path, |file| {
            if file.custom_commands.iter().any(|c| c.id == command.id) {
                return Err(format!(
                    "Command '{}' already exists in {} scope",
                    command.id, request.scope
                ));
            }
            file.custom_commands.push(command);
            Ok(())
        })
        .map_err(ApiError::Command)?;

        log::info!(
            "[create_chat_command] Created '{}' in {} scope",
            request.id,
            request.scope
        );
        Ok(())
    }

    async fn update_chat_command(
        &self,
        request: &UpdateChatCommandRequest,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        let save_scope = request.save_scope.unwrap_or(ChatCommandScope::Global);
        let update = request.preference();

        let result = if is_builtin_id(&request.id) {
            self.edit_commands_file(save_scope, project_path, |file| {
                file.builtin_preferences
                    .entry(request.id.clone())
                    .or_insert_with(ChatCommandPreference::default)
                    .merge(update);
                Ok(())
            })
        } else {
            self.edit_commands_file(save_scope, project_path, |file| {
                let cmd = file
                    .custom_commands
                    .iter_mut()
                    .find(|c| c.id == request.id)
                    .ok_or_else(|| {
                        format!("Command '{}' not found in {} scope", request.id, save_scope)
                    })?;
                cmd.apply_preference(&update);
                Ok(())
            })
        };

        result.map_err(ApiError::Command)
    }

    async fn delete_chat_command(
        &self,
        id: &str,
        scope: ChatCommandScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        if is_builtin_id(id) {
            return Err(ApiError::Command(format!(
                "Cannot delete builtin command '{}'. You can disable it instead.",
                id
            )));
        }

        self.edit_commands_file(scope, project_path, |file| {
            let initial_len = file.custom_commands.len();
            file.custom_commands.retain(|c| c.id != id);
            if file.custom_commands.len() == initial_len {
                return Err(format!("Command '{}' not found in {} scope", id, scope));
            }
            Ok(())
        })
        .map_err(ApiError::Command)
    }

    async fn reset_chat_command(
        &self,
        id: &str,
        scope: Option<ChatCommandScope>,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        if !is_builtin_id(id) {
            return Err(ApiError::Command(format!(
                "'{}' is not a builtin command",
                id
            )));
        }

        let scopes: Vec<ChatCommandScope> = match scope {
            Some(ChatCommandScope::Builtin) => {
                return Err(ApiError::Command(
                    "Cannot reset from builtin scope".to_string(),
                ))
            }
            Some(scope) => vec![scope],
            None if self.resolve_project(project_path).is_some() => {
                vec![ChatCommandScope::Project, ChatCommandScope::Global]
            }
            None => vec![ChatCommandScope::Global],
        };

        for scope in scopes {
            self.edit_commands_file(scope, project_path, |file| {
                file.builtin_preferences.remove(id);
                Ok(())
            })
            .map_err(ApiError::Command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        backend: LocalBackend,
        project: String,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let backend = LocalBackend::new(&dir.path().join("global"), None);
        Fixture {
            project: project.to_string_lossy().to_string(),
            _dir: dir,
            backend,
        }
    }

    fn create_request(id: &str, scope: ChatCommandScope) -> CreateChatCommandRequest {
        CreateChatCommandRequest {
            id: id.to_string(),
            label: "My Command".to_string(),
            description: "Does something".to_string(),
            template: "Hello".to_string(),
            scope,
        }
    }

    #[tokio::test]
    async fn test_list_contains_builtins_without_overrides() {
        let f = fixture();
        let commands = f.backend.list_chat_commands(None).await.unwrap();
        assert_eq!(commands.len(), builtin_commands().len());
        assert!(commands.iter().all(|c| c.enabled && !c.favorite && c.is_builtin()));
    }

    #[tokio::test]
    async fn test_create_global_command() {
        let f = fixture();
        f.backend
            .create_chat_command(&create_request("my-command", ChatCommandScope::Global), None)
            .await
            .unwrap();

        let commands = f.backend.list_chat_commands(None).await.unwrap();
        let created = commands.iter().find(|c| c.id == "my-command").unwrap();
        assert_eq!(created.scope, ChatCommandScope::Global);
        assert_eq!(created.label, "My Command");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_and_builtin_ids() {
        let f = fixture();
        let err = f
            .backend
            .create_chat_command(&create_request("Bad Id!", ChatCommandScope::Global), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid command ID"));

        let err = f
            .backend
            .create_chat_command(&create_request("ideas", ChatCommandScope::Global), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("conflicts with a builtin"));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let f = fixture();
        let request = create_request("dup", ChatCommandScope::Global);
        f.backend.create_chat_command(&request, None).await.unwrap();
        assert!(f.backend.create_chat_command(&request, None).await.is_err());
    }

    #[tokio::test]
    async fn test_project_command_shadows_global() {
        let f = fixture();
        f.backend
            .create_chat_command(&create_request("shared", ChatCommandScope::Global), None)
            .await
            .unwrap();
        f.backend
            .create_chat_command(
                &create_request("shared", ChatCommandScope::Project),
                Some(&f.project),
            )
            .await
            .unwrap();

        let commands = f.backend.list_chat_commands(Some(&f.project)).await.unwrap();
        let shared: Vec<_> = commands.iter().filter(|c| c.id == "shared").collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].scope, ChatCommandScope::Project);
    }

    #[tokio::test]
    async fn test_update_builtin_then_reset() {
        let f = fixture();
        let request = UpdateChatCommandRequest {
            id: "ideas".to_string(),
            enabled: Some(false),
            favorite: Some(true),
            save_scope: Some(ChatCommandScope::Project),
            ..Default::default()
        };
        f.backend
            .update_chat_command(&request, Some(&f.project))
            .await
            .unwrap();

        let commands = f.backend.list_chat_commands(Some(&f.project)).await.unwrap();
        let ideas = commands.iter().find(|c| c.id == "ideas").unwrap();
        assert!(!ideas.enabled);
        assert!(ideas.favorite);

        f.backend
            .reset_chat_command("ideas", None, Some(&f.project))
            .await
            .unwrap();
        let commands = f.backend.list_chat_commands(Some(&f.project)).await.unwrap();
        let ideas = commands.iter().find(|c| c.id == "ideas").unwrap();
        assert!(ideas.enabled);
        assert!(!ideas.favorite);

        // Empty files are removed
        assert!(!Path::new(&f.project)
            .join(".ralph-ui")
            .join(COMMANDS_FILE)
            .exists());
    }

    #[tokio::test]
    async fn test_update_custom_command() {
        let f = fixture();
        f.backend
            .create_chat_command(&create_request("mine", ChatCommandScope::Global), None)
            .await
            .unwrap();
        let request = UpdateChatCommandRequest {
            id: "mine".to_string(),
            template: Some("Updated".to_string()),
            ..Default::default()
        };
        f.backend.update_chat_command(&request, None).await.unwrap();

        let commands = f.backend.list_chat_commands(None).await.unwrap();
        assert_eq!(
            commands.iter().find(|c| c.id == "mine").unwrap().template,
            "Updated"
        );
    }

    #[tokio::test]
    async fn test_delete_custom_and_reject_builtin() {
        let f = fixture();
        f.backend
            .create_chat_command(&create_request("gone", ChatCommandScope::Global), None)
            .await
            .unwrap();
        f.backend
            .delete_chat_command("gone", ChatCommandScope::Global, None)
            .await
            .unwrap();
        assert!(!f
            .backend
            .list_chat_commands(None)
            .await
            .unwrap()
            .iter()
            .any(|c| c.id == "gone"));

        let err = f
            .backend
            .delete_chat_command("ideas", ChatCommandScope::Global, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Cannot delete builtin"));
    }

    #[tokio::test]
    async fn test_reset_non_builtin_fails() {
        let f = fixture();
        assert!(f
            .backend
            .reset_chat_command("not-a-builtin", None, None)
            .await
            .is_err());
    }
}
