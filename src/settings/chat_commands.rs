//! Chat command list state
//!
//! Mirrors the backend's merged command list and applies successful
//! mutations locally, so the list stays current without another fetch.

use crate::api::ChatCommandApi;
use crate::models::chat_commands::{is_valid_command_id, slugify_command_id};
use crate::models::{
    ChatCommandConfig, ChatCommandScope, CreateChatCommandRequest, UpdateChatCommandRequest,
};

/// User input for a new command; the id is slug-normalized on create
#[derive(Debug, Clone, Default)]
pub struct ChatCommandDraft {
    pub id: String,
    pub label: String,
    pub description: String,
    pub template: String,
    pub scope: Option<ChatCommandScope>,
}

pub struct ChatCommandStore<B> {
    backend: B,
    project_path: Option<String>,
    commands: Vec<ChatCommandConfig>,
    loading: bool,
    error: Option<String>,
}

impl<B: ChatCommandApi> ChatCommandStore<B> {
    pub fn new(backend: B, project_path: Option<String>) -> Self {
        Self {
            backend,
            project_path,
            commands: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn commands(&self) -> &[ChatCommandConfig] {
        &self.commands
    }

    pub fn enabled(&self) -> impl Iterator<Item = &ChatCommandConfig> {
        self.commands.iter().filter(|c| c.enabled)
    }

    pub fn favorites(&self) -> impl Iterator<Item = &ChatCommandConfig> {
        self.commands.iter().filter(|c| c.favorite)
    }

    pub fn find(&self, id: &str) -> Option<&ChatCommandConfig> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn project(&self) -> Option<&str> {
        self.project_path.as_deref()
    }

    /// Record a failure in the error slot and hand it back
    fn fail<T>(&mut self, message: String) -> Result<T, String> {
        log::warn!("[ChatCommandStore] {}", message);
        self.error = Some(message.clone());
        Err(message)
    }

    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;
        match self.backend.list_chat_commands(self.project()).await {
            Ok(commands) => self.commands = commands,
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Create a command from `draft`. Exactly one backend call; on success
    /// the new command is placed in the local list where the backend's
    /// merged list would have it.
    pub async fn create(&mut self, draft: ChatCommandDraft) -> Result<ChatCommandConfig, String> {
        self.error = None;
        let id = slugify_command_id(&draft.id);
        if !is_valid_command_id(&id) {
            return self.fail(format!(
                "Invalid command ID '{}'. Use 1-50 letters, numbers, hyphens or underscores.",
                draft.id
            ));
        }
        if self.find(&id).is_some_and(ChatCommandConfig::is_builtin) {
            return self.fail(format!("Command ID '{}' conflicts with a builtin command", id));
        }

        let scope = draft.scope.unwrap_or(ChatCommandScope::Global);
        if scope == ChatCommandScope::Builtin {
            return self.fail("Commands cannot be created in builtin scope".to_string());
        }

        let request = CreateChatCommandRequest {
            id,
            label: draft.label,
            description: draft.description,
            template: draft.template,
            scope,
        };
        if let Err(e) = self
            .backend
            .create_chat_command(&request, self.project())
            .await
        {
            return self.fail(e.to_string());
        }

        let mut command =
            ChatCommandConfig::new(request.id, request.label, request.description, request.template);
        command.scope = scope;
        self.insert_created(command.clone());
        Ok(command)
    }

    /// Global commands follow the other globals. Project commands go last
    /// and replace a global command with the same id; a global command
    /// under an existing project id stays hidden.
    fn insert_created(&mut self, command: ChatCommandConfig) {
        if command.scope == ChatCommandScope::Project {
            self.commands.retain(|c| c.is_builtin() || c.id != command.id);
            self.commands.push(command);
            return;
        }

        let shadowed = self
            .commands
            .iter()
            .any(|c| c.scope == ChatCommandScope::Project && c.id == command.id);
        if shadowed {
            return;
        }
        let at = self
            .commands
            .iter()
            .rposition(|c| c.scope != ChatCommandScope::Project)
            .map_or(0, |i| i + 1);
        self.commands.insert(at, command);
    }

    /// Scope an update is written to: custom commands stay in their own
    /// scope, builtin overrides go to the project when there is one
    fn save_scope_for(&self, command: &ChatCommandConfig) -> ChatCommandScope {
        match command.scope {
            ChatCommandScope::Builtin if self.project_path.is_some() => ChatCommandScope::Project,
            ChatCommandScope::Builtin => ChatCommandScope::Global,
            other => other,
        }
    }

    /// Send `request` for command `id` and apply it locally on success
    async fn update(&mut self, mut request: UpdateChatCommandRequest) -> Result<(), String> {
        self.error = None;
        let Some(command) = self.find(&request.id).cloned() else {
            return self.fail(format!("Command '{}' not found", request.id));
        };
        request.save_scope = Some(self.save_scope_for(&command));

        if let Err(e) = self
            .backend
            .update_chat_command(&request, self.project())
            .await
        {
            return self.fail(e.to_string());
        }

        let preference = request.preference();
        if let Some(cmd) = self.commands.iter_mut().find(|c| c.id == request.id) {
            cmd.apply_preference(&preference);
        }
        Ok(())
    }

    pub async fn toggle_enabled(&mut self, id: &str) -> Result<(), String> {
        let enabled = self.find(id).map(|c| !c.enabled).unwrap_or(true);
        self.update(UpdateChatCommandRequest {
            id: id.to_string(),
            enabled: Some(enabled),
            ..Default::default()
        })
        .await
    }

    pub async fn toggle_favorite(&mut self, id: &str) -> Result<(), String> {
        let favorite = self.find(id).map(|c| !c.favorite).unwrap_or(true);
        self.update(UpdateChatCommandRequest {
            id: id.to_string(),
            favorite: Some(favorite),
            ..Default::default()
        })
        .await
    }

    /// Change the body, label or description. On a builtin this creates an
    /// override.
    pub async fn edit(
        &mut self,
        id: &str,
        label: Option<String>,
        description: Option<String>,
        template: Option<String>,
    ) -> Result<(), String> {
        self.update(UpdateChatCommandRequest {
            id: id.to_string(),
            label,
            description,
            template,
            ..Default::default()
        })
        .await
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        self.error = None;
        let Some(command) = self.find(id).cloned() else {
            return self.fail(format!("Command '{}' not found", id));
        };
        if command.is_builtin() {
            return self.fail(format!(
                "Cannot delete builtin command '{}'. You can disable it instead.",
                id
            ));
        }

        if let Err(e) = self
            .backend
            .delete_chat_command(id, command.scope, self.project())
            .await
        {
            return self.fail(e.to_string());
        }
        self.commands.retain(|c| c.id != id);
        Ok(())
    }

    /// Drop every override of a builtin command, then refetch it
    pub async fn reset(&mut self, id: &str) -> Result<(), String> {
        self.error = None;
        if !self.find(id).is_some_and(ChatCommandConfig::is_builtin) {
            return self.fail(format!("'{}' is not a builtin command", id));
        }

        if let Err(e) = self
            .backend
            .reset_chat_command(id, None, self.project())
            .await
        {
            return self.fail(e.to_string());
        }
        self.load().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockBackend;
    use crate::api::LocalBackend;
    use tempfile::TempDir;

    fn mock_with_builtin() -> MockBackend {
        let mock = MockBackend::new();
        mock.state().commands.push(ChatCommandConfig::builtin(
            "ideas",
            "Ideas",
            "Suggest improvements",
            "Analyze...",
        ));
        mock
    }

    async fn loaded(mock: &MockBackend) -> ChatCommandStore<MockBackend> {
        let mut store = ChatCommandStore::new(mock.clone(), None);
        store.load().await;
        store
    }

    #[tokio::test]
    async fn test_create_sends_one_call_with_slug_id() {
        let mock = mock_with_builtin();
        let mut store = loaded(&mock).await;

        let created = store
            .create(ChatCommandDraft {
                id: "My Command".to_string(),
                label: "My Command".to_string(),
                template: "Hello".to_string(),
                scope: Some(ChatCommandScope::Global),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.id, "my-command");
        assert_eq!(mock.call_count("create_chat_command"), 1);
        assert_eq!(mock.state().created[0].id, "my-command");
        assert_eq!(mock.state().created[0].scope, ChatCommandScope::Global);

        // Visible without another list call
        assert_eq!(mock.call_count("list_chat_commands"), 1);
        let listed = store.find("my-command").unwrap();
        assert_eq!(listed.label, "My Command");
        assert_eq!(listed.template, "Hello");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_slug_without_calling_backend() {
        let mock = mock_with_builtin();
        let mut store = loaded(&mock).await;
        let err = store
            .create(ChatCommandDraft {
                id: "!!!".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(err.contains("Invalid command ID"));
        assert_eq!(store.error(), Some(err.as_str()));
        assert_eq!(mock.call_count("create_chat_command"), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_builtin_id() {
        let mock = mock_with_builtin();
        let mut store = loaded(&mock).await;
        assert!(store
            .create(ChatCommandDraft {
                id: "Ideas".to_string(),
                ..Default::default()
            })
            .await
            .is_err());
        assert_eq!(mock.call_count("create_chat_command"), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_lands_in_error_slot() {
        let mock = mock_with_builtin();
        mock.fail_on("create_chat_command");
        let mut store = loaded(&mock).await;
        let result = store
            .create(ChatCommandDraft {
                id: "new".to_string(),
                ..Default::default()
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.error(), Some("create_chat_command failed"));
        assert!(store.find("new").is_none());
    }

    #[tokio::test]
    async fn test_toggle_builtin_writes_override() {
        let mock = mock_with_builtin();
        let mut store = loaded(&mock).await;
        store.toggle_favorite("ideas").await.unwrap();
        store.toggle_enabled("ideas").await.unwrap();

        let ideas = store.find("ideas").unwrap();
        assert!(ideas.favorite);
        assert!(!ideas.enabled);
        assert_eq!(store.favorites().count(), 1);
        assert_eq!(store.enabled().count(), 0);
        assert_eq!(
            mock.state().updated[0].save_scope,
            Some(ChatCommandScope::Global)
        );
    }

    #[tokio::test]
    async fn test_builtin_override_goes_to_project_when_set() {
        let mock = mock_with_builtin();
        let mut store = ChatCommandStore::new(mock.clone(), Some("/tmp/project".to_string()));
        store.load().await;
        store.toggle_enabled("ideas").await.unwrap();
        assert_eq!(
            mock.state().updated[0].save_scope,
            Some(ChatCommandScope::Project)
        );
    }

    #[tokio::test]
    async fn test_delete_builtin_rejected_locally() {
        let mock = mock_with_builtin();
        let mut store = loaded(&mock).await;
        assert!(store.delete("ideas").await.is_err());
        assert_eq!(mock.call_count("delete_chat_command"), 0);
        assert!(store.find("ideas").is_some());
    }

    #[tokio::test]
    async fn test_delete_custom_command() {
        let mock = mock_with_builtin();
        let mut store = loaded(&mock).await;
        store
            .create(ChatCommandDraft {
                id: "temp".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        store.delete("temp").await.unwrap();
        assert!(store.find("temp").is_none());
        assert_eq!(mock.call_count("delete_chat_command"), 1);
    }

    #[tokio::test]
    async fn test_reset_refetches_list() {
        let mock = mock_with_builtin();
        let mut store = loaded(&mock).await;
        store.toggle_favorite("ideas").await.unwrap();
        store.reset("ideas").await.unwrap();

        assert!(!store.find("ideas").unwrap().favorite);
        assert_eq!(mock.call_count("list_chat_commands"), 2);
        assert!(store.reset("missing").await.is_err());
    }

    fn draft(id: &str, scope: ChatCommandScope) -> ChatCommandDraft {
        ChatCommandDraft {
            id: id.to_string(),
            label: id.to_string(),
            template: format!("Run {}", id),
            scope: Some(scope),
            ..Default::default()
        }
    }

    async fn local_store(temp_dir: &TempDir) -> ChatCommandStore<LocalBackend> {
        let project = temp_dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let backend = LocalBackend::new(&temp_dir.path().join("global"), None);
        let mut store = ChatCommandStore::new(backend, Some(project.to_string_lossy().to_string()));
        store.load().await;
        store
    }

    #[tokio::test]
    async fn test_project_command_replaces_global_with_same_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = local_store(&temp_dir).await;

        store.create(draft("deploy", ChatCommandScope::Global)).await.unwrap();
        store.create(draft("deploy", ChatCommandScope::Project)).await.unwrap();
        let local = store.commands().to_vec();

        store.load().await;
        assert_eq!(local, store.commands());
        assert_eq!(local.iter().filter(|c| c.id == "deploy").count(), 1);
        assert_eq!(store.find("deploy").unwrap().scope, ChatCommandScope::Project);
    }

    #[tokio::test]
    async fn test_global_command_lands_before_project_commands() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = local_store(&temp_dir).await;

        store.create(draft("deploy", ChatCommandScope::Project)).await.unwrap();
        store.create(draft("standup", ChatCommandScope::Global)).await.unwrap();
        store.create(draft("deploy", ChatCommandScope::Global)).await.unwrap();
        let local = store.commands().to_vec();

        store.load().await;
        assert_eq!(local, store.commands());
        assert_eq!(store.find("deploy").unwrap().scope, ChatCommandScope::Project);
    }
}
