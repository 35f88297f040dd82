//! Template editor state and preview adapter
//!
//! Tracks the template list, the selected template's content and a preview of
//! the editor text. Builtin templates cannot be saved over or deleted; they
//! are customized by saving a copy into project or global scope and reset by
//! deleting that copy.

use crate::api::TemplateApi;
use crate::models::{TemplateInfo, TemplatePreviewResult, TemplateScope};
use crate::templates::{highlight, Segment};

/// Result of previewing the editor text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Rendered {
        output: String,
        variables_used: Vec<String>,
        variables_unused: Vec<String>,
    },
    Failed {
        message: String,
        /// 1-based line of the error, when the renderer reported one
        line: Option<usize>,
    },
}

impl From<TemplatePreviewResult> for PreviewOutcome {
    fn from(result: TemplatePreviewResult) -> Self {
        if result.success {
            PreviewOutcome::Rendered {
                output: result.output.unwrap_or_default(),
                variables_used: result.variables_used,
                variables_unused: result.variables_unused,
            }
        } else {
            PreviewOutcome::Failed {
                message: result
                    .error
                    .unwrap_or_else(|| "Template rendering failed".to_string()),
                line: result.error_line,
            }
        }
    }
}

pub struct TemplateEditor<B> {
    backend: B,
    project_path: Option<String>,
    templates: Vec<TemplateInfo>,
    selected: Option<TemplateInfo>,
    content: String,
    saved_content: String,
    preview: Option<PreviewOutcome>,
    loading: bool,
    saving: bool,
    previewing: bool,
    error: Option<String>,
}

impl<B: TemplateApi> TemplateEditor<B> {
    pub fn new(backend: B, project_path: Option<String>) -> Self {
        Self {
            backend,
            project_path,
            templates: Vec::new(),
            selected: None,
            content: String::new(),
            saved_content: String::new(),
            preview: None,
            loading: false,
            saving: false,
            previewing: false,
            error: None,
        }
    }

    pub fn templates(&self) -> &[TemplateInfo] {
        &self.templates
    }

    pub fn selected(&self) -> Option<&TemplateInfo> {
        self.selected.as_ref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_modified(&self) -> bool {
        self.content != self.saved_content
    }

    pub fn preview(&self) -> Option<&PreviewOutcome> {
        self.preview.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn project(&self) -> Option<&str> {
        self.project_path.as_deref()
    }

    /// Highlighted segments of the editor text
    pub fn highlighted(&self) -> Vec<Segment<'_>> {
        highlight(&self.content)
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Create a new, unsaved template
    pub fn start_new(&mut self) {
        self.selected = None;
        self.content.clear();
        self.saved_content.clear();
        self.preview = None;
    }

    pub async fn load_templates(&mut self) {
        self.loading = true;
        self.error = None;
        match self.backend.list_templates(self.project()).await {
            Ok(templates) => self.templates = templates,
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Load `name` into the editor. The list is fetched first when it does
    /// not know `name` yet, so the selection carries the real source.
    pub async fn select(&mut self, name: &str) {
        self.error = None;
        if !self.templates.iter().any(|t| t.name == name) {
            self.load_templates().await;
        }

        self.loading = true;
        match self.backend.get_template_content(name, self.project()).await {
            Ok(content) => {
                self.selected = self
                    .templates
                    .iter()
                    .find(|t| t.name == name)
                    .cloned()
                    .or_else(|| {
                        log::warn!("[TemplateEditor::select] '{}' is not listed", name);
                        Some(TemplateInfo {
                            name: name.to_string(),
                            source: TemplateScope::Builtin,
                            description: String::new(),
                        })
                    });
                self.saved_content = content.clone();
                self.content = content;
                self.preview = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Save the editor text as `name` in `scope` and refresh the list
    pub async fn save_as(&mut self, name: &str, scope: TemplateScope) {
        if scope == TemplateScope::Builtin {
            self.error = Some("Builtin templates are read-only".to_string());
            return;
        }
        if name.trim().is_empty() {
            self.error = Some("Template name is required".to_string());
            return;
        }

        self.saving = true;
        self.error = None;
        let result = self
            .backend
            .save_template(name, &self.content, scope, self.project())
            .await;
        self.saving = false;

        match result {
            Ok(()) => {
                log::info!("[TemplateEditor::save_as] Saved '{}' to {} scope", name, scope);
                self.saved_content = self.content.clone();
                self.selected = Some(TemplateInfo {
                    name: name.to_string(),
                    source: scope,
                    description: String::new(),
                });
                self.load_templates().await;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Save over the selected template. A builtin is forked into `scope`.
    pub async fn save(&mut self, scope_for_builtin: TemplateScope) {
        let Some(selected) = self.selected.clone() else {
            self.error = Some("No template selected".to_string());
            return;
        };
        let scope = match selected.source {
            TemplateScope::Builtin => scope_for_builtin,
            other => other,
        };
        self.save_as(&selected.name, scope).await;
    }

    pub async fn delete(&mut self, name: &str, scope: TemplateScope) {
        if scope == TemplateScope::Builtin {
            self.error = Some("Builtin templates cannot be deleted".to_string());
            return;
        }

        self.error = None;
        match self
            .backend
            .delete_template(name, scope, self.project())
            .await
        {
            Ok(()) => {
                if self
                    .selected
                    .as_ref()
                    .is_some_and(|t| t.name == name && t.source == scope)
                {
                    self.start_new();
                }
                self.load_templates().await;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Render the editor text. The editor content is left untouched.
    pub async fn run_preview(&mut self) -> Option<&PreviewOutcome> {
        self.previewing = true;
        let outcome = match self
            .backend
            .preview_template(&self.content, self.project())
            .await
        {
            Ok(result) => PreviewOutcome::from(result),
            Err(e) => PreviewOutcome::Failed {
                message: e.to_string(),
                line: None,
            },
        };
        self.previewing = false;
        self.preview = Some(outcome);
        self.preview.as_ref()
    }
}
