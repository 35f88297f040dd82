// Template resolution with cascading lookup
//
// Resolution order:
// 1. Project (.ralph-ui/templates/)
// 2. Global (<global dir>/templates/)
// 3. Builtin

use crate::models::TemplateScope;
use crate::templates::builtin;
use crate::utils::{ensure_dir, templates_dir};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const TEMPLATE_EXTENSION: &str = "tera";

/// Resolved template info
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub name: String,
    pub content: String,
    pub source: TemplateScope,
    /// Path to the template file (if file-based)
    pub path: Option<PathBuf>,
}

/// Template resolver with cascading lookup
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    /// Root of the global ralph-ui directory (e.g. ~/.ralph-ui)
    global_dir: PathBuf,
    project_path: Option<PathBuf>,
}

impl TemplateResolver {
    pub fn new(global_dir: &Path) -> Self {
        Self {
            global_dir: global_dir.to_path_buf(),
            project_path: None,
        }
    }

    /// Set the project path for project-level templates
    pub fn with_project_path(mut self, path: Option<&Path>) -> Self {
        self.project_path = path.map(Path::to_path_buf);
        self
    }

    pub fn global_templates_dir(&self) -> PathBuf {
        self.global_dir.join("templates")
    }

    pub fn project_templates_dir(&self) -> Option<PathBuf> {
        self.project_path
            .as_ref()
            .map(|p| templates_dir(&p.to_string_lossy()))
    }

    /// File a template of `name` lives in for a writable scope
    pub fn template_path(&self, name: &str, scope: TemplateScope) -> Result<PathBuf, String> {
        if !is_valid_template_name(name) {
            return Err(format!("Invalid template name '{}'", name));
        }

        let dir = match scope {
            TemplateScope::Project => self
                .project_templates_dir()
                .ok_or("Project path required for project-scoped template")?,
            TemplateScope::Global => self.global_templates_dir(),
            TemplateScope::Builtin => {
                return Err("Builtin templates are read-only".to_string());
            }
        };
        Ok(dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION)))
    }

    /// Resolve a template by name, first match wins
    pub fn resolve(&self, name: &str) -> Result<ResolvedTemplate, String> {
        debug!("Resolving template: {}", name);

        for scope in [TemplateScope::Project, TemplateScope::Global] {
            let Ok(path) = self.template_path(name, scope) else {
                continue;
            };
            if path.exists() {
                let content = fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read template {:?}: {}", path, e))?;
                info!("Template '{}' resolved from {}: {:?}", name, scope, path);
                return Ok(ResolvedTemplate {
                    name: name.to_string(),
                    content,
                    source: scope,
                    path: Some(path),
                });
            }
        }

        if let Some(content) = builtin::get_builtin_template(name) {
            info!("Template '{}' resolved from builtin templates", name);
            return Ok(ResolvedTemplate {
                name: name.to_string(),
                content: content.to_string(),
                source: TemplateScope::Builtin,
                path: None,
            });
        }

        Err(format!("Template '{}' not found in any location", name))
    }

    /// All templates in resolution order; a name shadowed by a higher
    /// priority scope is listed once.
    pub fn list_all(&self) -> Vec<(String, TemplateScope)> {
        let mut templates = Vec::new();
        let mut seen = HashSet::new();

        let scanned = [
            (self.project_templates_dir(), TemplateScope::Project),
            (Some(self.global_templates_dir()), TemplateScope::Global),
        ];
        for (dir, scope) in scanned {
            let Some(dir) = dir else { continue };
            for name in scan_template_dir(&dir) {
                if seen.insert(name.clone()) {
                    templates.push((name, scope));
                }
            }
        }

        for name in builtin::list_builtin_templates() {
            if seen.insert(name.to_string()) {
                templates.push((name.to_string(), TemplateScope::Builtin));
            }
        }

        templates
    }

    pub fn save(&self, name: &str, content: &str, scope: TemplateScope) -> Result<PathBuf, String> {
        let path = self.template_path(name, scope)?;
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        fs::write(&path, content).map_err(|e| format!("Failed to write template: {}", e))?;
        info!("Saved template '{}' to {:?}", name, path);
        Ok(path)
    }

    pub fn delete(&self, name: &str, scope: TemplateScope) -> Result<(), String> {
        let path = self.template_path(name, scope)?;
        if !path.exists() {
            return Err(format!("Template '{}' not found in {} scope", name, scope));
        }
        fs::remove_file(&path).map_err(|e| format!("Failed to delete template: {}", e))?;
        info!("Deleted template '{}' from {:?}", name, path);
        Ok(())
    }
}

/// Template names become file names, so path separators are rejected
fn is_valid_template_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn scan_template_dir(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |e| e == TEMPLATE_EXTENSION))
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TemplateResolver) {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir_all(&project).unwrap();
        let resolver = TemplateResolver::new(&temp_dir.path().join("global"))
            .with_project_path(Some(&project));
        (temp_dir, resolver)
    }

    #[test]
    fn test_resolve_builtin() {
        let (_dir, resolver) = setup();
        let template = resolver.resolve(builtin::TASK_PROMPT).unwrap();
        assert_eq!(template.source, TemplateScope::Builtin);
        assert!(template.path.is_none());
    }

    #[test]
    fn test_project_overrides_global_and_builtin() {
        let (_dir, resolver) = setup();
        resolver
            .save(builtin::TASK_PROMPT, "global {{ task.title }}", TemplateScope::Global)
            .unwrap();
        assert_eq!(
            resolver.resolve(builtin::TASK_PROMPT).unwrap().source,
            TemplateScope::Global
        );

        resolver
            .save(builtin::TASK_PROMPT, "project", TemplateScope::Project)
            .unwrap();
        let template = resolver.resolve(builtin::TASK_PROMPT).unwrap();
        assert_eq!(template.source, TemplateScope::Project);
        assert_eq!(template.content, "project");
    }

    #[test]
    fn test_list_all_deduplicates() {
        let (_dir, resolver) = setup();
        resolver.save("custom", "x", TemplateScope::Global).unwrap();
        resolver.save(builtin::BUG_FIX, "y", TemplateScope::Project).unwrap();

        let all = resolver.list_all();
        let bug_fix: Vec<_> = all.iter().filter(|(n, _)| n == builtin::BUG_FIX).collect();
        assert_eq!(bug_fix.len(), 1);
        assert_eq!(bug_fix[0].1, TemplateScope::Project);
        assert!(all.contains(&("custom".to_string(), TemplateScope::Global)));
    }

    #[test]
    fn test_builtin_scope_is_read_only() {
        let (_dir, resolver) = setup();
        assert!(resolver.save("x", "y", TemplateScope::Builtin).is_err());
        assert!(resolver.delete(builtin::TASK_PROMPT, TemplateScope::Builtin).is_err());
    }

    #[test]
    fn test_project_scope_requires_project() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = TemplateResolver::new(temp_dir.path());
        let err = resolver.save("x", "y", TemplateScope::Project).unwrap_err();
        assert!(err.contains("Project path required"));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let (_dir, resolver) = setup();
        assert!(resolver.save("../escape", "y", TemplateScope::Global).is_err());
    }

    #[test]
    fn test_delete_missing_template() {
        let (_dir, resolver) = setup();
        assert!(resolver.delete("nope", TemplateScope::Global).is_err());
    }
}
