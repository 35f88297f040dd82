//! Prompt template models shared by the template editor and backends

use serde::{Deserialize, Serialize};

/// Where a template lives
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TemplateScope {
    /// Project-level template in .ralph-ui/templates/
    Project,
    /// Global template in ~/.ralph-ui/templates/
    Global,
    /// Built-in template (compiled into the application, read-only)
    Builtin,
}

impl TemplateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateScope::Project => "project",
            TemplateScope::Global => "global",
            TemplateScope::Builtin => "builtin",
        }
    }
}

impl std::fmt::Display for TemplateScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for TemplateScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(TemplateScope::Project),
            "global" => Ok(TemplateScope::Global),
            "builtin" => Ok(TemplateScope::Builtin),
            _ => Err(format!(
                "Invalid scope '{}'. Use 'project' or 'global'",
                s
            )),
        }
    }
}

/// Template listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub name: String,
    pub source: TemplateScope,
    pub description: String,
}

/// Raw preview result as returned by the renderer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreviewResult {
    /// Whether the template rendered successfully
    pub success: bool,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// 1-based line where the error occurred (if available)
    #[serde(default)]
    pub error_line: Option<usize>,
    #[serde(default)]
    pub variables_used: Vec<String>,
    #[serde(default)]
    pub variables_unused: Vec<String>,
}
