// Template preview rendering using Tera

use crate::models::TemplatePreviewResult;
use crate::templates::highlight::variable_names;
use regex::Regex;
use serde_json::json;
use std::error::Error as _;
use std::sync::OnceLock;
use tera::{Context, Tera};

/// Context variables every prompt template can reference
pub const AVAILABLE_VARIABLES: &[&str] = &[
    "task",
    "session",
    "acceptance_criteria",
    "dependencies",
    "prd_content",
    "recent_progress",
    "codebase_patterns",
    "prd_completed_count",
    "prd_total_count",
    "selection_reason",
    "current_date",
    "timestamp",
];

/// Sample values used when previewing a template
pub fn sample_context() -> Context {
    let now = chrono::Utc::now();
    let mut ctx = Context::new();

    ctx.insert(
        "task",
        &json!({
            "id": "task-sample-001",
            "title": "Implement user authentication",
            "description": "Add JWT-based authentication to the API endpoints with refresh token support.",
            "status": "pending",
            "priority": 1,
            "branch": "feature/auth",
        }),
    );
    ctx.insert(
        "session",
        &json!({ "id": "session-sample", "name": "Auth rollout" }),
    );
    ctx.insert(
        "acceptance_criteria",
        &vec![
            "Users can log in with email and password",
            "JWT tokens are issued on successful login",
            "Refresh tokens extend the session without a new login",
        ],
    );
    ctx.insert(
        "dependencies",
        &json!([
            { "id": "dep-1", "title": "Set up database schema", "status": "completed" },
            { "id": "dep-2", "title": "Configure environment variables", "status": "completed" },
        ]),
    );
    ctx.insert(
        "prd_content",
        "# Authentication PRD\n\nThis document outlines the authentication requirements.",
    );
    ctx.insert(
        "recent_progress",
        "[Iter 1] Completed database schema setup\n[Iter 2] Added user model",
    );
    ctx.insert(
        "codebase_patterns",
        "## Patterns\n- Keep handlers thin\n- Validate input at the boundary",
    );
    ctx.insert("prd_completed_count", &3);
    ctx.insert("prd_total_count", &10);
    ctx.insert(
        "selection_reason",
        "Highest priority with satisfied dependencies",
    );
    ctx.insert("current_date", &now.format("%Y-%m-%d").to_string());
    ctx.insert("timestamp", &now.to_rfc3339());
    ctx
}

/// Render `content` against the sample context.
///
/// Never fails: render and parse errors are reported inside the result with
/// the 1-based line when the renderer names one.
pub fn preview(content: &str) -> TemplatePreviewResult {
    let variables_used = variable_names(content);
    let variables_unused: Vec<String> = AVAILABLE_VARIABLES
        .iter()
        .filter(|v| !variables_used.iter().any(|used| used == *v))
        .map(|v| v.to_string())
        .collect();

    let mut tera = Tera::default();
    match tera.render_str(content, &sample_context()) {
        Ok(output) => TemplatePreviewResult {
            success: true,
            output: Some(output),
            error: None,
            error_line: None,
            variables_used,
            variables_unused,
        },
        Err(e) => {
            let message = error_chain(&e);
            log::debug!("[preview] Template failed to render: {}", message);
            TemplatePreviewResult {
                success: false,
                output: None,
                error_line: extract_error_line(&message),
                error: Some(message),
                variables_used,
                variables_unused,
            }
        }
    }
}

/// Tera keeps the useful detail (parser position, missing variable) in the
/// error source chain rather than the top-level message.
fn error_chain(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join("\n")
}

/// Extract the 1-based line number from a renderer error message
pub fn extract_error_line(error_msg: &str) -> Option<usize> {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            // Parser position: " --> 3:12"
            Regex::new(r"-->\s*(\d+):\d+").expect("valid regex"),
            Regex::new(r"(?:on|at)\s+line\s+(\d+)").expect("valid regex"),
            Regex::new(r"line\s+(\d+)").expect("valid regex"),
        ]
    });

    patterns.iter().find_map(|pattern| {
        pattern
            .captures(error_msg)
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .filter(|line| *line > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_renders_sample_task() {
        let result = preview("Working on {{ task.title }}");
        assert!(result.success);
        assert_eq!(
            result.output.as_deref(),
            Some("Working on Implement user authentication")
        );
        assert_eq!(result.variables_used, vec!["task"]);
        assert!(result.variables_unused.contains(&"prd_content".to_string()));
        assert!(!result.variables_unused.contains(&"task".to_string()));
    }

    #[test]
    fn test_preview_renders_loops() {
        let result =
            preview("{% for c in acceptance_criteria %}- {{ c }}\n{% endfor %}");
        assert!(result.success);
        assert!(result.output.unwrap().contains("- Users can log in"));
    }

    #[test]
    fn test_preview_reports_syntax_error() {
        let result = preview("line one\n{% if task %}\nunclosed");
        assert!(!result.success);
        assert!(result.output.is_none());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_preview_reports_missing_variable() {
        let result = preview("{{ not_a_variable }}");
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not_a_variable"));
    }

    #[test]
    fn test_extract_error_line() {
        assert_eq!(extract_error_line(" --> 3:12\n  |"), Some(3));
        assert_eq!(extract_error_line("Unexpected token on line 7"), Some(7));
        assert_eq!(extract_error_line("error at line 2, column 4"), Some(2));
        assert_eq!(extract_error_line("something broke"), None);
    }
}
