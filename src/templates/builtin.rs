// Built-in prompt templates (read-only, compiled in)

/// Built-in template names
pub const TASK_PROMPT: &str = "task_prompt";
pub const TASK_WITH_PRD: &str = "task_with_prd";
pub const BUG_FIX: &str = "bug_fix";
pub const FEATURE: &str = "feature";
pub const REFACTOR: &str = "refactor";
pub const TEST: &str = "test";

/// Get a specific built-in template
pub fn get_builtin_template(name: &str) -> Option<&'static str> {
    match name {
        TASK_PROMPT => Some(TASK_PROMPT_TEMPLATE),
        TASK_WITH_PRD => Some(TASK_WITH_PRD_TEMPLATE),
        BUG_FIX => Some(BUG_FIX_TEMPLATE),
        FEATURE => Some(FEATURE_TEMPLATE),
        REFACTOR => Some(REFACTOR_TEMPLATE),
        TEST => Some(TEST_TEMPLATE),
        _ => None,
    }
}

/// List all built-in template names
pub fn list_builtin_templates() -> Vec<&'static str> {
    vec![TASK_PROMPT, TASK_WITH_PRD, BUG_FIX, FEATURE, REFACTOR, TEST]
}

pub fn is_builtin(name: &str) -> bool {
    get_builtin_template(name).is_some()
}

// Template definitions

const TASK_PROMPT_TEMPLATE: &str = r#"You are working on: {{ task.title }}

## Description
{{ task.description }}
{% if acceptance_criteria | length > 0 %}

## Acceptance Criteria
{% for criterion in acceptance_criteria %}
- {{ criterion }}
{% endfor %}
{% endif %}
{% if dependencies | length > 0 %}

## Completed Dependencies
{% for dep in dependencies %}
- {{ dep.title }} ({{ dep.status }})
{% endfor %}
{% endif %}

## Instructions
- Complete the task described above
- Keep changes focused on this task
- Add or update tests where behavior changes
"#;

const TASK_WITH_PRD_TEMPLATE: &str = r#"You are working on: {{ task.title }}

## Description
{{ task.description }}
{% if prd_content %}

## PRD Context
{{ prd_content }}
{% endif %}
{% if acceptance_criteria | length > 0 %}

## Acceptance Criteria
{% for criterion in acceptance_criteria %}
- {{ criterion }}
{% endfor %}
{% endif %}

## Progress
{{ prd_completed_count }} of {{ prd_total_count }} stories complete.

## Instructions
- Read the PRD context before starting
- Implement only what this story asks for
"#;

const BUG_FIX_TEMPLATE: &str = r#"# Bug Fix: {{ task.title }}

## Report
{{ task.description }}

## Steps
1. Reproduce the failure
2. Find the root cause
3. Fix it and add a regression test
{% if acceptance_criteria | length > 0 %}

## Done When
{% for criterion in acceptance_criteria %}
- {{ criterion }}
{% endfor %}
{% endif %}
"#;

const FEATURE_TEMPLATE: &str = r#"# Feature: {{ task.title }}

{{ task.description }}
{% if acceptance_criteria | length > 0 %}

## Acceptance Criteria
{% for criterion in acceptance_criteria %}
- {{ criterion }}
{% endfor %}
{% endif %}
{% if codebase_patterns %}

## Codebase Patterns
{{ codebase_patterns }}
{% endif %}

Build the feature incrementally and cover it with tests.
"#;

const REFACTOR_TEMPLATE: &str = r#"# Refactoring: {{ task.title }}

## Goal
{{ task.description }}

External behavior must not change. Run the existing test suite before and
after each step.
"#;

const TEST_TEMPLATE: &str = r#"# Testing Task: {{ task.title }}

## What to Cover
{{ task.description }}
{% if acceptance_criteria | length > 0 %}
{% for criterion in acceptance_criteria %}
- {{ criterion }}
{% endfor %}
{% endif %}

Prefer deterministic, independent tests with descriptive names.
"#;
