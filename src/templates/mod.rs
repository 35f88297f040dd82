// Prompt templates: builtin set, cascading lookup, preview and highlighting

pub mod builtin;
pub mod engine;
pub mod highlight;
pub mod resolver;

pub use engine::{extract_error_line, preview, AVAILABLE_VARIABLES};
pub use highlight::{highlight, variable_names, Segment, SegmentKind};
pub use resolver::{ResolvedTemplate, TemplateResolver};

/// Description shown next to a template in listings
pub fn describe_source(scope: crate::models::TemplateScope) -> &'static str {
    use crate::models::TemplateScope;

    match scope {
        TemplateScope::Project => "Project template (.ralph-ui/templates/)",
        TemplateScope::Global => "Global template (~/.ralph-ui/templates/)",
        TemplateScope::Builtin => "Built-in template",
    }
}
