// Template commands against .tera files

use super::LocalBackend;
use crate::api::{ApiError, ApiResult, TemplateApi};
use crate::models::{TemplateInfo, TemplatePreviewResult, TemplateScope};
use crate::templates::{self, describe_source, TemplateResolver};

impl LocalBackend {
    fn template_resolver(&self, project_path: Option<&str>) -> TemplateResolver {
        TemplateResolver::new(&self.global_dir).with_project_path(self.resolve_project(project_path))
    }
}

impl TemplateApi for LocalBackend {
    async fn list_templates(&self, project_path: Option<&str>) -> ApiResult<Vec<TemplateInfo>> {
        Ok(self
            .template_resolver(project_path)
            .list_all()
            .into_iter()
            .map(|(name, source)| TemplateInfo {
                name,
                source,
                description: describe_source(source).to_string(),
            })
            .collect())
    }

    async fn get_template_content(
        &self,
        name: &str,
        project_path: Option<&str>,
    ) -> ApiResult<String> {
        self.template_resolver(project_path)
            .resolve(name)
            .map(|template| template.content)
            .map_err(ApiError::Command)
    }

    async fn save_template(
        &self,
        name: &str,
        content: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        self.template_resolver(project_path)
            .save(name, content, scope)
            .map(|_| ())
            .map_err(ApiError::Command)
    }

    async fn delete_template(
        &self,
        name: &str,
        scope: TemplateScope,
        project_path: Option<&str>,
    ) -> ApiResult<()> {
        self.template_resolver(project_path)
            .delete(name, scope)
            .map_err(ApiError::Command)
    }

    async fn preview_template(
        &self,
        content: &str,
        _project_path: Option<&str>,
    ) -> ApiResult<TemplatePreviewResult> {
        Ok(templates::preview(content))
    }
}
