//! Typed descriptors for generated files and their rendering.
//!
//! What a feature generates is declared here; when it gets written is decided
//! by the `writeArtifact` step that references it.

use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior};

use crate::core::error::InstallError;

/// Template parameters, keyed by identifier.
pub type RenderParams = BTreeMap<String, String>;

/// A file a feature writes: project-relative path plus a minijinja template.
///
/// The path is itself a template so generated file names can follow parameters.
/// Templates that place a parameter inside a string literal use the `tojson`
/// filter so quotes and backslashes in values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
    pub path: &'static str,
    pub template: &'static str,
}

impl Artifact {
    pub const fn new(path: &'static str, template: &'static str) -> Self {
        Self { path, template }
    }

    /// Render the project-relative output path.
    pub fn render_path(&self, params: &RenderParams) -> Result<String, InstallError> {
        render_template(self.path, params).map_err(|err| self.render_error(err))
    }

    /// Render the template. Referencing a parameter that is not supplied is an error.
    pub fn render(&self, params: &RenderParams) -> Result<Vec<u8>, InstallError> {
        let rendered =
            render_template(self.template, params).map_err(|err| self.render_error(err))?;
        Ok(rendered.into_bytes())
    }

    fn render_error(&self, err: minijinja::Error) -> InstallError {
        InstallError::ArtifactRender {
            path: self.path.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Render a one-off template with strict undefined handling.
pub fn render_template(template: &str, params: &RenderParams) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.render_str(template, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RenderParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_substitutes_params_and_keeps_trailing_newline() {
        let artifact = Artifact::new("messages/en.json", "{ \"title\": \"{{ project_name }}\" }\n");
        let bytes = artifact
            .render(&params(&[("project_name", "acme")]))
            .expect("render");
        assert_eq!(bytes, b"{ \"title\": \"acme\" }\n");
    }

    #[test]
    fn render_fails_on_missing_param() {
        let artifact = Artifact::new("src/i18n.ts", "locale = '{{ default_locale }}'\n");
        let err = artifact.render(&RenderParams::new()).unwrap_err();
        match err {
            InstallError::ArtifactRender { path, .. } => assert_eq!(path, "src/i18n.ts"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn render_path_follows_params() {
        let artifact = Artifact::new("messages/{{ default_locale }}.json", "{}\n");
        let path = artifact
            .render_path(&params(&[("default_locale", "de")]))
            .expect("render path");
        assert_eq!(path, "messages/de.json");
    }

    #[test]
    fn tojson_escapes_quotes_and_backslashes() {
        let artifact = Artifact::new(
            "messages/en.json",
            "{ \"title\": {{ project_name | tojson }} }\n",
        );
        let bytes = artifact
            .render(&params(&[("project_name", r#"my "app" \ co"#)]))
            .expect("render");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(value["title"], r#"my "app" \ co"#);
    }

    #[test]
    fn render_passes_plain_text_through() {
        let artifact = Artifact::new(".editorconfig", "root = true\n\n[*]\nindent_size = 2\n");
        let bytes = artifact.render(&RenderParams::new()).expect("render");
        assert_eq!(bytes, b"root = true\n\n[*]\nindent_size = 2\n");
    }
}
