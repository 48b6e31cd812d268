//! In-memory model of the project manifest (`package.json`).
//!
//! The document keeps key order (serde_json `preserve_order`), so a
//! read-modify-write cycle only touches the keys a patch names.

use std::sync::LazyLock;

use jsonschema::Validator;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::artifact::{RenderParams, render_template};
use crate::core::error::ManifestError;

const MANIFEST_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/package_manifest.schema.json"
));

static MANIFEST_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(MANIFEST_SCHEMA).expect("manifest schema should be valid json");
    jsonschema::validator_for(&schema).expect("manifest schema should compile")
});

/// Ordered key-value sections of the manifest that features touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ManifestSection {
    Dependencies,
    DevDependencies,
    Scripts,
}

impl ManifestSection {
    pub fn key(self) -> &'static str {
        match self {
            ManifestSection::Dependencies => "dependencies",
            ManifestSection::DevDependencies => "devDependencies",
            ManifestSection::Scripts => "scripts",
        }
    }
}

/// Declarative manifest edit.
///
/// Section entries are inserted or overwritten. Top-level `fields` are only
/// set when the manifest lacks them; their values are templates that render
/// to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestPatch {
    pub fields: &'static [(&'static str, &'static str)],
    pub scripts: &'static [(&'static str, &'static str)],
    pub dependencies: &'static [(&'static str, &'static str)],
    pub dev_dependencies: &'static [(&'static str, &'static str)],
}

impl ManifestPatch {
    pub const EMPTY: ManifestPatch = ManifestPatch {
        fields: &[],
        scripts: &[],
        dependencies: &[],
        dev_dependencies: &[],
    };

    pub const fn scripts(entries: &'static [(&'static str, &'static str)]) -> Self {
        ManifestPatch {
            scripts: entries,
            ..Self::EMPTY
        }
    }

    fn sections(&self) -> [(ManifestSection, &'static [(&'static str, &'static str)]); 3] {
        [
            (ManifestSection::Scripts, self.scripts),
            (ManifestSection::Dependencies, self.dependencies),
            (ManifestSection::DevDependencies, self.dev_dependencies),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDoc {
    root: Map<String, Value>,
}

impl ManifestDoc {
    /// A manifest with no keys, used when the project has none yet.
    pub fn empty() -> Self {
        Self { root: Map::new() }
    }

    /// Parse and validate manifest text.
    pub fn parse(contents: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(contents)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ManifestError> {
        if !value.is_object() {
            return Err(ManifestError::NotAnObject);
        }
        let messages: Vec<String> = MANIFEST_VALIDATOR
            .iter_errors(&value)
            .map(|err| err.to_string())
            .collect();
        if !messages.is_empty() {
            return Err(ManifestError::Schema(messages.join("; ")));
        }
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(ManifestError::NotAnObject),
        }
    }

    pub fn section(&self, section: ManifestSection) -> Option<&Map<String, Value>> {
        self.root.get(section.key()).and_then(Value::as_object)
    }

    pub fn entry(&self, section: ManifestSection, key: &str) -> Option<&str> {
        self.section(section)
            .and_then(|entries| entries.get(key))
            .and_then(Value::as_str)
    }

    /// True if `name` is declared under `dependencies` or `devDependencies`.
    pub fn has_package(&self, name: &str) -> bool {
        [ManifestSection::Dependencies, ManifestSection::DevDependencies]
            .into_iter()
            .any(|section| {
                self.section(section)
                    .is_some_and(|entries| entries.contains_key(name))
            })
    }

    /// Insert or overwrite a single entry, creating the section if absent.
    pub fn set(
        &mut self,
        section: ManifestSection,
        key: &str,
        value: &str,
    ) -> Result<(), ManifestError> {
        let slot = self
            .root
            .entry(section.key())
            .or_insert_with(|| Value::Object(Map::new()));
        let entries = slot
            .as_object_mut()
            .ok_or(ManifestError::SectionNotAnObject(section.key()))?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        Ok(())
    }

    pub fn apply(
        &mut self,
        patch: &ManifestPatch,
        params: &RenderParams,
    ) -> Result<(), ManifestError> {
        for (key, template) in patch.fields {
            if self.root.contains_key(*key) {
                continue;
            }
            let field_error = |reason: String| ManifestError::Field { key: *key, reason };
            let rendered =
                render_template(template, params).map_err(|err| field_error(err.to_string()))?;
            let value: Value =
                serde_json::from_str(&rendered).map_err(|err| field_error(err.to_string()))?;
            self.root.insert((*key).to_string(), value);
        }
        for (section, entries) in patch.sections() {
            for (key, value) in entries {
                self.set(section, key, value)?;
            }
        }
        Ok(())
    }

    /// Pretty-printed JSON with a trailing newline, as package managers write it.
    pub fn to_pretty_string(&self) -> Result<String, ManifestError> {
        let mut buf = serde_json::to_string_pretty(&self.root)?;
        buf.push('\n');
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "name": "demo",
  "version": "0.1.0",
  "scripts": {
    "dev": "next dev",
    "build": "next build"
  },
  "dependencies": {
    "next": "15.1.0"
  },
  "browserslist": ["defaults"]
}
"#;

    #[test]
    fn has_package_checks_both_dependency_sections() {
        let mut doc = ManifestDoc::parse(SAMPLE).expect("parse");
        assert!(doc.has_package("next"));
        assert!(!doc.has_package("vitest"));

        doc.set(ManifestSection::DevDependencies, "vitest", "^2.1.0")
            .expect("set");
        assert!(doc.has_package("vitest"));
    }

    #[test]
    fn apply_overwrites_and_appends_preserving_order() {
        let mut doc = ManifestDoc::parse(SAMPLE).expect("parse");
        doc.apply(
            &ManifestPatch::scripts(&[
                ("build", "prisma generate && next build"),
                ("db:push", "prisma db push"),
            ]),
            &RenderParams::new(),
        )
        .expect("apply");

        let scripts: Vec<&str> = doc
            .section(ManifestSection::Scripts)
            .expect("scripts")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(scripts, vec!["dev", "build", "db:push"]);
        assert_eq!(
            doc.entry(ManifestSection::Scripts, "build"),
            Some("prisma generate && next build")
        );

        let rendered = doc.to_pretty_string().expect("render");
        let keys: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("  \""))
            .map(|line| line.trim().split('"').nth(1).unwrap_or_default())
            .collect();
        assert_eq!(
            keys,
            vec!["name", "version", "scripts", "dependencies", "browserslist"]
        );
        assert!(rendered.ends_with("}\n"));
    }

    #[test]
    fn apply_creates_missing_sections() {
        let mut doc = ManifestDoc::parse("{\"name\":\"demo\"}").expect("parse");
        doc.apply(
            &ManifestPatch {
                dev_dependencies: &[("prettier", "^3.3.0")],
                ..ManifestPatch::EMPTY
            },
            &RenderParams::new(),
        )
        .expect("apply");
        assert_eq!(
            doc.entry(ManifestSection::DevDependencies, "prettier"),
            Some("^3.3.0")
        );
    }

    const NAMED: ManifestPatch = ManifestPatch {
        fields: &[
            ("name", "{{ project_name | tojson }}"),
            ("private", "true"),
        ],
        dependencies: &[("next", "^15.1.0")],
        ..ManifestPatch::EMPTY
    };

    #[test]
    fn fields_are_json_encoded_and_only_fill_gaps() {
        let params = RenderParams::from([("project_name".to_string(), r#"my "app""#.to_string())]);

        let mut fresh = ManifestDoc::empty();
        fresh.apply(&NAMED, &params).expect("apply");
        let reparsed = ManifestDoc::parse(&fresh.to_pretty_string().expect("render"))
            .expect("rendered manifest parses");
        assert_eq!(reparsed.root["name"], r#"my "app""#);
        assert_eq!(reparsed.root["private"], true);

        let mut existing = ManifestDoc::parse(SAMPLE).expect("parse");
        existing.apply(&NAMED, &params).expect("apply");
        assert_eq!(existing.root["name"], "demo");
        assert_eq!(existing.root["private"], true);
        assert_eq!(
            existing.entry(ManifestSection::Dependencies, "next"),
            Some("^15.1.0")
        );
    }

    #[test]
    fn field_with_missing_param_is_an_error() {
        let err = ManifestDoc::empty()
            .apply(&NAMED, &RenderParams::new())
            .unwrap_err();
        assert!(matches!(err, ManifestError::Field { key: "name", .. }));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = ManifestDoc::parse("[1, 2]").unwrap_err();
        assert!(matches!(err, ManifestError::NotAnObject));
    }

    #[test]
    fn rejects_section_with_non_string_values() {
        let err = ManifestDoc::parse("{\"dependencies\": {\"next\": 15}}").unwrap_err();
        assert!(matches!(err, ManifestError::Schema(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = ManifestDoc::parse("{\"name\": ").unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }
}
