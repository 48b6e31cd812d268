//! Test doubles and fixtures for executor, chain and installer tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::artifact::RenderParams;
use crate::core::error::InstallError;
use crate::core::feature::PackageManager;
use crate::executor::ExecutionContext;
use crate::io::command::{CommandOutput, CommandRunner};
use crate::io::writer::{ArtifactWriter, FsArtifactWriter};

/// Command runner that records every command and never spawns a process.
///
/// Commands containing any configured needle fail with exit code 1.
/// Successful commands print nothing unless scripted with `stdout_for`.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    fail_needles: Vec<String>,
    stdout: Vec<(String, String)>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_when_contains(mut self, needle: &str) -> Self {
        self.fail_needles.push(needle.to_string());
        self
    }

    pub fn stdout_for(mut self, needle: &str, stdout: &str) -> Self {
        self.stdout.push((needle.to_string(), stdout.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str, _cwd: &Path) -> Result<CommandOutput, InstallError> {
        self.calls.borrow_mut().push(command.to_string());
        if self
            .fail_needles
            .iter()
            .any(|needle| command.contains(needle.as_str()))
        {
            return Err(InstallError::CommandExecution {
                command: command.to_string(),
                exit_code: Some(1),
                detail: "scripted failure".to_string(),
            });
        }
        let stdout = self
            .stdout
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_default();
        Ok(CommandOutput {
            stdout,
            stdout_truncated: 0,
        })
    }
}

/// Writer that records relative paths and writes through to disk, except for
/// paths configured to fail.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    fail_paths: Vec<String>,
    writes: RefCell<Vec<String>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, relative: &str) -> Self {
        self.fail_paths.push(relative.to_string());
        self
    }

    /// Relative paths successfully written, in order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }
}

impl ArtifactWriter for RecordingWriter {
    fn write(&self, root: &Path, relative: &str, contents: &[u8]) -> Result<PathBuf, InstallError> {
        if self.fail_paths.iter().any(|path| path == relative) {
            return Err(InstallError::ArtifactWrite {
                path: root.join(relative),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "scripted failure"),
            });
        }
        let written = FsArtifactWriter.write(root, relative, contents)?;
        self.writes.borrow_mut().push(relative.to_string());
        Ok(written)
    }
}

/// Temporary project directory with builder helpers.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a `package.json` declaring `packages` as dependencies.
    pub fn with_manifest(self, packages: &[&str]) -> Self {
        let dependencies: serde_json::Map<String, serde_json::Value> = packages
            .iter()
            .map(|name| (name.to_string(), serde_json::Value::from("*")))
            .collect();
        let manifest = serde_json::json!({
            "name": "demo",
            "version": "0.1.0",
            "dependencies": dependencies,
        });
        let mut contents = serde_json::to_string_pretty(&manifest).expect("serialize manifest");
        contents.push('\n');
        self.with_file("package.json", &contents)
    }

    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write file");
        self
    }

    /// Every file under the project, keyed by relative path.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        let mut files = BTreeMap::new();
        collect_files(self.dir.path(), self.dir.path(), &mut files);
        files
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut BTreeMap<String, Vec<u8>>) {
    for entry in fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        if path.is_dir() {
            collect_files(root, &path, files);
        } else {
            let relative = path
                .strip_prefix(root)
                .expect("under root")
                .to_string_lossy()
                .replace('\\', "/");
            files.insert(relative, fs::read(&path).expect("read file"));
        }
    }
}

/// Render parameters every built-in template needs.
pub fn default_params() -> RenderParams {
    [
        ("project_name", "demo"),
        ("default_locale", "en"),
        ("database_provider", "postgresql"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

pub fn default_context() -> ExecutionContext {
    ExecutionContext {
        package_manager: PackageManager::Npm,
        params: default_params(),
    }
}
