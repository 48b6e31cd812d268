//! Installer configuration, read from `stackup.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::feature::PackageManager;
use crate::io::writer::write_atomic;

pub const DEFAULT_CONFIG_FILE: &str = "stackup.toml";

static PARAM_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("param key regex should compile"));

/// Installer configuration (TOML).
///
/// Every field is optional in the file; missing ones take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StackupConfig {
    /// Package manager used to render `installPackages` commands.
    pub package_manager: PackageManager,

    /// Kill a command after this many seconds. Absent means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,

    /// Captured stdout/stderr per command is truncated beyond this many bytes.
    pub output_limit_bytes: usize,

    /// Default template parameters.
    pub params: BTreeMap<String, String>,
}

impl Default for StackupConfig {
    fn default() -> Self {
        Self {
            package_manager: PackageManager::default(),
            command_timeout_secs: None,
            output_limit_bytes: 100_000,
            params: BTreeMap::new(),
        }
    }
}

impl StackupConfig {
    pub fn validate(&self) -> Result<()> {
        if self.command_timeout_secs == Some(0) {
            return Err(anyhow!("command_timeout_secs must be > 0 when set"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if let Some(key) = self.params.keys().find(|key| !is_param_key(key)) {
            return Err(anyhow!(
                "params key '{key}' must match ^[a-z_][a-z0-9_]*$"
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

pub fn is_param_key(key: &str) -> bool {
    PARAM_KEY.is_match(key)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `StackupConfig::default()`.
pub fn load_config(path: &Path) -> Result<StackupConfig> {
    if !path.exists() {
        let cfg = StackupConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: StackupConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &StackupConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, buf.as_bytes()).with_context(|| format!("write config {}", path.display()))
}
