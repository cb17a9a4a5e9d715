use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "treecheck.toml";

const CLIENT_ENV: &str = "TREECHECK_CLIENT";
const ADMIN_ENV: &str = "TREECHECK_ADMIN";
const KEEP_SANDBOXES_ENV: &str = "TREECHECK_KEEP_SANDBOXES";

fn default_client() -> PathBuf {
    PathBuf::from("svn")
}

fn default_admin() -> PathBuf {
    PathBuf::from("svnadmin")
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Client binary used by external triggers.
    /// Looked up on `PATH` when it is a bare name.
    #[serde(default = "default_client")]
    client: PathBuf,
    /// Repository admin binary, used to create the repository the
    /// external client exports from
    #[serde(default = "default_admin")]
    admin: PathBuf,
    /// Leave sandbox directories on disk after the test finishes,
    /// so that a failing run can be inspected
    #[serde(default)]
    keep_sandboxes: bool,
    /// Parent directory for sandboxes. Defaults to the system temp dir
    #[serde(default)]
    work_root: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            client: default_client(),
            admin: default_admin(),
            keep_sandboxes: false,
            work_root: None,
        }
    }
}

impl HarnessConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("Loaded harness config from {}", path.display());
        Ok(config)
    }

    /// Look for `treecheck.toml` in `start_dir` and its ancestors.
    pub fn find(start_dir: impl AsRef<Path>) -> Option<Result<Self>> {
        for dir in start_dir.as_ref().ancestors() {
            let config_path = dir.join(CONFIG_FILE_NAME);
            log::debug!("Looking for config at {}", config_path.display());
            if config_path.is_file() {
                return Some(Self::load(&config_path));
            }
        }
        log::debug!("No {} found", CONFIG_FILE_NAME);
        None
    }

    pub fn save(&self, directory: impl AsRef<Path>) -> Result<()> {
        let config_path = directory.as_ref().join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(&self)?;
        fs::write(&config_path, content)?;
        log::info!("Configuration saved to {}", config_path.display());
        Ok(())
    }

    /// Apply `TREECHECK_CLIENT`, `TREECHECK_ADMIN` and `TREECHECK_KEEP_SANDBOXES`.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(client) = lookup(CLIENT_ENV).filter(|c| !c.is_empty()) {
            self.client = PathBuf::from(client);
        }
        if let Some(admin) = lookup(ADMIN_ENV).filter(|a| !a.is_empty()) {
            self.admin = PathBuf::from(admin);
        }
        if let Some(keep) = lookup(KEEP_SANDBOXES_ENV) {
            self.keep_sandboxes = parse_flag(&keep)
                .with_context(|| format!("Invalid value for {KEEP_SANDBOXES_ENV}: {keep:?}"))?;
        }
        Ok(self)
    }

    pub fn client(&self) -> &Path {
        &self.client
    }

    pub fn set_client(&mut self, client: impl Into<PathBuf>) {
        self.client = client.into();
    }

    pub fn admin(&self) -> &Path {
        &self.admin
    }

    pub fn set_admin(&mut self, admin: impl Into<PathBuf>) {
        self.admin = admin.into();
    }

    pub fn keep_sandboxes(&self) -> bool {
        self.keep_sandboxes
    }

    pub fn set_keep_sandboxes(&mut self, keep: bool) {
        self.keep_sandboxes = keep;
    }

    pub fn work_root(&self) -> Option<&Path> {
        self.work_root.as_deref()
    }

    pub fn set_work_root(&mut self, dir: impl Into<PathBuf>) {
        self.work_root = Some(dir.into());
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
