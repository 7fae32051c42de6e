//! Shared-root resolution and the provisioned directory structure.

use crate::constants;
use crate::util::path;
use anyhow::{bail, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub config: PathBuf,
    pub experiments: PathBuf,
    pub scripts: PathBuf,
    pub placeholder: PathBuf,
}

impl Layout {
    /// Resolve the shared root from CLI arg, env var, or the built-in default.
    pub fn resolve(root_arg: Option<PathBuf>) -> Result<Self> {
        Self::resolve_with(root_arg, env::var_os(constants::ROOT_ENV_VAR))
    }

    /// Resolution with the environment value passed in. An empty value counts as unset.
    pub fn resolve_with(root_arg: Option<PathBuf>, env_root: Option<OsString>) -> Result<Self> {
        let root = match (root_arg, env_root) {
            (Some(root), _) => root,
            (None, Some(root)) if !root.is_empty() => PathBuf::from(root),
            _ => PathBuf::from(constants::DEFAULT_SHARED_ROOT),
        };
        let layout = Self::from_root(root);
        layout.validate()?;
        Ok(layout)
    }

    /// Derive every provisioned path from the shared root.
    pub fn from_root(root: PathBuf) -> Self {
        let config = root.join(constants::CONFIG_DIR);
        let experiments = root.join(constants::EXPERIMENTS_DIR);
        let scripts = root.join(constants::SCRIPTS_DIR);
        let placeholder = scripts.join(constants::PLACEHOLDER_FILE);
        Self {
            root,
            config,
            experiments,
            scripts,
            placeholder,
        }
    }

    /// Directories to ensure, in creation order.
    pub fn directories(&self) -> [&Path; 3] {
        [&self.config, &self.experiments, &self.scripts]
    }

    /// Every derived path must sit under the root.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            bail!("shared root must not be empty");
        }
        for p in self
            .directories()
            .into_iter()
            .chain([self.placeholder.as_path()])
        {
            if !path::is_under(p, &self.root) {
                bail!(
                    "{} escapes shared root {}",
                    p.display(),
                    self.root.display()
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layout@{}", self.root.display())
    }
}
