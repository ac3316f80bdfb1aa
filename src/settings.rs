//! Build settings loaded from `docprep.json`.
//!
//! Every field is optional; the defaults describe the MPF documentation
//! build (two example links, `dev` as the only dev branch, no version check).

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::prolog::DEFAULT_DEV_BRANCHES;
use crate::provision::{DEFAULT_CACHE_DIR, DEFAULT_REMOTE_BASE, LinkSpec};
use crate::runtime::{Runtime, absolutize};
use crate::version::PrimaryVersion;

/// Settings file looked for in the working directory.
pub const SETTINGS_FILE: &str = "docprep.json";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL companion repositories are cloned from
    pub remote_base: String,
    /// Clone cache directory, relative to the working directory unless absolute
    pub cache_dir: PathBuf,
    /// Links provisioned by `setup`, in order
    pub links: Vec<LinkSpec>,
    /// Branches whose docs carry the dev warning
    pub dev_branches: Vec<String>,
    /// Version check run by `setup` after the links
    pub version_check: Option<VersionCheckSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_base: DEFAULT_REMOTE_BASE.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            links: vec![
                LinkSpec::new("mpf_examples", "mpf", "mpf"),
                LinkSpec::new("mpfmc_examples", "mpf-mc", "mpfmc"),
            ],
            dev_branches: DEFAULT_DEV_BRANCHES.iter().map(|b| b.to_string()).collect(),
            version_check: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VersionCheckSettings {
    /// Companion version declaration file
    pub file: PathBuf,
    /// Primary version given literally
    #[serde(default)]
    pub expected: Option<String>,
    /// Primary codebase's own version declaration file
    #[serde(default)]
    pub primary_file: Option<PathBuf>,
    #[serde(default = "default_primary_name")]
    pub primary_name: String,
    #[serde(default = "default_companion_name")]
    pub companion_name: String,
}

pub fn default_primary_name() -> String {
    "mpf".to_string()
}

pub fn default_companion_name() -> String {
    "mpf-examples".to_string()
}

impl VersionCheckSettings {
    /// The primary version source, with relative paths resolved against `work_dir`.
    pub fn primary(&self, work_dir: &Path) -> Result<PrimaryVersion> {
        match (&self.expected, &self.primary_file) {
            (Some(version), None) => Ok(PrimaryVersion::Literal(version.clone())),
            (None, Some(path)) => Ok(PrimaryVersion::File(absolutize(work_dir, path))),
            (Some(_), Some(_)) => bail!("version_check: set only one of 'expected' and 'primary_file'"),
            (None, None) => bail!("version_check: one of 'expected' or 'primary_file' is required"),
        }
    }
}

impl Settings {
    /// Load settings for `work_dir`.
    ///
    /// An explicit `path` must exist. Without one, `<work_dir>/docprep.json`
    /// is used if present, otherwise the defaults.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, work_dir: &Path, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => absolutize(work_dir, p),
            None => {
                let candidate = work_dir.join(SETTINGS_FILE);
                if !runtime.exists(&candidate) {
                    debug!("No {} in {:?}, using defaults", SETTINGS_FILE, work_dir);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = runtime
            .read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for link in &self.links {
            link.validate()?;
            if !names.insert(link.name.as_str()) {
                bail!("Link '{}' is listed more than once", link.name);
            }
        }
        if let Some(check) = &self.version_check {
            check.primary(Path::new(""))?;
        }
        Ok(())
    }
}
