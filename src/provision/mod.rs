//! Link provisioning for companion repository test fixtures.
//!
//! A documentation build links `<work_dir>/<link_name>` to the
//! `<package>/tests/machine_files` directory of a companion repository. The
//! directory is looked for next to the working directory first, then in the
//! clone cache, and only then is the repository cloned.

mod branch;
mod cache;

use log::{debug, info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::DocPrepError;
use crate::runtime::{Runtime, absolutize};

pub use branch::Branch;
pub use cache::{CacheState, CloneCache};

/// Default location companion repositories are cloned from.
pub const DEFAULT_REMOTE_BASE: &str = "https://github.com/missionpinball";

/// Default clone cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "_src";

/// `<package>/tests/machine_files`
pub fn fixtures_subpath(package: &str) -> PathBuf {
    Path::new(package).join("tests").join("machine_files")
}

/// A link to provision: `name` -> fixtures of `package` in `repo`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LinkSpec {
    /// Link name, created in the working directory
    pub name: String,
    /// Companion repository name (e.g. "mpf-mc")
    pub repo: String,
    /// Package directory inside the repository (e.g. "mpfmc")
    pub package: String,
}

impl LinkSpec {
    pub fn new(name: impl Into<String>, repo: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
            package: package.into(),
        }
    }

    /// Each part must be a single, non-empty path segment.
    pub fn validate(&self) -> Result<(), DocPrepError> {
        for (field, value) in [
            ("link name", &self.name),
            ("repository name", &self.repo),
            ("package name", &self.package),
        ] {
            if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
                return Err(DocPrepError::InvalidLink {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Where a provisioned link's target was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// Checkout next to the working directory
    Sibling,
    /// Earlier clone in the cache
    Cache,
    /// Cloned during this call
    Cloned,
}

/// Outcome of a successful provisioning.
#[derive(Debug, Clone, PartialEq)]
pub struct Provisioned {
    pub link: PathBuf,
    pub target: PathBuf,
    pub source: LinkSource,
}

/// Creates fixture links in a working directory.
pub struct LinkProvisioner<'a, R: Runtime> {
    runtime: &'a R,
    work_dir: PathBuf,
    remote_base: String,
    cache: CloneCache<'a, R>,
}

impl<'a, R: Runtime> LinkProvisioner<'a, R> {
    /// `cache_dir` is resolved against `work_dir` when relative.
    pub fn new(runtime: &'a R, work_dir: PathBuf, remote_base: &str, cache_dir: &Path) -> Self {
        let cache = CloneCache::new(runtime, absolutize(&work_dir, cache_dir));
        Self {
            runtime,
            work_dir,
            remote_base: remote_base.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Clone URL of a companion repository.
    pub fn remote_url(&self, repo: &str) -> String {
        format!("{}/{}.git", self.remote_base, repo)
    }

    /// `<work_dir>/../<repo>/<package>/tests/machine_files`
    pub fn sibling_candidate(&self, spec: &LinkSpec) -> PathBuf {
        let relative = Path::new("..").join(&spec.repo).join(fixtures_subpath(&spec.package));
        absolutize(&self.work_dir, &relative)
    }

    /// Make `<work_dir>/<spec.name>` a symlink to the fixture directory of
    /// `spec.repo`/`spec.package`, cloning the repository at `branch` if no
    /// local copy is found.
    ///
    /// Fails without creating the link when the repository has no fixture
    /// directory for `spec.package`.
    #[tracing::instrument(skip(self))]
    pub fn provision(&self, spec: &LinkSpec, branch: &Branch) -> Result<Provisioned, DocPrepError> {
        spec.validate()?;
        let link = self.work_dir.join(&spec.name);
        self.clear_link(&link)?;

        let (target, source) = self.locate(spec, branch)?;

        println!("Creating '{}' link to {}", spec.name, target.display());
        self.runtime
            .symlink(&target, &link)
            .map_err(|e| DocPrepError::filesystem("create link", &link, e))?;

        Ok(Provisioned {
            link,
            target,
            source,
        })
    }

    /// Remove whatever occupies the link name. Directories are left alone.
    fn clear_link(&self, link: &Path) -> Result<(), DocPrepError> {
        if self.runtime.is_symlink(link) {
            debug!("Removing existing link {:?}", link);
            self.runtime
                .remove_symlink(link)
                .map_err(|e| DocPrepError::filesystem("remove existing link", link, e))?;
        } else if self.runtime.is_dir(link) {
            return Err(DocPrepError::Filesystem {
                action: "replace",
                path: link.to_path_buf(),
                reason: "a directory occupies the link name".to_string(),
            });
        } else if self.runtime.exists(link) {
            debug!("Removing existing file {:?}", link);
            self.runtime
                .remove_file(link)
                .map_err(|e| DocPrepError::filesystem("remove existing file", link, e))?;
        }
        Ok(())
    }

    fn locate(&self, spec: &LinkSpec, branch: &Branch) -> Result<(PathBuf, LinkSource), DocPrepError> {
        let sibling = self.sibling_candidate(spec);
        if self.runtime.is_dir(&sibling) {
            debug!("Using sibling checkout {:?}", sibling);
            return Ok((sibling, LinkSource::Sibling));
        }

        match self.cache.lookup(&spec.repo, &spec.package) {
            CacheState::Present(fixtures) => {
                debug!("Using cached checkout {:?}", fixtures);
                return Ok((fixtures, LinkSource::Cache));
            }
            CacheState::MissingFixtures(fixtures) => return Err(missing_fixtures(spec, fixtures)),
            CacheState::Stale(checkout) => {
                warn!("Discarding incomplete checkout {:?}", checkout);
                self.cache.evict(&spec.repo)?;
            }
            CacheState::Absent => {}
        }

        let branch = branch.resolve(self.runtime)?;
        let url = self.remote_url(&spec.repo);
        println!("Cloning {}", spec.repo);
        info!("Cloning {} at branch {}", url, branch);
        self.cache.fetch(&url, &branch, &spec.repo)?;

        // The finished clone stays cached for other links into the same repository
        let fixtures = self.cache.fixtures_dir(&spec.repo, &spec.package);
        if !self.runtime.is_dir(&fixtures) {
            return Err(missing_fixtures(spec, fixtures));
        }
        Ok((fixtures, LinkSource::Cloned))
    }
}

fn missing_fixtures(spec: &LinkSpec, fixtures: PathBuf) -> DocPrepError {
    DocPrepError::Filesystem {
        action: "link",
        path: fixtures,
        reason: format!("no such directory in the {} checkout", spec.repo),
    }
}
