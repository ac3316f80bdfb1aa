//! Local clone cache for companion repositories.
//!
//! Layout under the cache root (normally `<work_dir>/_src`):
//!
//! ```text
//! _src/
//!   mpf/              <- checkout of the companion repository
//!   mpf.fetched       <- written after the clone finished; holds the branch
//! ```
//!
//! A checkout without its `.fetched` marker was interrupted mid-clone and is
//! never trusted. A marked checkout is kept even when it lacks a package's
//! fixtures; several links may point into it.

use log::{debug, info};
use std::path::PathBuf;

use crate::error::DocPrepError;
use crate::runtime::Runtime;

/// Result of looking a repository up in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheState {
    /// Completed checkout whose fixture directory exists
    Present(PathBuf),
    /// Completed checkout without this package's fixture directory
    MissingFixtures(PathBuf),
    /// Checkout directory left behind by an interrupted clone
    Stale(PathBuf),
    /// Nothing cached for this repository
    Absent,
}

/// Clone cache keyed by repository name.
pub struct CloneCache<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> CloneCache<'a, R> {
    pub fn new(runtime: &'a R, root: PathBuf) -> Self {
        Self { runtime, root }
    }

    /// Directory the repository is (or would be) cloned into.
    pub fn checkout_dir(&self, repo: &str) -> PathBuf {
        self.root.join(repo)
    }

    /// Machine test fixtures of `package` inside the cached checkout.
    pub fn fixtures_dir(&self, repo: &str, package: &str) -> PathBuf {
        self.checkout_dir(repo).join(super::fixtures_subpath(package))
    }

    fn marker_path(&self, repo: &str) -> PathBuf {
        self.root.join(format!("{}.fetched", repo))
    }

    #[tracing::instrument(skip(self))]
    pub fn lookup(&self, repo: &str, package: &str) -> CacheState {
        let checkout = self.checkout_dir(repo);
        if !self.runtime.exists(&checkout) {
            return CacheState::Absent;
        }

        if !self.runtime.exists(&self.marker_path(repo)) {
            debug!("{:?} has no completion marker", checkout);
            return CacheState::Stale(checkout);
        }

        let fixtures = self.fixtures_dir(repo, package);
        if self.runtime.is_dir(&fixtures) {
            CacheState::Present(fixtures)
        } else {
            debug!("{:?} is missing from the cached checkout", fixtures);
            CacheState::MissingFixtures(fixtures)
        }
    }

    /// Remove a cached checkout and its marker.
    #[tracing::instrument(skip(self))]
    pub fn evict(&self, repo: &str) -> Result<(), DocPrepError> {
        let checkout = self.checkout_dir(repo);
        info!("Removing stale checkout {:?}", checkout);
        self.runtime
            .remove_dir_all(&checkout)
            .map_err(|e| DocPrepError::filesystem("remove stale checkout", &checkout, e))?;

        let marker = self.marker_path(repo);
        if self.runtime.exists(&marker) {
            self.runtime
                .remove_file(&marker)
                .map_err(|e| DocPrepError::filesystem("remove", &marker, e))?;
        }
        Ok(())
    }

    /// Clone `url` at `branch` into the cache and mark it complete.
    ///
    /// Returns the checkout directory.
    #[tracing::instrument(skip(self))]
    pub fn fetch(&self, url: &str, branch: &str, repo: &str) -> Result<PathBuf, DocPrepError> {
        self.runtime
            .create_dir_all(&self.root)
            .map_err(|e| DocPrepError::filesystem("create cache directory", &self.root, e))?;

        let checkout = self.checkout_dir(repo);
        self.runtime
            .git_clone(url, branch, &checkout)
            .map_err(|e| DocPrepError::Fetch {
                url: url.to_string(),
                branch: branch.to_string(),
                reason: format!("{:#}", e),
            })?;

        let marker = self.marker_path(repo);
        self.runtime
            .write(&marker, format!("{}\n", branch).as_bytes())
            .map_err(|e| DocPrepError::filesystem("write", &marker, e))?;

        Ok(checkout)
    }
}
