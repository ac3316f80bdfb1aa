//! Selection of the branch to fetch companion repositories at.

use log::debug;
use std::path::PathBuf;

use crate::error::DocPrepError;
use crate::runtime::Runtime;

/// Which branch the documentation is being built for.
///
/// `Checkout` defers the git lookup until a fetch actually needs it, so a
/// build whose links are all satisfied locally never requires a checkout.
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    /// Branch supplied by the caller (e.g. `--branch` or a CI variable)
    Named(String),
    /// Use the branch checked out in this directory
    Checkout(PathBuf),
}

impl Branch {
    /// Resolve to a branch name.
    pub fn resolve<R: Runtime>(&self, runtime: &R) -> Result<String, DocPrepError> {
        match self {
            Branch::Named(name) => Ok(name.clone()),
            Branch::Checkout(dir) => {
                runtime
                    .git_current_branch(dir)
                    .map_err(|e| DocPrepError::RepositoryState {
                        path: dir.clone(),
                        reason: format!("{:#}", e),
                    })
            }
        }
    }

    /// Resolve to a branch name, treating lookup failure as "unknown".
    pub fn resolve_lenient<R: Runtime>(&self, runtime: &R) -> Option<String> {
        match self.resolve(runtime) {
            Ok(name) => Some(name),
            Err(e) => {
                debug!("Branch unknown: {}", e);
                None
            }
        }
    }
}
