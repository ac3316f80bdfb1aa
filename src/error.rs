//! Error types for link provisioning and version verification.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the provisioning and verification operations.
///
/// None of these are recovered internally; they propagate to the build
/// driver, which reports the message and stops.
#[derive(Debug, Error)]
pub enum DocPrepError {
    /// Cloning a companion repository failed.
    #[error("Failed to clone {url} (branch '{branch}'): {reason}")]
    Fetch {
        url: String,
        branch: String,
        reason: String,
    },

    /// A file-system mutation or read was rejected.
    #[error("Failed to {action} {}: {reason}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// The active branch of a checkout could not be determined.
    #[error("Cannot determine active branch of {}: {reason}", path.display())]
    RepositoryState { path: PathBuf, reason: String },

    /// A link name, repository or package is not a single path segment.
    #[error("Invalid {field} '{value}': must be a non-empty single path segment")]
    InvalidLink { field: &'static str, value: String },

    /// No version declaration line was found.
    #[error("Unable to find version string in {}.", path.display())]
    Format { path: PathBuf },

    /// The companion requires a different primary version.
    #[error(
        "{companion} version mismatch. {primary_name} is version {found} \
         but the {companion} repo found requires {primary_name} {required}"
    )]
    VersionMismatch {
        primary_name: String,
        companion: String,
        found: String,
        required: String,
    },
}

impl DocPrepError {
    pub(crate) fn filesystem(action: &'static str, path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        DocPrepError::Filesystem {
            action,
            path: path.into(),
            reason: format!("{:#}", err),
        }
    }
}
