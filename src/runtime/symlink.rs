//! Symlink operations (create, inspect, remove).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink as unix_symlink;
            unix_symlink(original, link).context("Failed to create symlink")?;
        }
        #[cfg(windows)]
        {
            use anyhow::bail;
            use std::os::windows::fs::{symlink_dir, symlink_file};

            // `is_dir()` on a relative path is relative to CWD; we want it relative to the link's parent.
            let target_path = if original.is_absolute() {
                original.to_path_buf()
            } else {
                link.parent()
                    .context("Failed to get parent directory for symlink")?
                    .join(original)
            };

            if target_path.is_dir() {
                symlink_dir(original, link).context("Failed to create directory symlink")?;
            } else {
                symlink_file(original, link).context("Failed to create file symlink")?;
            }

            if fs::symlink_metadata(link).is_err() {
                bail!(
                    "Symlink creation reported success but link does not exist: link={:?} target={:?}",
                    link,
                    original
                );
            }
        }
        Ok(())
    }

    /// True for any symlink, including one whose target is gone.
    #[tracing::instrument(skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            fs::remove_file(path).context("Failed to remove symlink")?;
        }
        #[cfg(windows)]
        {
            // Directory symlinks need remove_dir, file symlinks need remove_file.
            fs::remove_dir(path)
                .or_else(|_| fs::remove_file(path))
                .context("Failed to remove symlink")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[cfg_attr(
        docprep_skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set DOCPREP_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_real_runtime_directory_symlink() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let fixtures = dir.path().join("mpf/mpf/tests/machine_files");
        runtime.create_dir_all(&fixtures).unwrap();
        std::fs::write(fixtures.join("config.yaml"), "switches:\n").unwrap();

        let link = dir.path().join("docs_examples");
        runtime.symlink(&fixtures, &link).unwrap();
        assert!(runtime.is_symlink(&link));
        assert!(!runtime.is_symlink(&fixtures));

        // Following the link reaches the fixture contents
        assert!(runtime.is_dir(&link));
        let content = runtime.read_to_string(&link.join("config.yaml")).unwrap();
        assert_eq!(content, "switches:\n");
        assert_eq!(std::fs::read_link(&link).unwrap(), fixtures);

        runtime.remove_symlink(&link).unwrap();
        assert!(!runtime.exists(&link));
        assert!(runtime.is_dir(&fixtures));
    }

    #[cfg_attr(
        docprep_skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set DOCPREP_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_dangling_symlink_is_still_a_symlink() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("gone");
        runtime.create_dir_all(&target).unwrap();

        let link = dir.path().join("mpf_examples");
        runtime.symlink(&target, &link).unwrap();
        runtime.remove_dir_all(&target).unwrap();

        // exists() follows the link, is_symlink() does not
        assert!(!runtime.exists(&link));
        assert!(runtime.is_symlink(&link));

        runtime.remove_symlink(&link).unwrap();
        assert!(!runtime.is_symlink(&link));
    }

    #[test]
    fn test_is_symlink_missing_path() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        assert!(!runtime.is_symlink(&dir.path().join("missing")));
    }

    #[test]
    fn test_symlink_fails_when_link_exists() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        runtime.create_dir_all(&target).unwrap();
        let link = dir.path().join("occupied");
        std::fs::write(&link, "not a link").unwrap();

        let result = runtime.symlink(&target, &link);
        assert!(result.is_err());
    }
}
