//! Git operations (active branch lookup, clone).
//!
//! Both operations shell out to the `git` executable on `PATH`.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::{Command, Output};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn git_current_branch_impl(&self, repo_dir: &Path) -> Result<String> {
        let output = Command::new("git")
            .args(["symbolic-ref", "--short", "-q", "HEAD"])
            .current_dir(repo_dir)
            .output()
            .context("Failed to run git")?;

        if !output.status.success() {
            let stderr = stderr_text(&output);
            if stderr.is_empty() {
                // `-q` keeps git silent when HEAD exists but is not a symbolic ref
                bail!("HEAD is detached, not on a branch");
            }
            bail!("{}", stderr);
        }

        let branch = String::from_utf8(output.stdout)
            .context("Branch name is not valid UTF-8")?
            .trim()
            .to_string();
        if branch.is_empty() {
            bail!("HEAD is detached, not on a branch");
        }
        debug!("Active branch of {:?} is {}", repo_dir, branch);
        Ok(branch)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn git_clone_impl(&self, url: &str, branch: &str, dest: &Path) -> Result<()> {
        let output = Command::new("git")
            .arg("clone")
            .args(["--branch", branch])
            .arg("--")
            .arg(url)
            .arg(dest)
            .output()
            .context("Failed to run git")?;

        if !output.status.success() {
            let stderr = stderr_text(&output);
            if stderr.is_empty() {
                bail!("git clone exited with {}", output.status);
            }
            bail!("{}", stderr);
        }
        Ok(())
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use std::path::Path;
    use std::process::Command;
    use tempfile::tempdir;

    pub(crate) fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub(crate) fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.name=docprep",
                "-c",
                "user.email=docprep@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "init.defaultBranch=main",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {:?} failed in {:?}", args, dir);
    }

    /// Create a repository at `dir` with one commit on `branch`.
    pub(crate) fn init_repo(dir: &Path, branch: &str) {
        std::fs::create_dir_all(dir).unwrap();
        git(dir, &["init", "-q"]);
        git(dir, &["checkout", "-q", "-b", branch]);
        std::fs::write(dir.join("README"), "companion\n").unwrap();
        git(dir, &["add", "README"]);
        git(dir, &["commit", "-q", "-m", "init"]);
    }

    #[test]
    fn test_current_branch_of_checkout() {
        if !git_available() {
            return;
        }
        let dir = tempdir().unwrap();
        init_repo(dir.path(), "dev");

        let runtime = RealRuntime;
        assert_eq!(runtime.git_current_branch(dir.path()).unwrap(), "dev");
    }

    #[test]
    fn test_current_branch_detached_head_fails() {
        if !git_available() {
            return;
        }
        let dir = tempdir().unwrap();
        init_repo(dir.path(), "dev");
        git(dir.path(), &["checkout", "-q", "--detach"]);

        let runtime = RealRuntime;
        let err = runtime.git_current_branch(dir.path()).unwrap_err();
        assert!(err.to_string().contains("detached"));
    }

    #[test]
    fn test_current_branch_outside_repository_fails() {
        if !git_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        // GIT_CEILING_DIRECTORIES is not set here, so only assert failure when the
        // temp dir is not itself nested in a checkout.
        if Command::new("git")
            .args(["rev-parse", "--git-dir"])
            .current_dir(dir.path())
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return;
        }
        assert!(runtime.git_current_branch(dir.path()).is_err());
    }

    #[test]
    fn test_clone_branch() {
        if !git_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let upstream = dir.path().join("upstream/mpf");
        init_repo(&upstream, "dev");

        let dest = dir.path().join("_src/mpf");
        let runtime = RealRuntime;
        runtime
            .git_clone(upstream.to_str().unwrap(), "dev", &dest)
            .unwrap();

        assert!(dest.join(".git").is_dir());
        assert!(dest.join("README").is_file());
        assert_eq!(runtime.git_current_branch(&dest).unwrap(), "dev");
    }

    #[test]
    fn test_clone_missing_branch_fails() {
        if !git_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let upstream = dir.path().join("upstream/mpf");
        init_repo(&upstream, "dev");

        let dest = dir.path().join("_src/mpf");
        let runtime = RealRuntime;
        let result = runtime.git_clone(upstream.to_str().unwrap(), "0.57", &dest);
        assert!(result.is_err());
    }
}
