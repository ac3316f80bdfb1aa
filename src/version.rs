//! Version verification between a companion repository and the primary codebase.
//!
//! Both sides declare their version with a line of the form
//!
//! ```text
//! __short_version__ = '0.50'
//! ```
//!
//! (single or double quotes). The companion's declared value is the version
//! of the primary codebase it requires.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::DocPrepError;
use crate::runtime::Runtime;

static SHORT_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^__short_version__ = ['"]([^'"]*)['"]"#)
        .expect("short version pattern is valid")
});

/// Extract the value of the first `__short_version__` declaration.
pub fn extract_short_version(contents: &str) -> Option<String> {
    SHORT_VERSION_RE
        .captures(contents)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The primary codebase's short version.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryVersion {
    /// Version given directly
    Literal(String),
    /// Read from the primary codebase's own version declaration file
    File(PathBuf),
}

/// Outcome of a version check. Use [`VersionCheck::into_result`] to turn a
/// failed check into an error.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionCheck {
    /// Both sides declare `version`
    Match { version: String },
    /// The companion requires `required` but the primary codebase is `primary`
    Mismatch {
        primary_name: String,
        companion_name: String,
        primary: String,
        required: String,
    },
    /// No version declaration in `path`
    NotFound { path: PathBuf },
}

impl VersionCheck {
    /// The matched version, or the corresponding error.
    pub fn into_result(self) -> Result<String, DocPrepError> {
        match self {
            VersionCheck::Match { version } => Ok(version),
            VersionCheck::Mismatch {
                primary_name,
                companion_name,
                primary,
                required,
            } => Err(DocPrepError::VersionMismatch {
                primary_name,
                companion: companion_name,
                found: primary,
                required,
            }),
            VersionCheck::NotFound { path } => Err(DocPrepError::Format { path }),
        }
    }
}

/// Checks a companion repository's required version.
pub struct VersionVerifier<'a, R: Runtime> {
    runtime: &'a R,
    primary_name: String,
    companion_name: String,
}

impl<'a, R: Runtime> VersionVerifier<'a, R> {
    /// `primary_name` and `companion_name` only appear in mismatch messages
    /// (e.g. "mpf" and "mpf-examples").
    pub fn new(runtime: &'a R, primary_name: &str, companion_name: &str) -> Self {
        Self {
            runtime,
            primary_name: primary_name.to_string(),
            companion_name: companion_name.to_string(),
        }
    }

    /// Read the version declared in `path`.
    ///
    /// `Ok(None)` when the file has no declaration line.
    pub fn read_declared(&self, path: &Path) -> Result<Option<String>, DocPrepError> {
        let contents = self
            .runtime
            .read_to_string(path)
            .map_err(|e| DocPrepError::filesystem("read", path, e))?;
        Ok(extract_short_version(&contents))
    }

    /// Compare the version required by `version_file` with the primary version.
    ///
    /// The primary version is not looked at when `version_file` declares none.
    #[tracing::instrument(skip(self))]
    pub fn check(
        &self,
        version_file: &Path,
        primary: &PrimaryVersion,
    ) -> Result<VersionCheck, DocPrepError> {
        let Some(required) = self.read_declared(version_file)? else {
            return Ok(VersionCheck::NotFound {
                path: version_file.to_path_buf(),
            });
        };
        debug!("{:?} requires version {}", version_file, required);

        let primary = match primary {
            PrimaryVersion::Literal(version) => version.clone(),
            PrimaryVersion::File(path) => match self.read_declared(path)? {
                Some(version) => version,
                None => return Ok(VersionCheck::NotFound { path: path.clone() }),
            },
        };

        if primary == required {
            Ok(VersionCheck::Match { version: primary })
        } else {
            Ok(VersionCheck::Mismatch {
                primary_name: self.primary_name.clone(),
                companion_name: self.companion_name.clone(),
                primary,
                required,
            })
        }
    }

    /// [`check`](Self::check), failing on anything but a match.
    pub fn verify(&self, version_file: &Path, primary: &PrimaryVersion) -> Result<String, DocPrepError> {
        self.check(version_file, primary)?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn version_file() -> PathBuf {
        PathBuf::from("/work/mpf-examples/_version.py")
    }

    fn runtime_with_file(contents: &'static str) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(version_file()))
            .returning(move |_| Ok(contents.to_string()));
        runtime
    }

    #[test]
    fn test_extract_double_quotes() {
        assert_eq!(
            extract_short_version("__short_version__ = \"0.50.0-dev.1\"\n"),
            Some("0.50.0-dev.1".to_string())
        );
    }

    #[test]
    fn test_extract_single_quotes() {
        assert_eq!(
            extract_short_version("__short_version__ = '0.50.0-dev.1'\n"),
            Some("0.50.0-dev.1".to_string())
        );
    }

    #[test]
    fn test_extract_from_later_line() {
        let contents = "\"\"\"Version info.\"\"\"\n\
                        __version__ = '0.50.0-dev.1'\n\
                        __short_version__ = '0.50'\n\
                        __bcp_version__ = '1.1'\n";
        assert_eq!(extract_short_version(contents), Some("0.50".to_string()));
    }

    #[test]
    fn test_extract_first_match_wins() {
        let contents = "__short_version__ = '0.50'\n__short_version__ = '0.51'\n";
        assert_eq!(extract_short_version(contents), Some("0.50".to_string()));
    }

    #[test]
    fn test_extract_requires_line_start_and_exact_shape() {
        assert_eq!(extract_short_version("  __short_version__ = '0.50'\n"), None);
        assert_eq!(extract_short_version("__short_version__='0.50'\n"), None);
        assert_eq!(extract_short_version("__version__ = '0.50'\n"), None);
        assert_eq!(extract_short_version("# __short_version__ = '0.50'\n"), None);
        assert_eq!(extract_short_version(""), None);
    }

    #[test]
    fn test_extract_empty_value() {
        assert_eq!(
            extract_short_version("__short_version__ = ''\n"),
            Some(String::new())
        );
    }

    #[test]
    fn test_check_match() {
        let runtime = runtime_with_file("__short_version__ = \"0.50.0-dev.1\"\n");
        let verifier = VersionVerifier::new(&runtime, "mpf", "mpf-examples");
        let result = verifier
            .check(&version_file(), &PrimaryVersion::Literal("0.50.0-dev.1".into()))
            .unwrap();
        assert_eq!(
            result,
            VersionCheck::Match {
                version: "0.50.0-dev.1".into()
            }
        );
        assert_eq!(result.into_result().unwrap(), "0.50.0-dev.1");
    }

    #[test]
    fn test_check_mismatch_carries_both_versions() {
        let runtime = runtime_with_file("__short_version__ = \"0.50.0-dev.1\"\n");
        let verifier = VersionVerifier::new(&runtime, "mpf", "mpf-examples");
        let result = verifier
            .check(&version_file(), &PrimaryVersion::Literal("0.49.0".into()))
            .unwrap();
        assert_eq!(
            result,
            VersionCheck::Mismatch {
                primary_name: "mpf".into(),
                companion_name: "mpf-examples".into(),
                primary: "0.49.0".into(),
                required: "0.50.0-dev.1".into(),
            }
        );

        let err = result.into_result().unwrap_err();
        assert!(matches!(err, DocPrepError::VersionMismatch { .. }));
        let msg = err.to_string();
        assert!(msg.contains("0.49.0"));
        assert!(msg.contains("0.50.0-dev.1"));
        assert!(msg.contains("mpf-examples"));
    }

    #[test]
    fn test_check_not_found_never_reads_primary() {
        let mut runtime = runtime_with_file("VERSION = '0.50'\n");
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from("/work/mpf/mpf/_version.py")))
            .never();

        let verifier = VersionVerifier::new(&runtime, "mpf", "mpf-examples");
        let result = verifier
            .check(
                &version_file(),
                &PrimaryVersion::File(PathBuf::from("/work/mpf/mpf/_version.py")),
            )
            .unwrap();
        assert_eq!(result, VersionCheck::NotFound { path: version_file() });

        let err = verifier
            .verify(
                &version_file(),
                &PrimaryVersion::File(PathBuf::from("/work/mpf/mpf/_version.py")),
            )
            .unwrap_err();
        assert!(matches!(err, DocPrepError::Format { .. }));
        assert!(err.to_string().contains("/work/mpf-examples/_version.py"));
    }

    #[test]
    fn test_check_primary_from_file() {
        let primary_file = PathBuf::from("/work/mpf/mpf/_version.py");
        let mut runtime = runtime_with_file("__short_version__ = '0.50'\n");
        runtime
            .expect_read_to_string()
            .with(eq(primary_file.clone()))
            .returning(|_| Ok("__version__ = '0.50.3'\n__short_version__ = '0.50'\n".into()));

        let verifier = VersionVerifier::new(&runtime, "mpf", "mpf-examples");
        let version = verifier
            .verify(&version_file(), &PrimaryVersion::File(primary_file))
            .unwrap();
        assert_eq!(version, "0.50");
    }

    #[test]
    fn test_check_primary_file_without_declaration() {
        let primary_file = PathBuf::from("/work/mpf/mpf/_version.py");
        let mut runtime = runtime_with_file("__short_version__ = '0.50'\n");
        runtime
            .expect_read_to_string()
            .with(eq(primary_file.clone()))
            .returning(|_| Ok("# nothing here\n".into()));

        let verifier = VersionVerifier::new(&runtime, "mpf", "mpf-examples");
        let result = verifier
            .check(&version_file(), &PrimaryVersion::File(primary_file.clone()))
            .unwrap();
        assert_eq!(result, VersionCheck::NotFound { path: primary_file });
    }

    #[test]
    fn test_check_unreadable_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));

        let verifier = VersionVerifier::new(&runtime, "mpf", "mpf-examples");
        let err = verifier
            .check(&version_file(), &PrimaryVersion::Literal("0.50".into()))
            .unwrap_err();
        assert!(matches!(err, DocPrepError::Filesystem { .. }));
    }
}
