//! reStructuredText prolog warning readers of unreleased documentation.

/// Branches whose documentation gets the dev warning by default.
pub const DEFAULT_DEV_BRANCHES: &[&str] = &["dev"];

/// Prepended to every page of a dev-branch HTML build.
pub const DEV_WARNING_PROLOG: &str = r#"
.. only:: html

   .. warning::

      **This is the dev documentation for an unreleased version of MPF!**

      This is the documentation for MPF |version|, which is the "dev" (next)
      release of MPF that is a work-in-progress. Unless you're specifically
      looking for this version, you probably want to use the version of
      documentation called "latest" which is for the latest released version of
      MPF. That documentation is at
      `docs.missionpinball.org/en/latest <http://docs.missionpinball.org/en/latest>`_.

"#;

/// The dev warning when `branch` is one of `dev_branches`.
///
/// An unknown branch never gets the warning.
pub fn dev_warning_prolog<S: AsRef<str>>(branch: Option<&str>, dev_branches: &[S]) -> Option<&'static str> {
    let branch = branch?;
    dev_branches
        .iter()
        .any(|b| b.as_ref() == branch)
        .then_some(DEV_WARNING_PROLOG)
}
