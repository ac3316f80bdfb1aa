use anyhow::Result;
use std::path::Path;

use crate::runtime::{Runtime, absolutize};
use crate::settings::VersionCheckSettings;
use crate::version::{PrimaryVersion, VersionVerifier};

use super::config::Config;

/// Fail unless the version required by `file` equals the primary version
#[tracing::instrument(skip(config))]
pub fn verify_version<R: Runtime>(
    config: Config<R>,
    file: &Path,
    primary: PrimaryVersion,
    primary_name: &str,
    companion_name: &str,
) -> Result<()> {
    run_check(&config, file, primary, primary_name, companion_name)
}

/// Run the version check described in the settings file
pub(crate) fn run_configured_check<R: Runtime>(
    config: &Config<R>,
    check: &VersionCheckSettings,
) -> Result<()> {
    let primary = check.primary(&config.work_dir)?;
    run_check(
        config,
        &check.file,
        primary,
        &check.primary_name,
        &check.companion_name,
    )
}

fn run_check<R: Runtime>(
    config: &Config<R>,
    file: &Path,
    primary: PrimaryVersion,
    primary_name: &str,
    companion_name: &str,
) -> Result<()> {
    let file = absolutize(&config.work_dir, file);
    let primary = match primary {
        PrimaryVersion::File(path) => PrimaryVersion::File(absolutize(&config.work_dir, &path)),
        literal => literal,
    };

    let verifier = VersionVerifier::new(&config.runtime, primary_name, companion_name);
    let version = verifier.check(&file, &primary)?.into_result()?;
    println!(
        "{} requires {} {}, which matches",
        companion_name, primary_name, version
    );
    Ok(())
}
