use anyhow::Result;
use log::info;

use crate::runtime::Runtime;

use super::config::Config;
use super::verify::run_configured_check;

/// Provision every configured link, then run the configured version check.
///
/// Stops at the first failure.
#[tracing::instrument(skip(config))]
pub fn setup<R: Runtime>(config: Config<R>) -> Result<()> {
    if config.settings.links.is_empty() && config.settings.version_check.is_none() {
        info!("Nothing to set up");
        return Ok(());
    }

    let provisioner = config.provisioner();
    for spec in &config.settings.links {
        provisioner.provision(spec, &config.branch)?;
    }

    if let Some(check) = &config.settings.version_check {
        run_configured_check(&config, check)?;
    }
    Ok(())
}
