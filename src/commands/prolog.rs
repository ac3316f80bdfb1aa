use anyhow::Result;
use log::debug;

use crate::prolog::dev_warning_prolog;
use crate::runtime::Runtime;

use super::config::Config;

/// Print the dev warning prolog when building docs for a dev branch
#[tracing::instrument(skip(config))]
pub fn prolog<R: Runtime>(config: Config<R>) -> Result<()> {
    let branch = config.branch.resolve_lenient(&config.runtime);
    debug!("Building docs for branch {:?}", branch);

    if let Some(text) = dev_warning_prolog(branch.as_deref(), &config.settings.dev_branches) {
        print!("{}", text);
    }
    Ok(())
}
