use anyhow::Result;

use crate::provision::LinkSpec;
use crate::runtime::Runtime;

use super::config::Config;

/// Link `spec.name` in the working directory to a companion repository's fixtures
#[tracing::instrument(skip(config))]
pub fn link<R: Runtime>(config: Config<R>, spec: LinkSpec) -> Result<()> {
    config.provisioner().provision(&spec, &config.branch)?;
    Ok(())
}
