use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::{
    provision::{Branch, LinkProvisioner},
    runtime::{Runtime, absolutize},
    settings::Settings,
};

/// Global options shared by every command.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Working directory (defaults to the current directory)
    pub dir: Option<PathBuf>,
    /// Branch to fetch companion repositories at
    pub branch: Option<String>,
    /// Clone base URL override
    pub remote_base: Option<String>,
    /// Settings file override
    pub config: Option<PathBuf>,
}

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub work_dir: PathBuf,
    pub branch: Branch,
    pub remote_base: String,
    pub settings: Settings,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, options: Options) -> Result<Self> {
        let cwd = runtime.current_dir()?;
        let work_dir = match options.dir {
            Some(dir) => absolutize(&cwd, &dir),
            None => cwd,
        };
        debug!("Working directory: {:?}", work_dir);

        let settings = Settings::load(&runtime, &work_dir, options.config.as_deref())?;

        let branch = match options.branch {
            Some(name) if !name.is_empty() => Branch::Named(name),
            _ => Branch::Checkout(work_dir.clone()),
        };

        let remote_base = options
            .remote_base
            .unwrap_or_else(|| settings.remote_base.clone());

        Ok(Self {
            runtime,
            work_dir,
            branch,
            remote_base,
            settings,
        })
    }

    pub fn provisioner(&self) -> LinkProvisioner<'_, R> {
        LinkProvisioner::new(
            &self.runtime,
            self.work_dir.clone(),
            &self.remote_base,
            &self.settings.cache_dir,
        )
    }

    #[cfg(test)]
    pub fn for_test(runtime: R, work_dir: PathBuf, settings: Settings) -> Self {
        Self {
            runtime,
            branch: Branch::Checkout(work_dir.clone()),
            remote_base: settings.remote_base.clone(),
            work_dir,
            settings,
        }
    }
}
