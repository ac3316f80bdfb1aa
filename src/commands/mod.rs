//! Command entry points used by the CLI.
//!
//! Each command takes a [`Config`] built from the global options and returns
//! `anyhow::Result`; typed [`DocPrepError`](crate::error::DocPrepError)s stay
//! reachable through `downcast_ref`.

pub mod config;
mod link;
mod prolog;
mod setup;
mod verify;

pub use config::{Config, Options};
pub use link::link;
pub use prolog::prolog;
pub use setup::setup;
pub use verify::verify_version;
