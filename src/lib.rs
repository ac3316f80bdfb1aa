pub mod commands;
pub mod error;
pub mod prolog;
pub mod provision;
pub mod runtime;
pub mod settings;
pub mod version;
