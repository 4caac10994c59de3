//! CLI module for the headless migration run
//!
//! Configured entirely via environment variables.

mod config;
mod runner;

pub use config::CliConfig;
pub use runner::run;
