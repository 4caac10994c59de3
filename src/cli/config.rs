//! CLI configuration from environment variables

use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

use crate::db::postgres::{describe_target, parse_config};

/// Script applied when `MIGRATION_SCRIPT` is not set
pub const DEFAULT_SCRIPT_PATH: &str = "scripts/001_initial_schema.sql";

/// Schema listed after the migration when `MIGRATION_SCHEMA` is not set
pub const DEFAULT_SCHEMA: &str = "public";

/// CLI configuration parsed from environment variables
pub struct CliConfig {
    // PostgreSQL
    pub postgres_url: String,

    // Migration
    pub script_path: PathBuf,
    pub schema: String,
}

impl CliConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration using `lookup` to resolve each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty value is as good as a missing one
        let postgres_url = match lookup("POSTGRES_URL") {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => bail!("POSTGRES_URL environment variable not set"),
        };

        let script_path = lookup("MIGRATION_SCRIPT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_PATH));

        let schema = lookup("MIGRATION_SCHEMA")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        Ok(Self {
            postgres_url,
            script_path,
            schema,
        })
    }

    /// Connection target without the password, for logging
    pub fn target_description(&self) -> String {
        match parse_config(&self.postgres_url) {
            Ok(config) => describe_target(&config),
            Err(_) => "<invalid connection string>".to_string(),
        }
    }
}

// Manual impl so the password never ends up in debug output
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("postgres_url", &self.target_description())
            .field("script_path", &self.script_path)
            .field("schema", &self.schema)
            .finish()
    }
}
