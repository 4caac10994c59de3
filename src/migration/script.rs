//! SQL script loaded from disk

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a migration file, passed to the driver untouched
#[derive(Debug, Clone)]
pub struct MigrationScript {
    path: PathBuf,
    sql: String,
}

impl MigrationScript {
    /// Read the whole file. Fails if it is missing, unreadable, or not UTF-8.
    pub fn load(path: &Path) -> Result<Self> {
        let sql = fs::read_to_string(path)
            .context(format!("Error leyendo archivo: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            sql,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn size_bytes(&self) -> usize {
        self.sql.len()
    }
}
