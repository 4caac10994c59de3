//! CLI runner - one-shot schema migration

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::time::Instant;

use crate::db::TableList;
use crate::migration::{MigrationEngine, MigrationReport, MigrationScript};
use super::CliConfig;

/// Run the migration: connect, apply the script, list the resulting tables
pub async fn run() -> Result<()> {
    let start_time = Instant::now();

    // Parse configuration from environment
    let config = CliConfig::from_env()?;

    tracing::info!("Target: {}", config.target_description());
    tracing::info!("Script: {}", config.script_path.display());

    let mut engine = MigrationEngine::new(config.postgres_url.as_str(), config.schema.as_str());

    tracing::info!("Connecting to database...");
    engine.connect().await
        .context("Failed to connect to database")?;

    let script = MigrationScript::load(&config.script_path)
        .context("Failed to read migration script")?;

    tracing::info!("Running migration...");
    engine.apply(&script).await
        .context("Failed to run migration")?;
    tracing::info!("Migration completed successfully!");

    let tables = engine.fetch_tables().await
        .context("Failed to list tables")?;

    let report = MigrationReport {
        script_path: script.path().to_path_buf(),
        script_bytes: script.size_bytes(),
        schema: engine.schema().to_string(),
        tables,
        elapsed: start_time.elapsed(),
    };

    print_report(&report)?;

    engine.close().await
        .context("Failed to close database connection")?;

    Ok(())
}

fn print_report(report: &MigrationReport) -> Result<()> {
    if report.tables.is_empty() {
        tracing::warn!("No tables found in schema '{}'", report.schema);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_table_list(&mut out, &report.tables)
        .context("Failed to write table list")?;
    out.flush()?;

    tracing::info!(
        "Applied {} ({} bytes): {} tables in '{}' after {:.2?}",
        report.script_path.display(),
        report.script_bytes,
        report.tables.len(),
        report.schema,
        report.elapsed
    );

    Ok(())
}

/// Render the table list, one `- name` line per table in catalog order
fn write_table_list<W: Write>(out: &mut W, tables: &TableList) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Created tables:")?;
    for name in tables.names() {
        writeln!(out, "- {}", name)?;
    }
    Ok(())
}
