//! Motor de migración
//!
//! Mantiene la única conexión PostgreSQL de la ejecución, aplica el script
//! y consulta el catálogo.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::db::{PostgresConnection, TableList};
use super::script::MigrationScript;

/// Resultado de una ejecución completa
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub script_path: PathBuf,
    pub script_bytes: usize,
    pub schema: String,
    pub tables: TableList,
    pub elapsed: Duration,
}

/// Motor de migración
pub struct MigrationEngine {
    postgres_url: String,
    schema: String,
    postgres: Option<PostgresConnection>,
}

impl MigrationEngine {
    pub fn new(postgres_url: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            postgres_url: postgres_url.into(),
            schema: schema.into(),
            postgres: None,
        }
    }

    /// Conecta a PostgreSQL
    pub async fn connect(&mut self) -> Result<()> {
        let postgres = PostgresConnection::connect(&self.postgres_url).await?;
        self.postgres = Some(postgres);
        Ok(())
    }

    fn connection(&mut self) -> Result<&mut PostgresConnection> {
        self.postgres
            .as_mut()
            .ok_or_else(|| anyhow!("No hay conexión PostgreSQL abierta"))
    }

    /// Ejecuta el script y confirma la transacción
    pub async fn apply(&mut self, script: &MigrationScript) -> Result<()> {
        tracing::debug!(
            "Aplicando {} ({} bytes)",
            script.path().display(),
            script.size_bytes()
        );

        self.connection()?
            .apply_script(script.sql())
            .await
            .context(format!("Error aplicando {}", script.path().display()))
    }

    /// Tablas existentes en el esquema configurado
    pub async fn fetch_tables(&mut self) -> Result<TableList> {
        let schema = self.schema.clone();
        self.connection()?.list_tables(&schema).await
    }

    /// Libera la conexión. No hace nada si ya estaba cerrada.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(postgres) = self.postgres.take() {
            postgres.close().await?;
        }
        Ok(())
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Disposable server for the ignored tests: `cargo test -- --ignored`
    fn test_url() -> String {
        std::env::var("TEST_POSTGRES_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .expect("TEST_POSTGRES_URL must point at a disposable PostgreSQL server")
    }

    fn script(dir: &std::path::Path, name: &str, sql: &str) -> MigrationScript {
        let path = dir.join(name);
        fs::write(&path, sql).unwrap();
        MigrationScript::load(&path).unwrap()
    }

    async fn drop_schema(url: &str, schema: &str) {
        let mut cleanup = MigrationEngine::new(url, schema);
        cleanup.connect().await.unwrap();
        let dir = tempdir().unwrap();
        let drop_sql = format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE;", schema);
        cleanup
            .apply(&script(dir.path(), "drop.sql", &drop_sql))
            .await
            .unwrap();
        cleanup.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_without_connection() {
        let mut engine = MigrationEngine::new("postgres://localhost/none", "public");
        let err = engine.fetch_tables().await.unwrap_err();
        assert!(err.to_string().contains("conexión"));

        // Closing an engine that never connected is a no-op
        engine.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let mut engine = MigrationEngine::new("postgres://admin@localhost:notaport/db", "public");
        assert!(engine.connect().await.is_err());
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn test_apply_lists_created_tables() {
        let url = test_url();
        let schema = format!("migrate_created_{}", std::process::id());
        drop_schema(&url, &schema).await;

        let dir = tempdir().unwrap();
        let sql = format!(
            "CREATE SCHEMA \"{s}\";
             CREATE TABLE \"{s}\".categories (id TEXT PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE \"{s}\".products (id TEXT PRIMARY KEY, category_id TEXT REFERENCES \"{s}\".categories(id));
             CREATE TABLE \"{s}\".sales (id TEXT PRIMARY KEY);",
            s = schema
        );

        let mut engine = MigrationEngine::new(url.as_str(), schema.as_str());
        engine.connect().await.unwrap();
        engine.apply(&script(dir.path(), "create.sql", &sql)).await.unwrap();
        let tables = engine.fetch_tables().await.unwrap();
        engine.close().await.unwrap();

        let mut names: Vec<String> = tables.into_iter().collect();
        names.sort();
        assert_eq!(names, vec!["categories", "products", "sales"]);

        drop_schema(&url, &schema).await;
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn test_syntax_error_commits_nothing() {
        let url = test_url();
        let schema = format!("migrate_syntax_{}", std::process::id());
        drop_schema(&url, &schema).await;

        let dir = tempdir().unwrap();
        let sql = format!(
            "CREATE SCHEMA \"{s}\";
             CREATE TABLE \"{s}\".first_table (id INT);
             CREATE TABLE \"{s}\".broken (id INT,;",
            s = schema
        );

        let mut engine = MigrationEngine::new(url.as_str(), schema.as_str());
        engine.connect().await.unwrap();
        let err = engine
            .apply(&script(dir.path(), "broken.sql", &sql))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("syntax error"));

        let tables = engine.fetch_tables().await.unwrap();
        assert!(tables.is_empty());
        engine.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn test_second_run_surfaces_duplicate_error() {
        let url = test_url();
        let schema = format!("migrate_twice_{}", std::process::id());
        drop_schema(&url, &schema).await;

        let dir = tempdir().unwrap();
        let sql = format!(
            "CREATE SCHEMA \"{s}\";
             CREATE TABLE \"{s}\".expenses (id TEXT PRIMARY KEY);",
            s = schema
        );
        let create = script(dir.path(), "create.sql", &sql);

        let mut engine = MigrationEngine::new(url.as_str(), schema.as_str());
        engine.connect().await.unwrap();
        engine.apply(&create).await.unwrap();

        let err = engine.apply(&create).await.unwrap_err();
        assert!(format!("{:#}", err).contains("already exists"));

        // The first run's objects are still there
        let tables = engine.fetch_tables().await.unwrap();
        assert!(tables.contains("expenses"));
        assert_eq!(tables.len(), 1);
        engine.close().await.unwrap();

        drop_schema(&url, &schema).await;
    }
}
