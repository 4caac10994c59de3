//! Conexión y operaciones con PostgreSQL

use anyhow::{Context, Result};
use std::str::FromStr;
use tokio::task::JoinHandle;
use tokio_postgres::config::{Host, SslMode};
use tokio_postgres::{Client, Config};

use super::tls;
use super::types::TableList;

/// Consulta de catálogo: tablas de un esquema, en el orden que devuelva el servidor
const LIST_TABLES_QUERY: &str = "SELECT table_name
    FROM information_schema.tables
    WHERE table_schema = $1";

pub struct PostgresConnection {
    client: Client,
    connection_task: JoinHandle<()>,
}

impl PostgresConnection {
    /// Abre una única conexión a partir de la cadena de conexión
    pub async fn connect(url: &str) -> Result<Self> {
        let config = parse_config(url)?;
        let connector = tls::make_connector()?;

        let (client, connection) = config
            .connect(connector)
            .await
            .context("Error conectando a PostgreSQL")?;

        // Spawn la conexión en background
        let connection_task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Error en conexión PostgreSQL: {}", e);
            }
        });

        Ok(Self {
            client,
            connection_task,
        })
    }

    /// Ejecuta el script completo como un solo lote dentro de una transacción.
    /// Si cualquier sentencia falla no se confirma nada.
    pub async fn apply_script(&mut self, sql: &str) -> Result<()> {
        let transaction = self
            .client
            .transaction()
            .await
            .context("Error iniciando la transacción")?;

        transaction
            .batch_execute(sql)
            .await
            .context("Error ejecutando el script SQL")?;

        transaction
            .commit()
            .await
            .context("Error confirmando la transacción")?;

        Ok(())
    }

    /// Lista las tablas de un esquema
    pub async fn list_tables(&self, schema: &str) -> Result<TableList> {
        let rows = self
            .client
            .query(LIST_TABLES_QUERY, &[&schema])
            .await
            .context(format!("Error listando tablas del esquema '{}'", schema))?;

        TableList::from_rows(&rows)
    }

    /// Cierra la conexión y espera a que termine la tarea del driver
    pub async fn close(self) -> Result<()> {
        drop(self.client);
        self.connection_task
            .await
            .context("La tarea de conexión PostgreSQL terminó de forma anómala")?;
        Ok(())
    }
}

/// Interpreta la cadena de conexión (formato URL o clave=valor)
pub fn parse_config(url: &str) -> Result<Config> {
    Config::from_str(url).context("Cadena de conexión PostgreSQL inválida")
}

/// Descripción del destino para logs: usuario, hosts, puertos, base y sslmode.
/// Nunca incluye la contraseña.
pub fn describe_target(config: &Config) -> String {
    let hosts: Vec<String> = config
        .get_hosts()
        .iter()
        .map(|host| match host {
            Host::Tcp(name) => name.clone(),
            #[cfg(unix)]
            Host::Unix(path) => path.display().to_string(),
        })
        .collect();
    let ports: Vec<String> = config.get_ports().iter().map(|p| p.to_string()).collect();

    let sslmode = match config.get_ssl_mode() {
        SslMode::Disable => "disable",
        SslMode::Prefer => "prefer",
        SslMode::Require => "require",
        _ => "other",
    };

    format!(
        "{}@{}:{}/{} (sslmode={})",
        config.get_user().unwrap_or("<default>"),
        if hosts.is_empty() { "<no host>".to_string() } else { hosts.join(",") },
        if ports.is_empty() { "5432".to_string() } else { ports.join(",") },
        config.get_dbname().unwrap_or("<default>"),
        sslmode
    )
}
