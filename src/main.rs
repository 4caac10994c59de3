//! Ejecutor de la migración inicial del esquema PostgreSQL
//!
//! # Flujo:
//! 1. Lee `POSTGRES_URL` del entorno (obligatoria)
//! 2. Abre una única conexión
//! 3. Lee `scripts/001_initial_schema.sql`
//! 4. Ejecuta el script completo dentro de una transacción y hace commit
//! 5. Lista las tablas del esquema `public`
//!
//! Cualquier error termina el proceso con código 1.

mod cli;
mod db;
mod migration;

fn main() {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(cli::run()) {
        tracing::error!("Migration failed: {:#}", e);
        std::process::exit(1);
    }
}
