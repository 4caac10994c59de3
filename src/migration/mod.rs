//! Aplicación del script de esquema

pub mod engine;
pub mod script;

pub use engine::{MigrationEngine, MigrationReport};
pub use script::MigrationScript;
