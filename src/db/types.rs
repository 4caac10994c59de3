//! Tipos de datos compartidos para la migración

use anyhow::{Context, Result};
use tokio_postgres::Row;

/// Nombres de tablas devueltos por la consulta de catálogo.
/// Conserva el orden del servidor; no se ordena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableList {
    names: Vec<String>,
}

impl TableList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Construye la lista a partir de filas con `table_name` en la primera columna
    pub fn from_rows(rows: &[Row]) -> Result<Self> {
        let names = rows
            .iter()
            .map(|row| {
                row.try_get::<_, String>(0)
                    .context("Columna table_name inesperada en el catálogo")
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(names))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

#[cfg(test)]
impl IntoIterator for TableList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}
