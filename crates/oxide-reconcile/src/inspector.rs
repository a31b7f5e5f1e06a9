//! Live schema sources.
//!
//! An [`Inspector`] reports the tables currently present in a database, as
//! the same [`Table`]/[`Column`] values the declared schema uses.
//! [`SnapshotInspector`] serves a schema captured earlier, either read from a
//! live SQLite database by [`crate::sqlite::introspect`] or loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};
use crate::schema::{Column, Table};

/// Source of the live database structure.
pub trait Inspector {
    /// Returns every table.
    fn get_tables(&self) -> Result<Vec<Table>>;

    /// Returns the table names.
    fn get_tables_names(&self) -> Result<Vec<String>> {
        Ok(self
            .get_tables()?
            .iter()
            .map(|t| t.name().to_string())
            .collect())
    }

    /// Returns the columns of one table.
    ///
    /// Fails with [`ReconcileError::Validation`] if the table is unknown.
    fn get_table_columns(&self, table_name: &str) -> Result<Vec<Column>> {
        self.get_tables()?
            .into_iter()
            .find(|t| t.name() == table_name)
            .map(|t| t.columns().to_vec())
            .ok_or_else(|| ReconcileError::validation(format!("Unknown table '{}'", table_name)))
    }
}

/// An [`Inspector`] over an in-memory schema snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotInspector {
    tables: Vec<Table>,
}

impl SnapshotInspector {
    /// Wraps a list of tables.
    #[must_use]
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Parses a JSON array of tables.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON array of tables from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.tables)?)
    }

    /// Returns the tables.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

impl Inspector for SnapshotInspector {
    fn get_tables(&self) -> Result<Vec<Table>> {
        Ok(self.tables.clone())
    }
}
