//! Reconciliation configuration.
//!
//! Configuration is an explicit value handed to the code that needs it. There
//! is no process-wide instance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::{PostgresConverter, SqlConverter, SqliteConverter};
use crate::schema::DataType;

const SQLITE_TYPES: &[&str] = &["TEXT", "INTEGER", "REAL", "BLOB", "NULL"];

const POSTGRES_TYPES: &[&str] = &[
    "BIGINT",
    "BIGSERIAL",
    "BIT",
    "BIT VARYING",
    "BOOLEAN",
    "BYTEA",
    "CHAR",
    "CHARACTER",
    "CHARACTER VARYING",
    "CIDR",
    "DATE",
    "DECIMAL",
    "DOUBLE PRECISION",
    "INET",
    "INTEGER",
    "INTERVAL",
    "JSON",
    "JSONB",
    "MONEY",
    "NUMERIC",
    "REAL",
    "SERIAL",
    "SMALLINT",
    "SMALLSERIAL",
    "TEXT",
    "TIME",
    "TIMESTAMP",
    "TIMESTAMPTZ",
    "TIMESTAMP WITH TIME ZONE",
    "TIMESTAMP WITHOUT TIME ZONE",
    "UUID",
    "VARCHAR",
    "XML",
];

/// Supported database providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    /// SQLite 3.
    #[default]
    #[value(name = "sqlite3", alias = "sqlite")]
    Sqlite3,
    /// PostgreSQL.
    #[value(name = "postgresql", alias = "postgres")]
    Postgresql,
}

impl DatabaseProvider {
    /// Returns the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sqlite3 => "SQLite",
            Self::Postgresql => "PostgreSQL",
        }
    }

    /// Returns the data type names this provider accepts.
    #[must_use]
    pub fn accepted_types(&self) -> &'static [&'static str] {
        match self {
            Self::Sqlite3 => SQLITE_TYPES,
            Self::Postgresql => POSTGRES_TYPES,
        }
    }

    /// Returns true if `data_type` is valid for this provider.
    ///
    /// Type arguments are ignored, and PostgreSQL array types are accepted
    /// when their element type is.
    #[must_use]
    pub fn accepts(&self, data_type: &DataType) -> bool {
        let base = data_type.base_name();
        let base = match self {
            Self::Postgresql => base.trim_end_matches("[]"),
            Self::Sqlite3 => base,
        };
        self.accepted_types().contains(&base)
    }

    /// Returns the SQL converter for this provider.
    #[must_use]
    pub fn converter(&self, config: ConverterConfig) -> Box<dyn SqlConverter> {
        match self {
            Self::Sqlite3 => Box::new(SqliteConverter::new(config)),
            Self::Postgresql => Box::new(PostgresConverter::new(config)),
        }
    }
}

impl fmt::Display for DatabaseProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How converters render a column data type change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TypeChangeStrategy {
    /// Fail with an unsupported-operation error.
    #[default]
    Unsupported,
    /// Drop the column and add it back with the new type. Loses data.
    DropAndAdd,
    /// `ALTER TABLE t ALTER COLUMN c TYPE new;`, where the dialect has it.
    Native,
}

/// How converters render a table rename.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TableRenameStrategy {
    /// Drop the old table and create the new one. Loses data.
    #[default]
    Recreate,
    /// `ALTER TABLE old RENAME TO new;`.
    Native,
}

/// Converter behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Data type change rendering.
    #[serde(default)]
    pub type_change: TypeChangeStrategy,
    /// Table rename rendering.
    #[serde(default)]
    pub table_rename: TableRenameStrategy,
}

impl ConverterConfig {
    /// Sets the type change strategy.
    #[must_use]
    pub fn type_change(mut self, strategy: TypeChangeStrategy) -> Self {
        self.type_change = strategy;
        self
    }

    /// Sets the table rename strategy.
    #[must_use]
    pub fn table_rename(mut self, strategy: TableRenameStrategy) -> Self {
        self.table_rename = strategy;
        self
    }
}

/// Everything needed to plan a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Target database provider.
    pub provider: DatabaseProvider,
    /// Converter behavior.
    #[serde(default)]
    pub converter: ConverterConfig,
}

impl ReconcileConfig {
    /// Creates a configuration with default converter behavior.
    #[must_use]
    pub fn new(provider: DatabaseProvider) -> Self {
        Self {
            provider,
            converter: ConverterConfig::default(),
        }
    }

    /// Replaces the converter configuration.
    #[must_use]
    pub fn with_converter(mut self, converter: ConverterConfig) -> Self {
        self.converter = converter;
        self
    }

    /// Returns the converter for the configured provider.
    #[must_use]
    pub fn converter(&self) -> Box<dyn SqlConverter> {
        self.provider.converter(self.converter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_accepted_types() {
        let provider = DatabaseProvider::Sqlite3;
        assert!(provider.accepts(&DataType::new("integer")));
        assert!(provider.accepts(&DataType::new("BLOB")));
        assert!(!provider.accepts(&DataType::new("UUID")));
        assert!(!provider.accepts(&DataType::new("INTEGER[]")));
    }

    #[test]
    fn test_postgres_accepted_types() {
        let provider = DatabaseProvider::Postgresql;
        assert!(provider.accepts(&DataType::new("varchar(255)")));
        assert!(provider.accepts(&DataType::new("double precision")));
        assert!(provider.accepts(&DataType::new("TEXT[]")));
        assert!(!provider.accepts(&DataType::new("BLOB")));
    }

    #[test]
    fn test_converter_selection() {
        let config = ReconcileConfig::new(DatabaseProvider::Postgresql);
        assert_eq!(config.converter().name(), "PostgreSQL");
        assert_eq!(
            DatabaseProvider::Sqlite3
                .converter(ConverterConfig::default())
                .name(),
            "SQLite"
        );
    }

    #[test]
    fn test_defaults() {
        let config = ReconcileConfig::default();
        assert_eq!(config.provider, DatabaseProvider::Sqlite3);
        assert_eq!(config.converter.type_change, TypeChangeStrategy::Unsupported);
        assert_eq!(config.converter.table_rename, TableRenameStrategy::Recreate);
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{"provider":"postgresql","converter":{"type_change":"drop_and_add"}}"#;
        let config: ReconcileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.provider, DatabaseProvider::Postgresql);
        assert_eq!(config.converter.type_change, TypeChangeStrategy::DropAndAdd);
        assert_eq!(config.converter.table_rename, TableRenameStrategy::Recreate);
    }
}
