//! PostgreSQL converter.
//!
//! Shares the SQLite rendering rules, and additionally supports changing a
//! column's type in place under
//! [`TypeChangeStrategy::Native`](crate::config::TypeChangeStrategy::Native).

use crate::config::ConverterConfig;
use crate::error::Result;
use crate::operations::ChangeDataTypeOperation;

use super::SqlConverter;

/// PostgreSQL SQL converter.
#[derive(Debug, Clone, Default)]
pub struct PostgresConverter {
    config: ConverterConfig,
}

impl PostgresConverter {
    /// Creates a PostgreSQL converter.
    #[must_use]
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }
}

impl SqlConverter for PostgresConverter {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn alter_column_type_sql(&self, operation: &ChangeDataTypeOperation) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {};",
            operation.table.name(),
            operation.column.name(),
            operation.new_dtype
        ))
    }
}
