//! SQLite converter.
//!
//! SQLite can rename tables and columns and drop columns (3.35.0+), but it
//! cannot change a column's type in place. Under
//! [`TypeChangeStrategy::Native`](crate::config::TypeChangeStrategy::Native)
//! a type change therefore fails.

use crate::config::ConverterConfig;

use super::SqlConverter;

/// SQLite SQL converter.
#[derive(Debug, Clone, Default)]
pub struct SqliteConverter {
    config: ConverterConfig,
}

impl SqliteConverter {
    /// Creates a SQLite converter.
    #[must_use]
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }
}

impl SqlConverter for SqliteConverter {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }
}
