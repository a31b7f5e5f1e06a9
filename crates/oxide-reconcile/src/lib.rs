//! Declarative schema reconciliation for Rust.
//!
//! `oxide-reconcile` compares the tables a database currently has with the
//! tables an application declares, and produces the ordered list of
//! reversible operations that turns one into the other:
//! - Tables missing from the database are created, extra ones deleted
//! - A dropped table whose columns match a new table becomes a rename
//! - Columns are added or deleted inside tables present on both sides
//! - Every operation renders to dialect-specific SQL (SQLite, PostgreSQL)
//!
//! # Architecture
//!
//! - **Constraints** - `NOT NULL`, `UNIQUE`, `PRIMARY KEY`, `DEFAULT`,
//!   `FOREIGN KEY` and `CHECK` as typed values
//! - **Schema** - Validated [`Table`](schema::Table) and
//!   [`Column`](schema::Column) definitions plus builders
//! - **Operations** - Schema changes that know their own inverse
//! - **State** - The [`StateManager`](state::StateManager) diff
//! - **Dialect** - [`SqlConverter`](dialect::SqlConverter) implementations
//! - **Inspector** - Sources of the live database structure
//! - **Plan** - Operations and SQL bundled for review or execution
//!
//! # Example
//!
//! ```rust
//! use oxide_reconcile::prelude::*;
//!
//! let current = vec![TableBuilder::new("users")
//!     .column(ColumnDef::new("id", "INTEGER").primary_key())
//!     .build()
//!     .unwrap()];
//! let declared = vec![TableBuilder::new("users")
//!     .column(ColumnDef::new("id", "INTEGER").primary_key())
//!     .column(ColumnDef::new("email", "TEXT").unique())
//!     .build()
//!     .unwrap()];
//!
//! let plan = MigrationPlan::build(&ReconcileConfig::default(), "add email", &current, &declared)
//!     .unwrap();
//! assert_eq!(plan.statements, vec!["ALTER TABLE users ADD COLUMN email TEXT UNIQUE;"]);
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Dump the structure of a SQLite database as JSON
//! oxide-reconcile inspect --database sqlite:app.db
//!
//! # Show the SQL reconciling a database with a schema file
//! oxide-reconcile plan --schema schema.json --database sqlite:app.db
//!
//! # Apply it
//! oxide-reconcile apply --schema schema.json --database sqlite:app.db
//! ```

pub mod config;
pub mod constraints;
pub mod dialect;
pub mod error;
pub mod inspector;
pub mod operations;
pub mod plan;
pub mod schema;
pub mod sqlite;
pub mod state;

pub use config::{DatabaseProvider, ReconcileConfig};
pub use error::{ReconcileError, Result};
pub use plan::MigrationPlan;
pub use state::StateManager;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{
        ConverterConfig, DatabaseProvider, ReconcileConfig, TableRenameStrategy,
        TypeChangeStrategy,
    };
    pub use crate::constraints::{
        CheckConstraint, ColumnConstraint, Constraint, ConstraintKind, ForeignKeyConstraint,
        TableConstraint,
    };
    pub use crate::dialect::{PostgresConverter, SqlConverter, SqliteConverter};
    pub use crate::error::{ReconcileError, Result};
    pub use crate::inspector::{Inspector, SnapshotInspector};
    pub use crate::operations::{
        AddColumnOperation, ColumnOperation, Operation, OperationType, TableOperation,
    };
    pub use crate::plan::MigrationPlan;
    pub use crate::schema::{
        Column, ColumnDef, DataType, SchemaRegistry, Table, TableBuilder,
    };
    pub use crate::sqlite::SqliteExecutor;
    pub use crate::state::StateManager;
}
