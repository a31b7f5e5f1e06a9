//! SQL converters.
//!
//! A converter renders [`Operation`]s and [`Constraint`]s into SQL for one
//! database dialect. Rendering is pure: the same input always yields the same
//! text, and anything a dialect cannot express fails with
//! [`ReconcileError::UnsupportedOperation`] or
//! [`ReconcileError::UnsupportedConstraint`] instead of being dropped.
//!
//! Most of the rendering lives in default methods of [`SqlConverter`];
//! dialects override the pieces where they differ.

mod postgres;
mod sqlite;

pub use postgres::PostgresConverter;
pub use sqlite::SqliteConverter;

use tracing::{trace, warn};

use crate::config::{ConverterConfig, TableRenameStrategy, TypeChangeStrategy};
use crate::constraints::{
    ColumnConstraint, Constraint, ConstraintKind, ForeignKeyConstraint, TableConstraint,
};
use crate::error::{ReconcileError, Result};
use crate::operations::{
    AddColumnOperation, ChangeDataTypeOperation, ColumnOperation, Operation, RenameTableOperation,
    TableOperation,
};
use crate::schema::{Column, Table};

/// Renders operations and constraints as SQL for one dialect.
pub trait SqlConverter: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the converter configuration.
    fn config(&self) -> &ConverterConfig;

    /// Returns true if a column-wide constraint of `kind` is written inside
    /// its column definition in `CREATE TABLE`. Other column-wide kinds are
    /// appended after the column definitions.
    fn renders_inline(&self, kind: ConstraintKind) -> bool {
        matches!(
            kind,
            ConstraintKind::PrimaryKey | ConstraintKind::Unique | ConstraintKind::NotNull
        )
    }

    /// Renders any operation.
    fn convert_operation_to_sql(&self, operation: &Operation) -> Result<String> {
        let sql = match operation {
            Operation::Table(op) => self.convert_table_operation_to_sql(op)?,
            Operation::Column(op) => self.convert_column_operation_to_sql(op)?,
        };
        trace!(dialect = self.name(), sql = %sql, "Rendered operation");
        Ok(sql)
    }

    /// Renders a table operation.
    fn convert_table_operation_to_sql(&self, operation: &TableOperation) -> Result<String> {
        match operation {
            TableOperation::Create(op) => self.create_table_sql(&op.table),
            TableOperation::Delete(op) => Ok(self.drop_table_sql(&op.table)),
            TableOperation::Rename(op) => self.rename_table_sql(op),
        }
    }

    /// Renders a column operation.
    fn convert_column_operation_to_sql(&self, operation: &ColumnOperation) -> Result<String> {
        match operation {
            ColumnOperation::Add(op) => self.add_column_sql(op),
            ColumnOperation::Delete(op) => Ok(self.drop_column_sql(&op.table, &op.column)),
            ColumnOperation::Rename(op) => Ok(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {};",
                op.table.name(),
                op.column.name(),
                op.new_name
            )),
            ColumnOperation::ChangeDataType(op) => self.change_data_type_sql(op),
            ColumnOperation::AddConstraint(_) | ColumnOperation::DeleteConstraint(_) => {
                Err(self.unsupported_operation(&operation.to_string()))
            }
        }
    }

    /// Renders a constraint on its own.
    fn convert_constraint_to_sql(&self, constraint: &Constraint) -> Result<String> {
        match constraint {
            Constraint::Column(c) => self.convert_column_constraint_to_sql(c),
            Constraint::Table(c) => Ok(self.convert_table_constraint_to_sql(c)),
        }
    }

    /// Renders a column-wide constraint. `DEFAULT` is not renderable.
    fn convert_column_constraint_to_sql(&self, constraint: &ColumnConstraint) -> Result<String> {
        match constraint {
            ColumnConstraint::NotNull { .. }
            | ColumnConstraint::Unique { .. }
            | ColumnConstraint::PrimaryKey { .. } => Ok(constraint.kind().keyword().to_string()),
            ColumnConstraint::Default { .. } => Err(ReconcileError::UnsupportedConstraint {
                dialect: self.name(),
                constraint: constraint.kind().keyword().to_string(),
            }),
        }
    }

    /// Renders a table-wide constraint.
    fn convert_table_constraint_to_sql(&self, constraint: &TableConstraint) -> String {
        match constraint {
            TableConstraint::ForeignKey(fk) => format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                fk.columns().collect::<Vec<_>>().join(", "),
                fk.referenced_table(),
                fk.referenced_columns().collect::<Vec<_>>().join(", ")
            ),
            TableConstraint::Check(check) => format!("CHECK ({})", check.condition),
        }
    }

    /// Renders `name TYPE` followed by the given constraints in order.
    fn column_definition(
        &self,
        column: &Column,
        constraints: &[&ColumnConstraint],
    ) -> Result<String> {
        let mut parts = vec![column.name().to_string(), column.data_type().to_string()];
        for constraint in constraints {
            parts.push(self.convert_column_constraint_to_sql(constraint)?);
        }
        Ok(parts.join(" "))
    }

    /// Renders the `REFERENCES table (column)` tail of a foreign key for one
    /// of its local columns.
    fn references_clause(&self, fk: &ForeignKeyConstraint, column: &str) -> Option<String> {
        fk.referenced_column_for(column)
            .map(|remote| format!("REFERENCES {} ({})", fk.referenced_table(), remote))
    }

    /// Renders `CREATE TABLE`.
    ///
    /// Column definitions come first, with inline constraints in declaration
    /// order. Then, comma-separated: a composite `PRIMARY KEY (...)`, the
    /// remaining column-wide constraints in their natural order, and the
    /// table-wide constraints in insertion order.
    fn create_table_sql(&self, table: &Table) -> Result<String> {
        let pk_columns = table.primary_key_columns();
        let composite_pk = pk_columns.len() > 1;

        let mut definitions = Vec::with_capacity(table.columns().len());
        let mut at_end: Vec<&ColumnConstraint> = Vec::new();
        for column in table.columns() {
            let mut inline = Vec::new();
            for constraint in column.constraints() {
                let kind = constraint.kind();
                if composite_pk && kind == ConstraintKind::PrimaryKey {
                    continue;
                }
                if self.renders_inline(kind) {
                    inline.push(constraint);
                } else {
                    at_end.push(constraint);
                }
            }
            definitions.push(self.column_definition(column, &inline)?);
        }

        if composite_pk {
            definitions.push(format!("PRIMARY KEY ({})", pk_columns.join(", ")));
        }
        at_end.sort();
        for constraint in at_end {
            definitions.push(self.convert_column_constraint_to_sql(constraint)?);
        }
        for constraint in table.table_constraints() {
            definitions.push(self.convert_table_constraint_to_sql(constraint));
        }

        Ok(format!(
            "CREATE TABLE {} ({});",
            table.name(),
            definitions.join(", ")
        ))
    }

    /// Renders `DROP TABLE`.
    fn drop_table_sql(&self, table: &Table) -> String {
        format!("DROP TABLE {};", table.name())
    }

    /// Renders a table rename according to the configured strategy.
    fn rename_table_sql(&self, operation: &RenameTableOperation) -> Result<String> {
        let table = &operation.table;
        match self.config().table_rename {
            TableRenameStrategy::Native => Ok(format!(
                "ALTER TABLE {} RENAME TO {};",
                table.name(),
                operation.new_name
            )),
            TableRenameStrategy::Recreate => {
                warn!(
                    dialect = self.name(),
                    table = table.name(),
                    new_name = %operation.new_name,
                    "Renaming table by dropping and recreating it; existing rows are lost"
                );
                Ok(format!(
                    "{} {}",
                    self.drop_table_sql(table),
                    self.create_table_sql(&table.renamed(&operation.new_name))?
                ))
            }
        }
    }

    /// Renders `ADD COLUMN`, followed by the related foreign key and check.
    fn add_column_sql(&self, operation: &AddColumnOperation) -> Result<String> {
        let column = operation.column();
        let constraints: Vec<&ColumnConstraint> = column.constraints().iter().collect();
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            operation.table().name(),
            self.column_definition(column, &constraints)?
        );
        if let Some(clause) = operation
            .foreign_key()
            .and_then(|fk| self.references_clause(fk, column.name()))
        {
            sql.push(' ');
            sql.push_str(&clause);
        }
        if let Some(check) = operation.check_constraint() {
            sql.push(' ');
            let check = TableConstraint::Check(check.clone());
            sql.push_str(&self.convert_table_constraint_to_sql(&check));
        }
        sql.push(';');
        Ok(sql)
    }

    /// Renders `DROP COLUMN`.
    fn drop_column_sql(&self, table: &Table, column: &Column) -> String {
        format!("ALTER TABLE {} DROP COLUMN {};", table.name(), column.name())
    }

    /// Renders a data type change according to the configured strategy.
    fn change_data_type_sql(&self, operation: &ChangeDataTypeOperation) -> Result<String> {
        match self.config().type_change {
            TypeChangeStrategy::Unsupported => {
                let description = ColumnOperation::ChangeDataType(operation.clone()).to_string();
                Err(self.unsupported_operation(&description))
            }
            TypeChangeStrategy::Native => self.alter_column_type_sql(operation),
            TypeChangeStrategy::DropAndAdd => {
                warn!(
                    dialect = self.name(),
                    table = operation.table.name(),
                    column = operation.column.name(),
                    "Changing column type by dropping and re-adding it; existing values are lost"
                );
                let retyped = operation.column.with_data_type(operation.new_dtype.clone());
                let add = AddColumnOperation::new(operation.table.clone(), retyped);
                Ok(format!(
                    "{} {}",
                    self.drop_column_sql(&operation.table, &operation.column),
                    self.add_column_sql(&add)?
                ))
            }
        }
    }

    /// Renders an in-place column type change. Dialects without one keep
    /// this default, which fails.
    fn alter_column_type_sql(&self, operation: &ChangeDataTypeOperation) -> Result<String> {
        let description = ColumnOperation::ChangeDataType(operation.clone()).to_string();
        Err(self.unsupported_operation(&description))
    }

    /// Builds the error for an operation this dialect cannot render.
    fn unsupported_operation(&self, operation: &str) -> ReconcileError {
        ReconcileError::UnsupportedOperation {
            dialect: self.name(),
            operation: operation.to_string(),
        }
    }
}
